//! TypeScript/JavaScript extract-method engine built on SWC
//!
//! Maps an editor selection onto syntax nodes, works out what the extracted
//! code needs (parameters, return value, `async`), and rewrites the document
//! so the code lives in a new function, method or nested function that is
//! called from the original site.
//!
//! Most callers only need [`extract_method`] or the step-by-step states in
//! [`engine`].

pub mod analysis;
pub mod dialect;
pub mod engine;
pub mod locator;
pub mod node_path;
pub mod parser;
pub mod scope;
pub mod splice;
pub mod synthesis;

pub use analysis::{default_ambient_globals, FragmentAnalysis, Parameter};
pub use dialect::Dialect;
pub use engine::{
    extract_method, Analyzed, ExtractOptions, Located, ScopeChosen, Spliced, Synthesized,
};
pub use node_path::{Frame, ListKind, LocatedNodes, NodeKind, NodePath, Slot};
pub use parser::{Snippet, SnippetMode, SyntaxTree};
pub use scope::{insertion_target, offered_scopes, InsertionTarget};
pub use synthesis::validate_function_name;
