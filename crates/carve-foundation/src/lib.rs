//! Foundation Layer - positions, selections, scope kinds and errors
//!
//! This crate provides the language-independent building blocks shared by the
//! Carve crates:
//! - Host and parser coordinate types and the selection normalizer
//! - The scope kinds an extracted function can be inserted into
//! - The extraction error taxonomy

pub mod error;
pub mod position;
pub mod scope;
pub mod selection;

// Re-export commonly used types for convenience
pub use error::*;
pub use position::{HostPosition, ParserPosition, ParserRange, SourceLocation};
pub use scope::ScopeKind;
pub use selection::{normalize_selection, NormalizedRange, SelectionSpan};
