//! Editor integration for extract-method
//!
//! [`EditorHost`] is the only way the command talks to an editor.
//! [`ExtractMethodCommand`] runs the fixed flow against it: read the
//! selection, offer scopes, prompt for a name, rewrite, replace the document.

pub mod command;
pub mod host;

pub use command::{ExtractMethodCommand, ExtractOutcome, ExtractionOffer};
pub use host::{EditorHost, SelectionSnapshot};
