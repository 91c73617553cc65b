//! The editor seam
//!
//! Everything the command needs from an editor goes through [`EditorHost`]:
//! the document and selection come in as explicit values, and the edited text
//! goes back out the same way. Nothing is read from ambient editor state.

use async_trait::async_trait;
use carve_foundation::{ExtractResult, ScopeKind, SelectionSpan};
use serde::{Deserialize, Serialize};

/// The active document and selection at the moment a command starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSnapshot {
    /// Full document text
    pub document: String,
    /// Editor language identifier (`typescript`, `javascriptreact`, ...)
    pub language_id: String,
    /// Selected text with host-coordinate start and end
    pub selection: SelectionSpan,
}

impl SelectionSnapshot {
    pub fn new(
        document: impl Into<String>,
        language_id: impl Into<String>,
        selection: SelectionSpan,
    ) -> Self {
        Self {
            document: document.into(),
            language_id: language_id.into(),
            selection,
        }
    }
}

/// Editor operations used by the extract-method command
#[async_trait]
pub trait EditorHost: Send + Sync {
    /// Snapshot the active document and selection
    async fn read_selection(&self) -> ExtractResult<SelectionSnapshot>;

    /// Ask for the new function's name; `None` means the prompt was dismissed
    async fn prompt_for_name(&self, default_name: &str) -> Option<String>;

    /// Ask which scope receives the function; `None` means dismissed
    async fn prompt_for_scope_kind(&self, candidates: &[ScopeKind]) -> Option<ScopeKind>;

    /// Replace the entire document with `text`
    async fn replace_whole_document(&self, text: &str) -> ExtractResult<()>;

    /// Show a user-visible warning
    async fn show_warning(&self, message: &str);
}
