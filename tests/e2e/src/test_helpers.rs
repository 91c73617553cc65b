//! A scripted in-memory editor for workflow tests

use async_trait::async_trait;
use carve_foundation::{ExtractError, ExtractResult, ScopeKind};
use carve_host::{EditorHost, SelectionSnapshot};
use carve_test_support::snapshot;
use std::sync::Mutex;

/// Editor whose prompt answers are fixed up front
///
/// The name prompt accepts the offered default unless an answer is given.
pub struct ScriptedEditor {
    snapshot: SelectionSnapshot,
    scope_answer: Option<ScopeKind>,
    name_answer: Option<Option<String>>,
    document: Mutex<String>,
    warnings: Mutex<Vec<String>>,
    offered: Mutex<Vec<ScopeKind>>,
}

impl ScriptedEditor {
    pub fn new(marked: &str, language_id: &str) -> Self {
        let snapshot = snapshot(marked, language_id);
        let document = Mutex::new(snapshot.document.clone());
        Self {
            snapshot,
            scope_answer: None,
            name_answer: None,
            document,
            warnings: Mutex::new(Vec::new()),
            offered: Mutex::new(Vec::new()),
        }
    }

    pub fn picking(mut self, scope: ScopeKind) -> Self {
        self.scope_answer = Some(scope);
        self
    }

    pub fn naming(mut self, name: &str) -> Self {
        self.name_answer = Some(Some(name.to_string()));
        self
    }

    pub fn dismissing_name(mut self) -> Self {
        self.name_answer = Some(None);
        self
    }

    pub fn snapshot(&self) -> &SelectionSnapshot {
        &self.snapshot
    }

    pub fn document(&self) -> String {
        self.document.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap().clone()
    }

    pub fn offered(&self) -> Vec<ScopeKind> {
        self.offered.lock().unwrap().clone()
    }
}

#[async_trait]
impl EditorHost for ScriptedEditor {
    async fn read_selection(&self) -> ExtractResult<SelectionSnapshot> {
        Ok(self.snapshot.clone())
    }

    async fn prompt_for_name(&self, default_name: &str) -> Option<String> {
        match &self.name_answer {
            Some(answer) => answer.clone(),
            None => Some(default_name.to_string()),
        }
    }

    async fn prompt_for_scope_kind(&self, candidates: &[ScopeKind]) -> Option<ScopeKind> {
        *self.offered.lock().unwrap() = candidates.to_vec();
        self.scope_answer
    }

    async fn replace_whole_document(&self, text: &str) -> ExtractResult<()> {
        let mut document = self
            .document
            .lock()
            .map_err(|_| ExtractError::host("document lock poisoned"))?;
        *document = text.to_string();
        Ok(())
    }

    async fn show_warning(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }
}
