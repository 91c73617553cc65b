//! Mock implementations for testing

use async_trait::async_trait;
use carve_foundation::{ExtractResult, ScopeKind};
use carve_host::{EditorHost, SelectionSnapshot};
use mockall::mock;

mock! {
    pub EditorHost {}

    #[async_trait]
    impl EditorHost for EditorHost {
        async fn read_selection(&self) -> ExtractResult<SelectionSnapshot>;
        async fn prompt_for_name(&self, default_name: &str) -> Option<String>;
        async fn prompt_for_scope_kind(&self, candidates: &[ScopeKind]) -> Option<ScopeKind>;
        async fn replace_whole_document(&self, text: &str) -> ExtractResult<()>;
        async fn show_warning(&self, message: &str);
    }
}

/// Create a mock editor host for testing
pub fn mock_editor_host() -> MockEditorHost {
    MockEditorHost::new()
}
