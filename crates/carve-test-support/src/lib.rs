//! Test support utilities and fixtures for Carve tests

pub mod helpers;
pub mod mocks;

// Re-export commonly used helpers
pub use helpers::{create_test_config, fixture, snapshot, squash, write_project_config};
pub use mocks::{mock_editor_host, MockEditorHost};
