//! Test helper functions and utilities

use carve_config::CarveConfig;
use carve_foundation::{HostPosition, SelectionSpan};
use carve_host::SelectionSnapshot;
use std::path::{Path, PathBuf};

/// Create a test configuration for testing
pub fn create_test_config() -> CarveConfig {
    let mut config = CarveConfig::default();
    config.logging.level = "debug".to_string();
    config.extraction.default_function_name = "extracted".to_string();
    config
}

fn host_position(prefix: &str) -> HostPosition {
    let line = prefix.matches('\n').count() as u32;
    let character = prefix.rsplit('\n').next().unwrap_or("").chars().count() as u32;
    HostPosition::new(line, character)
}

/// Split a source marked with `«` and `»` into the clean source and the
/// selection between the markers.
///
/// # Panics
///
/// Panics when either marker is missing.
pub fn fixture(marked: &str) -> (String, SelectionSpan) {
    let start = marked.find('«').expect("missing « marker");
    let end = marked.find('»').expect("missing » marker");
    let selected = &marked[start + '«'.len_utf8()..end];
    let prefix = &marked[..start];
    let selection = SelectionSpan::new(
        host_position(prefix),
        host_position(&format!("{prefix}{selected}")),
        selected,
    );
    (marked.replace(['«', '»'], ""), selection)
}

/// Snapshot of a marked fixture as the editor would report it
pub fn snapshot(marked: &str, language_id: &str) -> SelectionSnapshot {
    let (document, selection) = fixture(marked);
    SelectionSnapshot::new(document, language_id, selection)
}

/// Drop all whitespace so printer layout does not affect comparisons
pub fn squash(text: &str) -> String {
    text.split_whitespace().collect()
}

/// Write `contents` to `carve.toml` under `root` and return its path
pub fn write_project_config(root: &Path, contents: &str) -> PathBuf {
    let path = root.join("carve.toml");
    std::fs::write(&path, contents).expect("write carve.toml");
    path
}
