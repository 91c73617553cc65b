//! carve-e2e: end-to-end tests for the extract-method command
//!
//! Drives the whole stack (configuration, command, engine) through an
//! in-memory editor host.

pub use carve_test_support::{helpers, mocks};

#[cfg(test)]
pub mod test_helpers;

#[cfg(test)]
pub mod test_config_workflow;

#[cfg(test)]
pub mod test_extract_workflow;
