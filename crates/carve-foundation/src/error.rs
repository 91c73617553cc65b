//! Error handling for the extraction pipeline

use crate::position::SourceLocation;
use crate::scope::ScopeKind;
use thiserror::Error;

/// Message shown when a selection does not map onto syntax nodes.
pub const SPAN_MISMATCH_MESSAGE: &str =
    "Selected block should represent a set of statements or an expression.";

/// Result type for extraction operations
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Errors that can occur while extracting a method
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExtractError {
    /// Source text failed to parse under the configured dialect
    #[error("Parse error: {message}")]
    Parse {
        message: String,
        /// Optional line and column information (0-based)
        location: Option<SourceLocation>,
    },

    /// The normalized selection does not align to a node or a run of siblings
    #[error("{}", SPAN_MISMATCH_MESSAGE)]
    SpanMismatch,

    /// The scope resolver produced no candidates
    #[error("No scope is available to receive the extracted function")]
    NoScopeAvailable,

    /// The caller chose a scope kind that the selection cannot reach
    #[error("Scope '{scope}' is not reachable from the selection")]
    ScopeUnreachable { scope: ScopeKind },

    /// Invalid input provided by the caller (function name, language id, ...)
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// A name or scope prompt was dismissed
    #[error("Extraction cancelled")]
    Cancelled,

    /// The insertion target or call site could not be found in the tree
    #[error("Splice failed: {message}")]
    Splice { message: String },

    /// The mutated tree could not be printed
    #[error("Emit error: {message}")]
    Emit { message: String },

    /// The host editor rejected an operation
    #[error("Host error: {message}")]
    Host { message: String },

    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ExtractError {
    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            location: None,
        }
    }

    /// Create a parse error with location information
    pub fn parse_at(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::Parse {
            message: message.into(),
            location: Some(SourceLocation { line, column }),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a splice error
    pub fn splice(message: impl Into<String>) -> Self {
        Self::Splice {
            message: message.into(),
        }
    }

    /// Create an emit error
    pub fn emit(message: impl Into<String>) -> Self {
        Self::Emit {
            message: message.into(),
        }
    }

    /// Create a host error
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Cancellation is a silent abort; everything else is shown to the user.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
