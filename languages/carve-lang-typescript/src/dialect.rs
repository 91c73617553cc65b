//! Parser dialect selection.
//!
//! The dialect is a plain value handed to the tree builder on every call; there
//! is no process-wide plugin list.

use serde::{Deserialize, Serialize};
use swc_ecma_parser::{EsSyntax, Syntax, TsSyntax};

/// Grammar the document is parsed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dialect {
    /// TypeScript, optionally with JSX (`.tsx`)
    TypeScript { tsx: bool },
    /// Modern JavaScript with JSX
    JavaScript,
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::TypeScript { tsx: false }
    }
}

impl Dialect {
    /// Map an editor language identifier onto a dialect.
    pub fn from_language_id(language_id: &str) -> Option<Self> {
        match language_id.trim().to_ascii_lowercase().as_str() {
            "typescript" | "ts" => Some(Dialect::TypeScript { tsx: false }),
            "typescriptreact" | "tsx" => Some(Dialect::TypeScript { tsx: true }),
            "javascript" | "javascriptreact" | "javascript.jsx" | "js" | "jsx" | "flow" => {
                Some(Dialect::JavaScript)
            }
            _ => None,
        }
    }

    /// SWC syntax configuration for this dialect
    pub fn syntax(&self) -> Syntax {
        match self {
            Dialect::TypeScript { tsx } => Syntax::Typescript(TsSyntax {
                tsx: *tsx,
                decorators: true,
                ..Default::default()
            }),
            Dialect::JavaScript => Syntax::Es(EsSyntax {
                jsx: true,
                fn_bind: true,
                decorators: true,
                decorators_before_export: true,
                export_default_from: true,
                ..Default::default()
            }),
        }
    }

    /// Synthetic file name used in the source map
    pub(crate) fn file_name(&self) -> &'static str {
        match self {
            Dialect::TypeScript { tsx: false } => "document.ts",
            Dialect::TypeScript { tsx: true } => "document.tsx",
            Dialect::JavaScript => "document.jsx",
        }
    }
}
