use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an extracted function is inserted and how its call site is framed.
///
/// The declaration order is the presentation order offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScopeKind {
    /// A method on the enclosing class, called as `this.name(...)`
    ClassMethod,
    /// A function declared inside the enclosing function body
    NestedFunction,
    /// A function appended to the module body
    TopLevelFunction,
}

impl ScopeKind {
    pub const ALL: [ScopeKind; 3] = [
        ScopeKind::ClassMethod,
        ScopeKind::NestedFunction,
        ScopeKind::TopLevelFunction,
    ];

    /// Title used for code actions and prompts
    pub fn title(&self) -> &'static str {
        match self {
            ScopeKind::ClassMethod => "Class Method",
            ScopeKind::NestedFunction => "Nested Function",
            ScopeKind::TopLevelFunction => "Top-Level Function",
        }
    }

    /// Whether the call site goes through `this`
    pub fn is_member_call(&self) -> bool {
        matches!(self, ScopeKind::ClassMethod)
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
