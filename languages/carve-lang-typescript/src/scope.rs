//! Scope resolution: which containers can receive the extracted function.

use crate::node_path::{Frame, NodeKind, NodePath};
use carve_foundation::{ExtractError, ExtractResult, ScopeKind};
use std::collections::BTreeSet;
use swc_common::Span;

/// The scope kinds reachable from `path`, in presentation order.
pub fn offered_scopes(path: &NodePath) -> Vec<ScopeKind> {
    let mut kinds = BTreeSet::from([ScopeKind::TopLevelFunction]);
    for frame in path.ancestors() {
        if frame.kind.has_block_body() {
            kinds.insert(ScopeKind::NestedFunction);
        }
        if frame.kind == NodeKind::ClassDecl {
            kinds.insert(ScopeKind::ClassMethod);
        }
    }
    kinds.into_iter().collect()
}

/// The container node that receives the new function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionTarget {
    pub scope: ScopeKind,
    pub kind: NodeKind,
    pub span: Span,
    /// The selection sits in a static member of the target class
    pub is_static: bool,
}

/// Innermost container of the chosen kind enclosing `path`.
///
/// For class methods, a `static` member between the selection and the class
/// makes the new method static too, so `this.name()` still resolves.
pub fn insertion_target(path: &NodePath, scope: ScopeKind) -> ExtractResult<InsertionTarget> {
    let mut is_static = false;
    let frame: Option<&Frame> = match scope {
        ScopeKind::ClassMethod => path.ancestors().find(|frame| {
            is_static |= frame.kind == NodeKind::StaticMember;
            frame.kind == NodeKind::ClassDecl
        }),
        ScopeKind::NestedFunction => path.ancestors().find(|frame| frame.kind.has_block_body()),
        ScopeKind::TopLevelFunction => path.root(),
    };

    frame
        .map(|frame| InsertionTarget {
            scope,
            kind: frame.kind,
            span: frame.span,
            is_static: is_static && scope == ScopeKind::ClassMethod,
        })
        .ok_or_else(|| {
            ExtractError::splice(format!("No {} container encloses the selection", scope))
        })
}
