//! Node paths: a located node plus the chain of ancestors above it.
//!
//! SWC trees carry no parent pointers, so the locator records a [`Frame`] for
//! every ancestor it descends through. The chain is a plain vector (root
//! first), which makes parent access O(1) and ancestor walks iterative.

use swc_common::Span;

/// The node categories the extraction pipeline distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Module,
    ModuleDecl,
    BlockStmt,
    ExprStmt,
    IfStmt,
    LabeledStmt,
    ReturnStmt,
    Declaration,
    Statement,
    Function { block_body: bool },
    Constructor { block_body: bool },
    Arrow { block_body: bool },
    /// Object-literal getter or setter
    Accessor { block_body: bool },
    ClassDecl,
    /// A `static` class member; `this` inside it is the class itself
    StaticMember,
    ClassExpr,
    VarDeclarator,
    KeyValueProp,
    Call,
    New,
    Logical,
    Conditional,
    Expression,
}

impl NodeKind {
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::ModuleDecl
                | NodeKind::BlockStmt
                | NodeKind::ExprStmt
                | NodeKind::IfStmt
                | NodeKind::LabeledStmt
                | NodeKind::ReturnStmt
                | NodeKind::Declaration
                | NodeKind::Statement
        )
    }

    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            NodeKind::Arrow { .. }
                | NodeKind::Call
                | NodeKind::New
                | NodeKind::Logical
                | NodeKind::Conditional
                | NodeKind::Expression
        )
    }

    /// Functions, constructors, arrows and accessors whose body is a block
    pub fn has_block_body(&self) -> bool {
        matches!(
            self,
            NodeKind::Function { block_body: true }
                | NodeKind::Constructor { block_body: true }
                | NodeKind::Arrow { block_body: true }
                | NodeKind::Accessor { block_body: true }
        )
    }
}

/// Where a node sits inside its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The tree root
    Root,
    /// A named single-child field (`test`, `init`, `body`, ...)
    Field(&'static str),
    /// Position inside a list-valued container
    Index(usize),
    /// Reached through nodes that are not recorded as frames
    Nested,
}

/// List-valued child containers that can hold a run of siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    /// Statements of a block, function body or switch case
    Statements,
    /// The module body
    ModuleItems,
    /// Call and `new` arguments
    Arguments,
    /// Array literal elements
    ArrayElements,
    /// Sequence expressions and template literal placeholders
    Expressions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub kind: NodeKind,
    pub span: Span,
    pub slot: Slot,
}

impl Frame {
    pub fn new(kind: NodeKind, span: Span, slot: Slot) -> Self {
        Self { kind, span, slot }
    }
}

/// A navigable handle to one node: the node's frame and its ancestors.
#[derive(Debug, Clone)]
pub struct NodePath {
    ancestors: Vec<Frame>,
    node: Frame,
}

impl NodePath {
    pub fn new(ancestors: Vec<Frame>, node: Frame) -> Self {
        Self { ancestors, node }
    }

    pub fn node(&self) -> &Frame {
        &self.node
    }

    pub fn parent(&self) -> Option<&Frame> {
        self.ancestors.last()
    }

    /// Ancestors from the innermost outwards
    pub fn ancestors(&self) -> impl Iterator<Item = &Frame> {
        self.ancestors.iter().rev()
    }

    /// The outermost frame, when it is the module
    pub fn root(&self) -> Option<&Frame> {
        self.ancestors
            .first()
            .filter(|frame| frame.kind == NodeKind::Module)
    }

    pub fn depth(&self) -> usize {
        self.ancestors.len()
    }
}

/// The result of locating a selection: one node, or a run of siblings that
/// share a list container.
#[derive(Debug, Clone)]
pub struct LocatedNodes {
    pub ancestors: Vec<Frame>,
    pub nodes: Vec<Frame>,
    pub container: Option<ListKind>,
}

impl LocatedNodes {
    pub fn first(&self) -> &Frame {
        &self.nodes[0]
    }

    pub fn is_single(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn parent(&self) -> Option<&Frame> {
        self.ancestors.last()
    }

    /// Path of the first located node
    pub fn path(&self) -> NodePath {
        NodePath::new(self.ancestors.clone(), *self.first())
    }

    /// Paths of every located node, in container order
    pub fn paths(&self) -> Vec<NodePath> {
        self.nodes
            .iter()
            .map(|node| NodePath::new(self.ancestors.clone(), *node))
            .collect()
    }

    /// Span from the first node's start to the last node's end
    pub fn span(&self) -> Span {
        let first = self.first().span;
        match self.nodes.last() {
            Some(last) => first.with_hi(last.span.hi),
            None => first,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_common::{BytePos, DUMMY_SP};

    fn span(lo: u32, hi: u32) -> Span {
        Span::new(BytePos(lo), BytePos(hi))
    }

    #[test]
    fn test_ancestors_walk_innermost_first() {
        let path = NodePath::new(
            vec![
                Frame::new(NodeKind::Module, DUMMY_SP, Slot::Root),
                Frame::new(NodeKind::ClassDecl, DUMMY_SP, Slot::Nested),
                Frame::new(NodeKind::Function { block_body: true }, DUMMY_SP, Slot::Nested),
            ],
            Frame::new(NodeKind::ExprStmt, DUMMY_SP, Slot::Index(0)),
        );
        let kinds: Vec<NodeKind> = path.ancestors().map(|frame| frame.kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Function { block_body: true },
                NodeKind::ClassDecl,
                NodeKind::Module
            ]
        );
        assert_eq!(path.parent().map(|f| f.kind), Some(NodeKind::Function { block_body: true }));
        assert_eq!(path.root().map(|f| f.kind), Some(NodeKind::Module));
        assert_eq!(path.depth(), 3);
    }

    #[test]
    fn test_located_span_covers_run() {
        let located = LocatedNodes {
            ancestors: vec![Frame::new(NodeKind::Module, span(1, 40), Slot::Root)],
            nodes: vec![
                Frame::new(NodeKind::ExprStmt, span(5, 10), Slot::Index(1)),
                Frame::new(NodeKind::ExprStmt, span(11, 20), Slot::Index(2)),
            ],
            container: Some(ListKind::ModuleItems),
        };
        assert_eq!(located.span(), span(5, 20));
        assert!(!located.is_single());
        assert_eq!(located.paths().len(), 2);
    }

    #[test]
    fn test_kind_categories() {
        assert!(NodeKind::ExprStmt.is_statement());
        assert!(!NodeKind::ExprStmt.is_expression());
        assert!(NodeKind::Arrow { block_body: false }.is_expression());
        assert!(!NodeKind::Arrow { block_body: false }.has_block_body());
        assert!(NodeKind::Constructor { block_body: true }.has_block_body());
    }
}
