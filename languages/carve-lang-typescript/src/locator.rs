//! Selection-to-node location.
//!
//! A single pre-order walk looks for the first candidate node whose start
//! coincides with the normalized selection start. Candidates inside a list
//! container (statement bodies, module items, arguments, array elements and
//! sequences) gather the following siblings that still end inside the
//! selection; anywhere else the candidate stands alone and must end on the
//! selection's end line.

use crate::node_path::{Frame, ListKind, LocatedNodes, NodeKind, Slot};
use crate::parser::SyntaxTree;
use carve_foundation::{ExtractError, ExtractResult, NormalizedRange};
use swc_common::{Span, Spanned};
use swc_ecma_ast::*;
use swc_ecma_visit::{Visit, VisitWith};
use tracing::debug;

/// Find the node(s) a normalized selection refers to.
pub fn locate_nodes(tree: &SyntaxTree, target: &NormalizedRange) -> ExtractResult<LocatedNodes> {
    let mut locator = NodeLocator {
        tree,
        target: *target,
        ancestors: Vec::new(),
        pending_slot: Slot::Root,
        outcome: None,
    };
    tree.module.visit_with(&mut locator);

    let located = locator.outcome.unwrap_or(Err(ExtractError::SpanMismatch))?;
    debug!(
        nodes = located.nodes.len(),
        container = ?located.container,
        kind = ?located.first().kind,
        "Located selection"
    );
    Ok(located)
}

struct NodeLocator<'a> {
    tree: &'a SyntaxTree,
    target: NormalizedRange,
    ancestors: Vec<Frame>,
    /// Slot the next visited statement or expression occupies in its parent
    pending_slot: Slot,
    outcome: Option<ExtractResult<LocatedNodes>>,
}

impl NodeLocator<'_> {
    fn done(&self) -> bool {
        self.outcome.is_some()
    }

    fn take_slot(&mut self) -> Slot {
        std::mem::replace(&mut self.pending_slot, Slot::Nested)
    }

    fn starts_at_target(&self, span: Span) -> bool {
        self.tree.range_of(span).start == self.target.start
    }

    fn ends_inside_target(&self, span: Span) -> bool {
        self.tree.range_of(span).end.ends_within(&self.target.end)
    }

    fn enter(&mut self, frame: Frame, visit_children: impl FnOnce(&mut Self)) {
        self.ancestors.push(frame);
        visit_children(self);
        self.ancestors.pop();
    }

    /// Anchor check for a node outside any list container.
    fn anchor_single(&mut self, kind: NodeKind, span: Span, slot: Slot) -> bool {
        if !self.starts_at_target(span) {
            return false;
        }
        let end = self.tree.range_of(span).end;
        let aligned = end.line == self.target.end.line && end.column <= self.target.end.column + 1;
        self.outcome = Some(if aligned {
            Ok(LocatedNodes {
                ancestors: self.ancestors.clone(),
                nodes: vec![Frame::new(kind, span, slot)],
                container: None,
            })
        } else {
            Err(ExtractError::SpanMismatch)
        });
        true
    }

    /// Walk a list container, anchoring on the first element that starts at
    /// the selection and collecting the run of siblings that follows it.
    fn visit_list<T>(
        &mut self,
        container: ListKind,
        items: &[T],
        describe: impl Fn(&T) -> Option<(NodeKind, Span)>,
        visit_item: impl Fn(&mut Self, &T),
    ) {
        for (index, item) in items.iter().enumerate() {
            if self.done() {
                return;
            }
            let Some((_, span)) = describe(item) else {
                continue;
            };
            if self.starts_at_target(span) {
                let nodes: Vec<Frame> = items[index..]
                    .iter()
                    .map(|item| describe(item))
                    .enumerate()
                    .map_while(|(offset, described)| {
                        described.map(|(kind, span)| Frame::new(kind, span, Slot::Index(index + offset)))
                    })
                    .take_while(|frame| self.ends_inside_target(frame.span))
                    .collect();

                self.outcome = Some(if nodes.is_empty() {
                    Err(ExtractError::SpanMismatch)
                } else {
                    Ok(LocatedNodes {
                        ancestors: self.ancestors.clone(),
                        nodes,
                        container: Some(container),
                    })
                });
                return;
            }
            self.pending_slot = Slot::Index(index);
            visit_item(self, item);
        }
        self.pending_slot = Slot::Nested;
    }

    fn visit_field<N: VisitWith<Self> + ?Sized>(&mut self, name: &'static str, node: &N) {
        if self.done() {
            return;
        }
        self.pending_slot = Slot::Field(name);
        node.visit_with(self);
        self.pending_slot = Slot::Nested;
    }
}

impl Visit for NodeLocator<'_> {
    fn visit_module(&mut self, module: &Module) {
        let frame = Frame::new(NodeKind::Module, module.span, Slot::Root);
        self.enter(frame, |v| module.visit_children_with(v));
    }

    fn visit_module_items(&mut self, items: &[ModuleItem]) {
        self.visit_list(
            ListKind::ModuleItems,
            items,
            |item| Some((module_item_kind(item), item.span())),
            |v, item| item.visit_with(v),
        );
    }

    fn visit_module_item(&mut self, item: &ModuleItem) {
        if self.done() {
            return;
        }
        match item {
            ModuleItem::Stmt(stmt) => stmt.visit_with(self),
            ModuleItem::ModuleDecl(decl) => {
                let slot = self.take_slot();
                if self.anchor_single(NodeKind::ModuleDecl, decl.span(), slot) {
                    return;
                }
                let frame = Frame::new(NodeKind::ModuleDecl, decl.span(), slot);
                self.enter(frame, |v| decl.visit_children_with(v));
            }
        }
    }

    fn visit_stmts(&mut self, stmts: &[Stmt]) {
        self.visit_list(
            ListKind::Statements,
            stmts,
            |stmt| Some((stmt_kind(stmt), stmt.span())),
            |v, stmt| stmt.visit_with(v),
        );
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        if self.done() {
            return;
        }
        let slot = self.take_slot();
        let kind = stmt_kind(stmt);
        let span = stmt.span();
        if self.anchor_single(kind, span, slot) {
            return;
        }
        self.enter(Frame::new(kind, span, slot), |v| stmt.visit_children_with(v));
    }

    fn visit_expr(&mut self, expr: &Expr) {
        if self.done() {
            return;
        }
        let slot = self.take_slot();
        let kind = expr_kind(expr);
        let span = expr.span();
        if self.anchor_single(kind, span, slot) {
            return;
        }
        self.enter(Frame::new(kind, span, slot), |v| expr.visit_children_with(v));
    }

    fn visit_expr_or_spreads(&mut self, args: &[ExprOrSpread]) {
        self.visit_list(
            ListKind::Arguments,
            args,
            |arg| Some((expr_kind(&arg.expr), arg.span())),
            |v, arg| arg.visit_with(v),
        );
    }

    fn visit_opt_vec_expr_or_spreads(&mut self, elems: &[Option<ExprOrSpread>]) {
        self.visit_list(
            ListKind::ArrayElements,
            elems,
            |elem| elem.as_ref().map(|elem| (expr_kind(&elem.expr), elem.span())),
            |v, elem| elem.visit_with(v),
        );
    }

    fn visit_exprs(&mut self, exprs: &[Box<Expr>]) {
        self.visit_list(
            ListKind::Expressions,
            exprs,
            |expr| Some((expr_kind(expr), expr.span())),
            |v, expr| expr.visit_with(v),
        );
    }

    fn visit_if_stmt(&mut self, node: &IfStmt) {
        self.visit_field("test", &node.test);
        self.visit_field("cons", &node.cons);
        if let Some(alt) = &node.alt {
            self.visit_field("alt", alt);
        }
    }

    fn visit_labeled_stmt(&mut self, node: &LabeledStmt) {
        self.visit_field("body", &node.body);
    }

    fn visit_bin_expr(&mut self, node: &BinExpr) {
        self.visit_field("left", &node.left);
        self.visit_field("right", &node.right);
    }

    fn visit_cond_expr(&mut self, node: &CondExpr) {
        self.visit_field("test", &node.test);
        self.visit_field("cons", &node.cons);
        self.visit_field("alt", &node.alt);
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        if let Callee::Expr(callee) = &node.callee {
            self.visit_field("callee", callee);
        }
        node.args.visit_with(self);
    }

    fn visit_new_expr(&mut self, node: &NewExpr) {
        self.visit_field("callee", &node.callee);
        if let Some(args) = &node.args {
            args.visit_with(self);
        }
    }

    fn visit_var_declarator(&mut self, node: &VarDeclarator) {
        if self.done() {
            return;
        }
        let frame = Frame::new(NodeKind::VarDeclarator, node.span, self.take_slot());
        self.enter(frame, |v| {
            node.name.visit_with(v);
            if let Some(init) = &node.init {
                v.visit_field("init", init);
            }
        });
    }

    fn visit_key_value_prop(&mut self, node: &KeyValueProp) {
        if self.done() {
            return;
        }
        let frame = Frame::new(NodeKind::KeyValueProp, node.span(), self.take_slot());
        self.enter(frame, |v| {
            node.key.visit_with(v);
            v.visit_field("value", &node.value);
        });
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr) {
        node.params.visit_with(self);
        match &*node.body {
            BlockStmtOrExpr::BlockStmt(block) => block.visit_with(self),
            BlockStmtOrExpr::Expr(body) => self.visit_field("body", body),
        }
    }

    fn visit_function(&mut self, node: &Function) {
        if self.done() {
            return;
        }
        let kind = NodeKind::Function {
            block_body: node.body.is_some(),
        };
        let frame = Frame::new(kind, node.span, Slot::Nested);
        self.enter(frame, |v| node.visit_children_with(v));
    }

    fn visit_constructor(&mut self, node: &Constructor) {
        if self.done() {
            return;
        }
        let kind = NodeKind::Constructor {
            block_body: node.body.is_some(),
        };
        let frame = Frame::new(kind, node.span, Slot::Nested);
        self.enter(frame, |v| node.visit_children_with(v));
    }

    fn visit_getter_prop(&mut self, node: &GetterProp) {
        if self.done() {
            return;
        }
        let kind = NodeKind::Accessor {
            block_body: node.body.is_some(),
        };
        self.enter(Frame::new(kind, node.span, Slot::Nested), |v| {
            node.visit_children_with(v)
        });
    }

    fn visit_setter_prop(&mut self, node: &SetterProp) {
        if self.done() {
            return;
        }
        let kind = NodeKind::Accessor {
            block_body: node.body.is_some(),
        };
        self.enter(Frame::new(kind, node.span, Slot::Nested), |v| {
            node.visit_children_with(v)
        });
    }

    fn visit_class_member(&mut self, member: &ClassMember) {
        if self.done() {
            return;
        }
        if is_static_member(member) {
            let frame = Frame::new(NodeKind::StaticMember, member.span(), Slot::Nested);
            self.enter(frame, |v| member.visit_children_with(v));
        } else {
            member.visit_children_with(self);
        }
    }

    fn visit_class_decl(&mut self, node: &ClassDecl) {
        if self.done() {
            return;
        }
        let frame = Frame::new(NodeKind::ClassDecl, node.class.span, Slot::Nested);
        self.enter(frame, |v| node.class.visit_with(v));
    }

    fn visit_default_decl(&mut self, node: &DefaultDecl) {
        if self.done() {
            return;
        }
        match node {
            // `export default class X {}` is a declaration, not an expression
            DefaultDecl::Class(class) => {
                let frame = Frame::new(NodeKind::ClassDecl, class.class.span, Slot::Nested);
                self.enter(frame, |v| class.class.visit_with(v));
            }
            _ => node.visit_children_with(self),
        }
    }

    fn visit_class_expr(&mut self, node: &ClassExpr) {
        if self.done() {
            return;
        }
        let frame = Frame::new(NodeKind::ClassExpr, node.class.span, Slot::Nested);
        self.enter(frame, |v| node.class.visit_with(v));
    }
}

fn is_static_member(member: &ClassMember) -> bool {
    match member {
        ClassMember::Method(method) => method.is_static,
        ClassMember::PrivateMethod(method) => method.is_static,
        ClassMember::ClassProp(prop) => prop.is_static,
        ClassMember::PrivateProp(prop) => prop.is_static,
        ClassMember::StaticBlock(_) => true,
        _ => false,
    }
}

fn module_item_kind(item: &ModuleItem) -> NodeKind {
    match item {
        ModuleItem::Stmt(stmt) => stmt_kind(stmt),
        ModuleItem::ModuleDecl(_) => NodeKind::ModuleDecl,
    }
}

fn stmt_kind(stmt: &Stmt) -> NodeKind {
    match stmt {
        Stmt::Block(_) => NodeKind::BlockStmt,
        Stmt::Expr(_) => NodeKind::ExprStmt,
        Stmt::If(_) => NodeKind::IfStmt,
        Stmt::Labeled(_) => NodeKind::LabeledStmt,
        Stmt::Return(_) => NodeKind::ReturnStmt,
        Stmt::Decl(_) => NodeKind::Declaration,
        _ => NodeKind::Statement,
    }
}

fn expr_kind(expr: &Expr) -> NodeKind {
    match expr {
        Expr::Call(_) => NodeKind::Call,
        Expr::New(_) => NodeKind::New,
        Expr::Cond(_) => NodeKind::Conditional,
        Expr::Bin(bin)
            if matches!(
                bin.op,
                BinaryOp::LogicalAnd | BinaryOp::LogicalOr | BinaryOp::NullishCoalescing
            ) =>
        {
            NodeKind::Logical
        }
        Expr::Arrow(arrow) => NodeKind::Arrow {
            block_body: matches!(*arrow.body, BlockStmtOrExpr::BlockStmt(_)),
        },
        _ => NodeKind::Expression,
    }
}
