//! Tree mutation: replace the located code with the call and insert the new
//! declaration into its container.
//!
//! Both edits run against the owned module of a single extraction. Sibling
//! runs are collapsed by replacing the first element and filtering the rest
//! out of the same vector, so no traversal ever iterates a list it is
//! shrinking.

use crate::node_path::{ListKind, LocatedNodes, NodeKind};
use crate::scope::InsertionTarget;
use crate::synthesis::SynthesizedMember;
use carve_foundation::{ExtractError, ExtractResult};
use swc_common::{Span, Spanned, DUMMY_SP};
use swc_ecma_ast::*;
use swc_ecma_visit::{VisitMut, VisitMutWith};
use tracing::debug;

/// Replace the located nodes with `call`.
///
/// A statement-shaped site receives `call;` (or `return call;` when
/// `as_return` is set); an expression-shaped site receives the call itself.
/// The replacement takes over the span of the located run, so comments
/// attached just before or after the selection stay in the document.
pub fn replace_call_site(
    module: &mut Module,
    located: &LocatedNodes,
    call: Box<Expr>,
    as_return: bool,
) -> ExtractResult<()> {
    let mut rewriter = CallSiteRewriter {
        first: located.first().span,
        first_kind: located.first().kind,
        site: located.span(),
        rest: located.nodes[1..].iter().map(|frame| frame.span).collect(),
        container: located.container,
        call: Some(call),
        as_return,
    };
    module.visit_mut_with(&mut rewriter);

    if rewriter.call.is_some() {
        return Err(ExtractError::splice(
            "The selected code could not be found in the syntax tree",
        ));
    }
    debug!(removed = rewriter.rest.len(), "Replaced call site");
    Ok(())
}

/// Append `member` to the body of `target`.
pub fn insert_member(
    module: &mut Module,
    target: &InsertionTarget,
    member: SynthesizedMember,
) -> ExtractResult<()> {
    if target.kind == NodeKind::Module {
        let SynthesizedMember::Function(decl) = member else {
            return Err(ExtractError::splice("A method cannot be inserted at module level"));
        };
        module
            .body
            .push(ModuleItem::Stmt(Stmt::Decl(Decl::Fn(decl))));
        debug!(scope = %target.scope, "Inserted declaration into module body");
        return Ok(());
    }

    let mut injector = MemberInjector {
        target: *target,
        member: Some(member),
    };
    module.visit_mut_with(&mut injector);

    if injector.member.is_some() {
        return Err(ExtractError::splice(format!(
            "No {} container was found to receive the extracted code",
            target.scope
        )));
    }
    debug!(scope = %target.scope, "Inserted declaration");
    Ok(())
}

struct CallSiteRewriter {
    first: Span,
    first_kind: NodeKind,
    /// Span of the whole located run
    site: Span,
    rest: Vec<Span>,
    container: Option<ListKind>,
    /// Taken once the call is in place
    call: Option<Box<Expr>>,
    as_return: bool,
}

impl CallSiteRewriter {
    fn done(&self) -> bool {
        self.call.is_none()
    }

    /// Replace the first located element of `items` and drop the rest of the
    /// run. Returns false when this list does not hold the run.
    fn splice_list<T>(
        &mut self,
        items: &mut Vec<T>,
        span_of: impl Fn(&T) -> Span,
        wrap: impl FnOnce(Box<Expr>) -> T,
    ) -> bool {
        let Some(index) = items.iter().position(|item| span_of(item) == self.first) else {
            return false;
        };
        let Some(call) = self.call.take() else {
            return false;
        };
        items[index] = wrap(call);
        let rest = &self.rest;
        items.retain(|item| !rest.contains(&span_of(item)));
        true
    }

    fn in_list(&self, kind: ListKind) -> bool {
        self.container == Some(kind)
    }
}

fn call_statement(call: Box<Expr>, as_return: bool, site: Span) -> Stmt {
    if as_return {
        Stmt::Return(ReturnStmt {
            span: site,
            arg: Some(call),
        })
    } else {
        Stmt::Expr(ExprStmt {
            span: site,
            expr: call,
        })
    }
}

fn call_expression(mut call: Box<Expr>, site: Span) -> Box<Expr> {
    // `await` binds looser than most operators it may land between
    if matches!(*call, Expr::Await(_)) {
        return Box::new(Expr::Paren(ParenExpr {
            span: site,
            expr: call,
        }));
    }
    if let Expr::Call(inner) = &mut *call {
        inner.span = site;
    }
    call
}

impl VisitMut for CallSiteRewriter {
    fn visit_mut_module_items(&mut self, items: &mut Vec<ModuleItem>) {
        if self.done() {
            return;
        }
        if self.in_list(ListKind::ModuleItems) {
            let (as_return, site) = (self.as_return, self.site);
            if self.splice_list(items, |item| item.span(), |call| {
                ModuleItem::Stmt(call_statement(call, as_return, site))
            }) {
                return;
            }
        }
        for item in items.iter_mut() {
            item.visit_mut_with(self);
        }
    }

    fn visit_mut_stmts(&mut self, stmts: &mut Vec<Stmt>) {
        if self.done() {
            return;
        }
        if self.in_list(ListKind::Statements) {
            let (as_return, site) = (self.as_return, self.site);
            if self.splice_list(stmts, |stmt| stmt.span(), |call| {
                call_statement(call, as_return, site)
            }) {
                return;
            }
        }
        for stmt in stmts.iter_mut() {
            stmt.visit_mut_with(self);
        }
    }

    fn visit_mut_expr_or_spreads(&mut self, args: &mut Vec<ExprOrSpread>) {
        if self.done() {
            return;
        }
        let site = self.site;
        if self.in_list(ListKind::Arguments)
            && self.splice_list(args, |arg| arg.span(), |call| ExprOrSpread {
                spread: None,
                expr: call_expression(call, site),
            })
        {
            return;
        }
        for arg in args.iter_mut() {
            arg.visit_mut_with(self);
        }
    }

    fn visit_mut_opt_vec_expr_or_spreads(&mut self, elems: &mut Vec<Option<ExprOrSpread>>) {
        if self.done() {
            return;
        }
        let span_of = |elem: &Option<ExprOrSpread>| elem.as_ref().map(|e| e.span()).unwrap_or(DUMMY_SP);
        let site = self.site;
        if self.in_list(ListKind::ArrayElements)
            && self.splice_list(elems, span_of, |call| {
                Some(ExprOrSpread {
                    spread: None,
                    expr: call_expression(call, site),
                })
            })
        {
            return;
        }
        for elem in elems.iter_mut() {
            elem.visit_mut_with(self);
        }
    }

    fn visit_mut_exprs(&mut self, exprs: &mut Vec<Box<Expr>>) {
        if self.done() {
            return;
        }
        let site = self.site;
        if self.in_list(ListKind::Expressions)
            && self.splice_list(exprs, |expr| expr.span(), |call| call_expression(call, site))
        {
            return;
        }
        for expr in exprs.iter_mut() {
            expr.visit_mut_with(self);
        }
    }

    fn visit_mut_stmt(&mut self, stmt: &mut Stmt) {
        if self.done() {
            return;
        }
        if self.container.is_none() && stmt.span() == self.first && self.first_kind.is_statement() {
            if let Some(call) = self.call.take() {
                *stmt = call_statement(call, self.as_return, self.site);
            }
            return;
        }
        stmt.visit_mut_children_with(self);
    }

    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        if self.done() {
            return;
        }
        if self.container.is_none() && expr.span() == self.first && self.first_kind.is_expression() {
            if let Some(call) = self.call.take() {
                *expr = *call_expression(call, self.site);
            }
            return;
        }
        expr.visit_mut_children_with(self);
    }
}

struct MemberInjector {
    target: InsertionTarget,
    member: Option<SynthesizedMember>,
}

impl MemberInjector {
    fn matches(&self, kind: NodeKind, span: Span) -> bool {
        self.member.is_some() && self.target.kind == kind && self.target.span == span
    }

    fn push_function(&mut self, body: &mut BlockStmt) {
        if let Some(SynthesizedMember::Function(decl)) = self.member.take() {
            body.stmts.push(Stmt::Decl(Decl::Fn(decl)));
        }
    }
}

impl VisitMut for MemberInjector {
    fn visit_mut_class(&mut self, class: &mut Class) {
        if self.member.is_none() {
            return;
        }
        if self.matches(NodeKind::ClassDecl, class.span) {
            if let Some(SynthesizedMember::Method(method)) = self.member.take() {
                class.body.push(ClassMember::Method(method));
            }
            return;
        }
        class.visit_mut_children_with(self);
    }

    fn visit_mut_function(&mut self, function: &mut Function) {
        if self.member.is_none() {
            return;
        }
        if self.matches(NodeKind::Function { block_body: true }, function.span) {
            if let Some(body) = &mut function.body {
                self.push_function(body);
            }
            return;
        }
        function.visit_mut_children_with(self);
    }

    fn visit_mut_constructor(&mut self, constructor: &mut Constructor) {
        if self.member.is_none() {
            return;
        }
        if self.matches(NodeKind::Constructor { block_body: true }, constructor.span) {
            if let Some(body) = &mut constructor.body {
                self.push_function(body);
            }
            return;
        }
        constructor.visit_mut_children_with(self);
    }

    fn visit_mut_getter_prop(&mut self, prop: &mut GetterProp) {
        if self.member.is_none() {
            return;
        }
        if self.matches(NodeKind::Accessor { block_body: true }, prop.span) {
            if let Some(body) = &mut prop.body {
                self.push_function(body);
            }
            return;
        }
        prop.visit_mut_children_with(self);
    }

    fn visit_mut_setter_prop(&mut self, prop: &mut SetterProp) {
        if self.member.is_none() {
            return;
        }
        if self.matches(NodeKind::Accessor { block_body: true }, prop.span) {
            if let Some(body) = &mut prop.body {
                self.push_function(body);
            }
            return;
        }
        prop.visit_mut_children_with(self);
    }

    fn visit_mut_arrow_expr(&mut self, arrow: &mut ArrowExpr) {
        if self.member.is_none() {
            return;
        }
        if self.matches(NodeKind::Arrow { block_body: true }, arrow.span) {
            if let BlockStmtOrExpr::BlockStmt(body) = &mut *arrow.body {
                self.push_function(body);
            }
            return;
        }
        arrow.visit_mut_children_with(self);
    }
}
