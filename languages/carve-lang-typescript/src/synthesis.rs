//! Construction of the new declaration and its call expression.

use crate::analysis::{FragmentAnalysis, Parameter};
use crate::parser::Snippet;
use crate::scope::InsertionTarget;
use carve_foundation::{ExtractError, ExtractResult, ScopeKind};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use swc_common::{SyntaxContext, DUMMY_SP};
use swc_ecma_ast::*;
use tracing::warn;

static RESERVED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
        "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for",
        "function", "if", "implements", "import", "in", "instanceof", "interface", "let", "new",
        "null", "package", "private", "protected", "public", "return", "static", "super",
        "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with",
        "yield",
    ]
    .into_iter()
    .collect()
});

/// Check that `name` can be used as a function or method name.
pub fn validate_function_name(name: &str) -> ExtractResult<()> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(ExtractError::invalid_input("Function name must not be empty"));
    };
    let starts_well = first.is_alphabetic() || first == '_' || first == '$';
    let continues_well = chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$');
    if !starts_well || !continues_well {
        return Err(ExtractError::invalid_input(format!(
            "'{}' is not a valid identifier",
            name
        )));
    }
    if RESERVED_WORDS.contains(name) {
        return Err(ExtractError::invalid_input(format!(
            "'{}' is a reserved word",
            name
        )));
    }
    Ok(())
}

/// The declaration inserted into the chosen container.
#[derive(Debug, Clone)]
pub enum SynthesizedMember {
    Method(ClassMethod),
    Function(FnDecl),
}

/// Declaration plus the expression that replaces the located code.
#[derive(Debug, Clone)]
pub struct Synthesis {
    pub member: SynthesizedMember,
    pub call: Box<Expr>,
}

/// Build the declaration for `target` and the call that replaces the
/// selection.
pub fn synthesize(
    target: &InsertionTarget,
    name: &str,
    analysis: &FragmentAnalysis,
) -> ExtractResult<Synthesis> {
    let scope = target.scope;
    validate_function_name(name)?;
    if !scope.is_member_call() && analysis.declared_names.contains(name) {
        warn!(name, "Extracted function name is already bound in this file");
    }

    let function = build_function(analysis);
    let member = match scope {
        ScopeKind::ClassMethod => SynthesizedMember::Method(ClassMethod {
            span: DUMMY_SP,
            key: PropName::Ident(IdentName::new(name.into(), DUMMY_SP)),
            function,
            kind: MethodKind::Method,
            is_static: target.is_static,
            accessibility: None,
            is_abstract: false,
            is_optional: false,
            is_override: false,
        }),
        ScopeKind::NestedFunction | ScopeKind::TopLevelFunction => {
            SynthesizedMember::Function(FnDecl {
                ident: ident(name),
                declare: false,
                function,
            })
        }
    };

    Ok(Synthesis {
        member,
        call: build_call(scope, name, &analysis.parameters, analysis.is_async),
    })
}

fn build_function(analysis: &FragmentAnalysis) -> Box<Function> {
    let params = analysis
        .parameters
        .iter()
        .map(|param| Param {
            span: DUMMY_SP,
            decorators: vec![],
            pat: Pat::Ident(BindingIdent {
                id: ident(&param.name),
                type_ann: param.type_ann.clone(),
            }),
        })
        .collect();

    let stmts = match &analysis.body {
        Snippet::Expression(expr) => vec![Stmt::Return(ReturnStmt {
            span: DUMMY_SP,
            arg: Some(expr.clone()),
        })],
        Snippet::Statements(stmts) => stmts.clone(),
    };

    Box::new(Function {
        params,
        decorators: vec![],
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        body: Some(BlockStmt {
            span: DUMMY_SP,
            ctxt: SyntaxContext::empty(),
            stmts,
        }),
        is_generator: false,
        is_async: analysis.is_async,
        type_params: None,
        return_type: None,
    })
}

fn build_call(scope: ScopeKind, name: &str, parameters: &[Parameter], is_async: bool) -> Box<Expr> {
    let callee = if scope.is_member_call() {
        Expr::Member(MemberExpr {
            span: DUMMY_SP,
            obj: Box::new(Expr::This(ThisExpr { span: DUMMY_SP })),
            prop: MemberProp::Ident(IdentName::new(name.into(), DUMMY_SP)),
        })
    } else {
        Expr::Ident(ident(name))
    };

    let call = Expr::Call(CallExpr {
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        callee: Callee::Expr(Box::new(callee)),
        args: parameters
            .iter()
            .map(|param| ExprOrSpread {
                spread: None,
                expr: Box::new(Expr::Ident(ident(&param.name))),
            })
            .collect(),
        type_args: None,
    });

    if is_async {
        Box::new(Expr::Await(AwaitExpr {
            span: DUMMY_SP,
            arg: Box::new(call),
        }))
    } else {
        Box::new(call)
    }
}

fn ident(name: &str) -> Ident {
    Ident::new_no_ctxt(name.into(), DUMMY_SP)
}
