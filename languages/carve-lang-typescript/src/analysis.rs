//! Free-variable and shape analysis of the extracted fragment.
//!
//! The fragment is re-parsed on its own from the located source text, then
//! scanned for identifier references that nothing inside it declares. Those
//! become the new function's parameters, typed with the first annotation the
//! file gives each name.

use crate::node_path::{LocatedNodes, NodeKind, Slot};
use crate::parser::{Snippet, SnippetMode, SyntaxTree};
use carve_foundation::ExtractResult;
use indexmap::IndexSet;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use swc_common::{Span, DUMMY_SP};
use swc_ecma_ast::*;
use swc_ecma_visit::{Visit, VisitMut, VisitMutWith, VisitWith};
use tracing::{debug, warn};

/// Globals that are never turned into parameters unless the file declares them.
static DEFAULT_AMBIENT_GLOBALS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "console", "Math", "JSON", "window", "document", "globalThis", "undefined", "NaN",
        "Infinity", "arguments", "Object", "Array", "String", "Number", "Boolean", "Symbol",
        "BigInt", "Promise", "Date", "RegExp", "Error", "TypeError", "RangeError", "Map", "Set",
        "WeakMap", "WeakSet", "Reflect", "Proxy", "Intl", "parseInt", "parseFloat", "isNaN",
        "isFinite", "setTimeout", "clearTimeout", "setInterval", "clearInterval", "fetch",
        "require", "module", "exports", "process",
    ]
});

pub fn default_ambient_globals() -> HashSet<String> {
    DEFAULT_AMBIENT_GLOBALS.iter().map(|name| name.to_string()).collect()
}

/// One parameter of the extracted function.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub type_ann: Option<Box<TsTypeAnn>>,
}

/// Everything the synthesizer needs to know about the fragment.
#[derive(Debug, Clone)]
pub struct FragmentAnalysis {
    pub parameters: Vec<Parameter>,
    pub body: Snippet,
    /// The new function returns the fragment's value
    pub needs_return: bool,
    /// The fragment awaits at its own function level
    pub is_async: bool,
    /// The fragment ends in `return`, so the call site must return too
    pub returns_at_call_site: bool,
    /// Every name bound anywhere in the file
    pub declared_names: HashSet<String>,
}

/// Analyze the located nodes of `tree`.
pub fn analyze_fragment(
    tree: &SyntaxTree,
    located: &LocatedNodes,
    ambient_globals: &HashSet<String>,
) -> ExtractResult<FragmentAnalysis> {
    let wants_return = needs_return(located);
    let first = located.first().kind;
    let expression_shaped = first.is_expression() || first == NodeKind::ExprStmt;
    if wants_return && !expression_shaped {
        debug!(kind = ?first, "Return needed but fragment is not an expression, keeping statements");
    }
    let needs_return = wants_return && expression_shaped;

    let text = tree.text_of(located.span())?;
    let mode = if needs_return {
        SnippetMode::Expression
    } else {
        SnippetMode::Statements
    };
    let body = tree.parse_snippet(&text, mode)?;

    let free = free_variables(&body);
    let survey = survey_bindings(&tree.module, &free);

    let parameters: Vec<Parameter> = free
        .into_iter()
        .filter(|name| !ambient_globals.contains(name) || survey.declared.contains(name))
        .map(|name| Parameter {
            type_ann: survey.annotations.get(&name).cloned(),
            name,
        })
        .collect();

    let is_async = contains_await(&body);
    let (returns_at_call_site, returns_elsewhere) = match &body {
        Snippet::Statements(stmts) => {
            let trailing = matches!(stmts.last(), Some(Stmt::Return(_)));
            (trailing, !trailing && contains_return(stmts))
        }
        Snippet::Expression(_) => (false, false),
    };
    if returns_elsewhere {
        warn!("Extracted statements return early without a trailing return; the call site will not propagate it");
    }

    debug!(
        parameters = ?parameters.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
        needs_return,
        is_async,
        returns_at_call_site,
        "Analyzed fragment"
    );

    Ok(FragmentAnalysis {
        parameters,
        body,
        needs_return,
        is_async,
        returns_at_call_site,
        declared_names: survey.declared,
    })
}

/// Whether the new function must return the located node's value.
pub fn needs_return(located: &LocatedNodes) -> bool {
    if !located.is_single() {
        return false;
    }
    let node = located.first();
    let consumed = located
        .parent()
        .map(|parent| value_consumed_by(parent.kind, node.slot))
        .unwrap_or(false);
    consumed || node.kind.is_expression()
}

fn value_consumed_by(parent: NodeKind, slot: Slot) -> bool {
    match parent {
        NodeKind::VarDeclarator => slot == Slot::Field("init"),
        NodeKind::KeyValueProp => slot == Slot::Field("value"),
        NodeKind::Arrow { block_body: false } => slot == Slot::Field("body"),
        NodeKind::Call | NodeKind::New => matches!(slot, Slot::Index(_)),
        NodeKind::IfStmt | NodeKind::LabeledStmt | NodeKind::Logical | NodeKind::Conditional => {
            true
        }
        _ => false,
    }
}

/// Free variables of a fragment in first-occurrence order.
pub fn free_variables(snippet: &Snippet) -> IndexSet<String> {
    let mut collector = FreeVariableCollector::default();
    match snippet {
        Snippet::Expression(expr) => expr.visit_with(&mut collector),
        Snippet::Statements(stmts) => {
            let names = scope_declarations(stmts, true);
            collector.with_scope(names, |v| {
                for stmt in stmts {
                    stmt.visit_with(v);
                }
            });
        }
    }
    collector.free
}

#[derive(Default)]
struct FreeVariableCollector {
    scopes: Vec<HashSet<String>>,
    free: IndexSet<String>,
}

impl FreeVariableCollector {
    fn with_scope(&mut self, names: HashSet<String>, visit: impl FnOnce(&mut Self)) {
        self.scopes.push(names);
        visit(self);
        self.scopes.pop();
    }

    fn is_bound(&self, name: &str) -> bool {
        self.scopes.iter().any(|scope| scope.contains(name))
    }

    /// Visit the expressions inside a binding pattern (defaults and computed
    /// keys) without treating the bound names as references.
    fn visit_binding_defaults(&mut self, pat: &Pat) {
        match pat {
            Pat::Ident(_) | Pat::Invalid(_) => {}
            Pat::Array(array) => {
                for elem in array.elems.iter().flatten() {
                    self.visit_binding_defaults(elem);
                }
            }
            Pat::Rest(rest) => self.visit_binding_defaults(&rest.arg),
            Pat::Object(object) => {
                for prop in &object.props {
                    match prop {
                        ObjectPatProp::KeyValue(kv) => {
                            if let PropName::Computed(computed) = &kv.key {
                                computed.expr.visit_with(self);
                            }
                            self.visit_binding_defaults(&kv.value);
                        }
                        ObjectPatProp::Assign(assign) => {
                            if let Some(value) = &assign.value {
                                value.visit_with(self);
                            }
                        }
                        ObjectPatProp::Rest(rest) => self.visit_binding_defaults(&rest.arg),
                    }
                }
            }
            Pat::Assign(assign) => {
                self.visit_binding_defaults(&assign.left);
                assign.right.visit_with(self);
            }
            Pat::Expr(expr) => expr.visit_with(self),
        }
    }

    fn visit_body(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            stmt.visit_with(self);
        }
    }
}

impl Visit for FreeVariableCollector {
    fn visit_ident(&mut self, ident: &Ident) {
        let name: &str = ident.sym.as_ref();
        if !self.is_bound(name) {
            self.free.insert(name.to_string());
        }
    }

    fn visit_var_declarator(&mut self, node: &VarDeclarator) {
        self.visit_binding_defaults(&node.name);
        node.init.visit_with(self);
    }

    fn visit_fn_decl(&mut self, node: &FnDecl) {
        node.function.visit_with(self);
    }

    fn visit_fn_expr(&mut self, node: &FnExpr) {
        let names = node.ident.iter().map(|ident| ident.sym.to_string()).collect();
        self.with_scope(names, |v| node.function.visit_with(v));
    }

    fn visit_function(&mut self, node: &Function) {
        let mut names = HashSet::from(["arguments".to_string()]);
        for param in &node.params {
            collect_pat_names(&param.pat, &mut names);
        }
        if let Some(body) = &node.body {
            names.extend(scope_declarations(&body.stmts, true));
        }
        self.with_scope(names, |v| {
            for decorator in &node.decorators {
                decorator.visit_with(v);
            }
            for param in &node.params {
                v.visit_binding_defaults(&param.pat);
            }
            if let Some(body) = &node.body {
                v.visit_body(&body.stmts);
            }
        });
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr) {
        let mut names = HashSet::new();
        for pat in &node.params {
            collect_pat_names(pat, &mut names);
        }
        if let BlockStmtOrExpr::BlockStmt(block) = &*node.body {
            names.extend(scope_declarations(&block.stmts, true));
        }
        self.with_scope(names, |v| {
            for pat in &node.params {
                v.visit_binding_defaults(pat);
            }
            match &*node.body {
                BlockStmtOrExpr::BlockStmt(block) => v.visit_body(&block.stmts),
                BlockStmtOrExpr::Expr(expr) => expr.visit_with(v),
            }
        });
    }

    fn visit_constructor(&mut self, node: &Constructor) {
        let mut names = HashSet::from(["arguments".to_string()]);
        for param in &node.params {
            match param {
                ParamOrTsParamProp::Param(param) => collect_pat_names(&param.pat, &mut names),
                ParamOrTsParamProp::TsParamProp(prop) => match &prop.param {
                    TsParamPropParam::Ident(binding) => {
                        names.insert(binding.id.sym.to_string());
                    }
                    TsParamPropParam::Assign(assign) => collect_pat_names(&assign.left, &mut names),
                },
            }
        }
        if let Some(body) = &node.body {
            names.extend(scope_declarations(&body.stmts, true));
        }
        self.with_scope(names, |v| {
            for param in &node.params {
                match param {
                    ParamOrTsParamProp::Param(param) => v.visit_binding_defaults(&param.pat),
                    ParamOrTsParamProp::TsParamProp(prop) => {
                        if let TsParamPropParam::Assign(assign) = &prop.param {
                            assign.right.visit_with(v);
                        }
                    }
                }
            }
            if let Some(body) = &node.body {
                v.visit_body(&body.stmts);
            }
        });
    }

    fn visit_setter_prop(&mut self, node: &SetterProp) {
        let mut names = HashSet::new();
        collect_pat_names(&node.param, &mut names);
        if let Some(body) = &node.body {
            names.extend(scope_declarations(&body.stmts, true));
        }
        if let PropName::Computed(computed) = &node.key {
            computed.expr.visit_with(self);
        }
        self.with_scope(names, |v| {
            v.visit_binding_defaults(&node.param);
            if let Some(body) = &node.body {
                v.visit_body(&body.stmts);
            }
        });
    }

    fn visit_block_stmt(&mut self, node: &BlockStmt) {
        let names = scope_declarations(&node.stmts, false);
        self.with_scope(names, |v| v.visit_body(&node.stmts));
    }

    fn visit_catch_clause(&mut self, node: &CatchClause) {
        let mut names = HashSet::new();
        if let Some(param) = &node.param {
            collect_pat_names(param, &mut names);
        }
        self.with_scope(names, |v| {
            if let Some(param) = &node.param {
                v.visit_binding_defaults(param);
            }
            node.body.visit_with(v);
        });
    }

    fn visit_for_stmt(&mut self, node: &ForStmt) {
        let names = match &node.init {
            Some(VarDeclOrExpr::VarDecl(decl)) => lexical_names(decl),
            _ => HashSet::new(),
        };
        self.with_scope(names, |v| node.visit_children_with(v));
    }

    fn visit_for_in_stmt(&mut self, node: &ForInStmt) {
        let names = match &node.left {
            ForHead::VarDecl(decl) => lexical_names(decl),
            _ => HashSet::new(),
        };
        self.with_scope(names, |v| node.visit_children_with(v));
    }

    fn visit_for_of_stmt(&mut self, node: &ForOfStmt) {
        let names = match &node.left {
            ForHead::VarDecl(decl) => lexical_names(decl),
            _ => HashSet::new(),
        };
        self.with_scope(names, |v| node.visit_children_with(v));
    }

    fn visit_class_decl(&mut self, node: &ClassDecl) {
        node.class.visit_with(self);
    }

    fn visit_class_expr(&mut self, node: &ClassExpr) {
        let names = node.ident.iter().map(|ident| ident.sym.to_string()).collect();
        self.with_scope(names, |v| node.class.visit_with(v));
    }

    fn visit_labeled_stmt(&mut self, node: &LabeledStmt) {
        node.body.visit_with(self);
    }

    fn visit_break_stmt(&mut self, _: &BreakStmt) {}

    fn visit_continue_stmt(&mut self, _: &ContinueStmt) {}

    fn visit_ts_enum_decl(&mut self, node: &TsEnumDecl) {
        for member in &node.members {
            member.init.visit_with(self);
        }
    }

    // Type positions and JSX tag names are not value references
    fn visit_ts_type_ann(&mut self, _: &TsTypeAnn) {}
    fn visit_ts_type(&mut self, _: &TsType) {}
    fn visit_ts_type_param_decl(&mut self, _: &TsTypeParamDecl) {}
    fn visit_ts_type_param_instantiation(&mut self, _: &TsTypeParamInstantiation) {}
    fn visit_ts_interface_decl(&mut self, _: &TsInterfaceDecl) {}
    fn visit_ts_type_alias_decl(&mut self, _: &TsTypeAliasDecl) {}
    fn visit_ts_module_decl(&mut self, _: &TsModuleDecl) {}
    fn visit_jsx_element_name(&mut self, _: &JSXElementName) {}
}

/// Names a statement list declares for its own scope. Function scopes also
/// pick up `var` declarations hoisted out of nested blocks.
fn scope_declarations(stmts: &[Stmt], function_scope: bool) -> HashSet<String> {
    let mut names = HashSet::new();
    for stmt in stmts {
        let Stmt::Decl(decl) = stmt else {
            continue;
        };
        match decl {
            Decl::Fn(function) => {
                names.insert(function.ident.sym.to_string());
            }
            Decl::Class(class) => {
                names.insert(class.ident.sym.to_string());
            }
            Decl::Var(var) if var.kind != VarDeclKind::Var => {
                for declarator in &var.decls {
                    collect_pat_names(&declarator.name, &mut names);
                }
            }
            Decl::Using(using) => {
                for declarator in &using.decls {
                    collect_pat_names(&declarator.name, &mut names);
                }
            }
            Decl::TsEnum(ts_enum) => {
                names.insert(ts_enum.id.sym.to_string());
            }
            _ => {}
        }
    }

    if function_scope {
        let mut hoister = VarHoister { names: &mut names };
        for stmt in stmts {
            stmt.visit_with(&mut hoister);
        }
    }
    names
}

fn lexical_names(decl: &VarDecl) -> HashSet<String> {
    let mut names = HashSet::new();
    if decl.kind != VarDeclKind::Var {
        for declarator in &decl.decls {
            collect_pat_names(&declarator.name, &mut names);
        }
    }
    names
}

fn collect_pat_names(pat: &Pat, names: &mut HashSet<String>) {
    match pat {
        Pat::Ident(binding) => {
            names.insert(binding.id.sym.to_string());
        }
        Pat::Array(array) => {
            for elem in array.elems.iter().flatten() {
                collect_pat_names(elem, names);
            }
        }
        Pat::Rest(rest) => collect_pat_names(&rest.arg, names),
        Pat::Object(object) => {
            for prop in &object.props {
                match prop {
                    ObjectPatProp::KeyValue(kv) => collect_pat_names(&kv.value, names),
                    ObjectPatProp::Assign(assign) => {
                        names.insert(assign.key.id.sym.to_string());
                    }
                    ObjectPatProp::Rest(rest) => collect_pat_names(&rest.arg, names),
                }
            }
        }
        Pat::Assign(assign) => collect_pat_names(&assign.left, names),
        Pat::Expr(_) | Pat::Invalid(_) => {}
    }
}

/// Collects `var` bindings without entering nested functions.
struct VarHoister<'a> {
    names: &'a mut HashSet<String>,
}

impl Visit for VarHoister<'_> {
    fn visit_var_decl(&mut self, node: &VarDecl) {
        if node.kind == VarDeclKind::Var {
            for declarator in &node.decls {
                collect_pat_names(&declarator.name, self.names);
            }
        }
    }

    fn visit_function(&mut self, _: &Function) {}
    fn visit_arrow_expr(&mut self, _: &ArrowExpr) {}
    fn visit_class(&mut self, _: &Class) {}
    fn visit_expr(&mut self, _: &Expr) {}
}

/// Names bound in the file and the annotations found for wanted names.
struct FileBindings {
    declared: HashSet<String>,
    annotations: HashMap<String, Box<TsTypeAnn>>,
}

struct BindingSurvey<'a> {
    wanted: &'a IndexSet<String>,
    declared: HashSet<String>,
    annotations: HashMap<String, Box<TsTypeAnn>>,
}

/// Scan the whole file for declared names and the first annotation of each
/// wanted name.
fn survey_bindings(module: &Module, wanted: &IndexSet<String>) -> FileBindings {
    let mut survey = BindingSurvey {
        wanted,
        declared: HashSet::new(),
        annotations: HashMap::new(),
    };
    module.visit_with(&mut survey);
    FileBindings {
        declared: survey.declared,
        annotations: survey.annotations,
    }
}

impl BindingSurvey<'_> {
    fn declare(&mut self, ident: &Ident) {
        self.declared.insert(ident.sym.to_string());
    }
}

impl Visit for BindingSurvey<'_> {
    fn visit_binding_ident(&mut self, node: &BindingIdent) {
        let name = node.id.sym.to_string();
        if let Some(type_ann) = &node.type_ann {
            if self.wanted.contains(&name) && !self.annotations.contains_key(&name) {
                let mut type_ann = type_ann.clone();
                type_ann.visit_mut_with(&mut SpanEraser);
                self.annotations.insert(name.clone(), type_ann);
            }
        }
        self.declared.insert(name);
        node.visit_children_with(self);
    }

    fn visit_fn_decl(&mut self, node: &FnDecl) {
        self.declare(&node.ident);
        node.visit_children_with(self);
    }

    fn visit_class_decl(&mut self, node: &ClassDecl) {
        self.declare(&node.ident);
        node.visit_children_with(self);
    }

    fn visit_import_specifier(&mut self, node: &ImportSpecifier) {
        let local = match node {
            ImportSpecifier::Named(named) => &named.local,
            ImportSpecifier::Default(default) => &default.local,
            ImportSpecifier::Namespace(namespace) => &namespace.local,
        };
        self.declare(local);
    }
}

/// Resets spans so copied annotations print without pulling comments along.
struct SpanEraser;

impl VisitMut for SpanEraser {
    fn visit_mut_span(&mut self, span: &mut Span) {
        *span = DUMMY_SP;
    }
}

fn contains_await(snippet: &Snippet) -> bool {
    let mut finder = AwaitFinder::default();
    match snippet {
        Snippet::Expression(expr) => expr.visit_with(&mut finder),
        Snippet::Statements(stmts) => {
            for stmt in stmts {
                stmt.visit_with(&mut finder);
            }
        }
    }
    finder.found
}

fn contains_return(stmts: &[Stmt]) -> bool {
    let mut finder = ReturnFinder::default();
    for stmt in stmts {
        stmt.visit_with(&mut finder);
    }
    finder.found
}

#[derive(Default)]
struct AwaitFinder {
    found: bool,
}

impl Visit for AwaitFinder {
    fn visit_await_expr(&mut self, _: &AwaitExpr) {
        self.found = true;
    }

    fn visit_for_of_stmt(&mut self, node: &ForOfStmt) {
        self.found |= node.is_await;
        node.visit_children_with(self);
    }

    fn visit_function(&mut self, _: &Function) {}
    fn visit_arrow_expr(&mut self, _: &ArrowExpr) {}
    fn visit_constructor(&mut self, _: &Constructor) {}
    fn visit_getter_prop(&mut self, _: &GetterProp) {}
    fn visit_setter_prop(&mut self, _: &SetterProp) {}
}

#[derive(Default)]
struct ReturnFinder {
    found: bool,
}

impl Visit for ReturnFinder {
    fn visit_return_stmt(&mut self, _: &ReturnStmt) {
        self.found = true;
    }

    fn visit_function(&mut self, _: &Function) {}
    fn visit_arrow_expr(&mut self, _: &ArrowExpr) {}
    fn visit_constructor(&mut self, _: &Constructor) {}
    fn visit_getter_prop(&mut self, _: &GetterProp) {}
    fn visit_setter_prop(&mut self, _: &SetterProp) {}
}
