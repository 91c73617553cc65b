//! Syntax tree construction, fragment parsing and printing.
//!
//! A [`SyntaxTree`] owns everything one extraction touches: the module, the
//! source map its spans point into, and the comment store. Fragments parsed
//! later (the extracted code) live in the same source map so their spans and
//! comments survive printing.

use crate::dialect::Dialect;
use carve_foundation::{ExtractError, ExtractResult, ParserPosition, ParserRange};
use swc_common::comments::{Comments, SingleThreadedComments};
use swc_common::{
    sync::Lrc, FileName, FilePathMapping, SourceFile, SourceMap, SourceMapper, Span, Spanned,
};
use swc_ecma_ast::*;
use swc_ecma_codegen::{text_writer::JsWriter, Emitter};
use swc_ecma_parser::{lexer::Lexer, Parser, StringInput};
use tracing::debug;

const FRAGMENT_CLASS: &str = "__CarveFragment__";
const FRAGMENT_METHOD: &str = "__carveFragment__";

/// How a piece of extracted text should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnippetMode {
    /// A single expression (a trailing `;` is ignored)
    Expression,
    /// A list of statements
    Statements,
}

/// Extracted code parsed on its own.
#[derive(Debug, Clone)]
pub enum Snippet {
    Expression(Box<Expr>),
    Statements(Vec<Stmt>),
}

/// A parsed document owned by a single extraction.
pub struct SyntaxTree {
    pub module: Module,
    source_map: Lrc<SourceMap>,
    comments: SingleThreadedComments,
    dialect: Dialect,
}

impl SyntaxTree {
    /// Parse a full document.
    ///
    /// Recovered parser errors are treated like fatal ones: a tree that needed
    /// error recovery is never handed back.
    pub fn parse(source: &str, dialect: Dialect) -> ExtractResult<Self> {
        let source_map = Lrc::new(SourceMap::new(FilePathMapping::empty()));
        let file_name = Lrc::new(FileName::Custom(dialect.file_name().to_string()));
        let source_file = source_map.new_source_file(file_name, source.to_string());
        let comments = SingleThreadedComments::default();

        let module = parse_module_in(&source_file, dialect, &comments)
            .map_err(|e| located_parse_error(&source_map, e))?;

        debug!(
            dialect = ?dialect,
            items = module.body.len(),
            "Parsed document"
        );

        Ok(Self {
            module,
            source_map,
            comments,
            dialect,
        })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Parser-space range of a span (1-based lines, 0-based character columns)
    pub fn range_of(&self, span: Span) -> ParserRange {
        let lo = self.source_map.lookup_char_pos(span.lo);
        let hi = self.source_map.lookup_char_pos(span.hi);
        ParserRange {
            start: ParserPosition::new(lo.line as u32, lo.col.0 as u32),
            end: ParserPosition::new(hi.line as u32, hi.col.0 as u32),
        }
    }

    /// Source text covered by a span
    pub fn text_of(&self, span: Span) -> ExtractResult<String> {
        self.source_map
            .span_to_snippet(span)
            .map_err(|e| ExtractError::splice(format!("Failed to read source span: {:?}", e)))
    }

    /// Parse extracted text on its own, inside this tree's source map.
    ///
    /// The text is wrapped in an async class method so that `return`, `await`,
    /// `this` and `super.x` parse the way they did at the original site.
    pub fn parse_snippet(&self, text: &str, mode: SnippetMode) -> ExtractResult<Snippet> {
        let wrapped = match mode {
            SnippetMode::Statements => format!(
                "class {FRAGMENT_CLASS} extends Object {{ async {FRAGMENT_METHOD}() {{\n{text}\n}} }}"
            ),
            SnippetMode::Expression => format!(
                "class {FRAGMENT_CLASS} extends Object {{ async {FRAGMENT_METHOD}() {{\nreturn (\n{}\n);\n}} }}",
                text.trim().trim_end_matches(';')
            ),
        };
        let source_file = self
            .source_map
            .new_source_file(Lrc::new(FileName::Anon), wrapped);
        let module = parse_module_in(&source_file, self.dialect, &self.comments)
            .map_err(|e| {
                ExtractError::parse(format!("Extracted code does not parse: {}", e.kind().msg()))
            })?;

        let stmts = fragment_body(module).ok_or_else(|| {
            ExtractError::parse("Extracted code does not form a method body".to_string())
        })?;

        match mode {
            SnippetMode::Statements => Ok(Snippet::Statements(stmts)),
            SnippetMode::Expression => match <[Stmt; 1]>::try_from(stmts) {
                Ok([Stmt::Return(ReturnStmt { arg: Some(arg), .. })]) => {
                    Ok(Snippet::Expression(unwrap_parens(arg)))
                }
                _ => Err(ExtractError::parse(
                    "Extracted code is not a single expression".to_string(),
                )),
            },
        }
    }

    /// Print the whole module
    pub fn emit(&self, preserve_comments: bool) -> ExtractResult<String> {
        let comments: Option<&dyn Comments> = if preserve_comments {
            Some(&self.comments)
        } else {
            None
        };

        let mut buf = vec![];
        {
            let mut emitter = Emitter {
                cfg: Default::default(),
                cm: self.source_map.clone(),
                comments,
                wr: JsWriter::new(self.source_map.clone(), "\n", &mut buf, None),
            };

            emitter
                .emit_module(&self.module)
                .map_err(|e| ExtractError::emit(format!("Failed to emit module: {:?}", e)))?;
        }

        String::from_utf8(buf).map_err(|e| {
            ExtractError::emit(format!("Failed to convert emitted code to string: {}", e))
        })
    }
}

fn parse_module_in(
    source_file: &SourceFile,
    dialect: Dialect,
    comments: &SingleThreadedComments,
) -> Result<Module, swc_ecma_parser::error::Error> {
    let lexer = Lexer::new(
        dialect.syntax(),
        Default::default(),
        StringInput::from(source_file),
        Some(comments),
    );
    let mut parser = Parser::new_from(lexer);
    let module = parser.parse_module()?;
    match parser.take_errors().into_iter().next() {
        Some(recovered) => Err(recovered),
        None => Ok(module),
    }
}

fn located_parse_error(source_map: &SourceMap, error: swc_ecma_parser::error::Error) -> ExtractError {
    let loc = source_map.lookup_char_pos(error.span().lo);
    ExtractError::parse_at(
        error.kind().msg().to_string(),
        loc.line.saturating_sub(1),
        loc.col.0,
    )
}

fn fragment_body(module: Module) -> Option<Vec<Stmt>> {
    let item = module.body.into_iter().next()?;
    let ModuleItem::Stmt(Stmt::Decl(Decl::Class(class_decl))) = item else {
        return None;
    };
    class_decl
        .class
        .body
        .into_iter()
        .find_map(|member| match member {
            ClassMember::Method(method) => method.function.body.map(|body| body.stmts),
            _ => None,
        })
}

fn unwrap_parens(expr: Box<Expr>) -> Box<Expr> {
    match *expr {
        Expr::Paren(paren) => unwrap_parens(paren.expr),
        other => Box::new(other),
    }
}
