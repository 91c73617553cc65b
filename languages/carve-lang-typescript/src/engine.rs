//! The extraction pipeline as a chain of states.
//!
//! Each state owns the syntax tree and is consumed by the step that produces
//! the next one:
//!
//! ```text
//! Located -> Analyzed -> ScopeChosen -> Synthesized -> Spliced -> String
//! ```
//!
//! A failing step returns an error and drops the tree, so a half-edited tree
//! can never be printed.

use crate::analysis::{analyze_fragment, default_ambient_globals, FragmentAnalysis, Parameter};
use crate::dialect::Dialect;
use crate::locator::locate_nodes;
use crate::node_path::LocatedNodes;
use crate::parser::SyntaxTree;
use crate::scope::{insertion_target, offered_scopes, InsertionTarget};
use crate::splice::{insert_member, replace_call_site};
use crate::synthesis::{synthesize, Synthesis};
use carve_foundation::{
    normalize_selection, ExtractError, ExtractResult, NormalizedRange, ScopeKind, SelectionSpan,
};
use std::collections::HashSet;
use tracing::{debug, error, instrument};

/// Knobs for one extraction.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub dialect: Dialect,
    /// Names never turned into parameters unless the file declares them
    pub ambient_globals: HashSet<String>,
    /// Re-emit comments from the original document
    pub preserve_comments: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            ambient_globals: default_ambient_globals(),
            preserve_comments: true,
        }
    }
}

impl ExtractOptions {
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }
}

/// A parsed document with the selection mapped onto nodes.
pub struct Located {
    tree: SyntaxTree,
    range: NormalizedRange,
    nodes: LocatedNodes,
}

impl Located {
    /// Normalize the selection, parse the document and locate the nodes.
    #[instrument(skip(source, selection))]
    pub fn locate(source: &str, selection: &SelectionSpan, dialect: Dialect) -> ExtractResult<Self> {
        let range = normalize_selection(selection)?;
        let tree = SyntaxTree::parse(source, dialect)?;
        let nodes = locate_nodes(&tree, &range)?;
        Ok(Self { tree, range, nodes })
    }

    pub fn range(&self) -> NormalizedRange {
        self.range
    }

    pub fn nodes(&self) -> &LocatedNodes {
        &self.nodes
    }

    pub fn analyze(self, ambient_globals: &HashSet<String>) -> ExtractResult<Analyzed> {
        let analysis = analyze_fragment(&self.tree, &self.nodes, ambient_globals)?;
        let scopes = offered_scopes(&self.nodes.path());
        if scopes.is_empty() {
            return Err(ExtractError::NoScopeAvailable);
        }
        debug!(?scopes, "Resolved candidate scopes");
        Ok(Analyzed {
            tree: self.tree,
            nodes: self.nodes,
            analysis,
            scopes,
        })
    }
}

/// Fragment analysis done; candidate scopes known.
pub struct Analyzed {
    tree: SyntaxTree,
    nodes: LocatedNodes,
    analysis: FragmentAnalysis,
    scopes: Vec<ScopeKind>,
}

impl Analyzed {
    /// Reachable scope kinds, sorted
    pub fn scopes(&self) -> &[ScopeKind] {
        &self.scopes
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.analysis.parameters
    }

    pub fn needs_return(&self) -> bool {
        self.analysis.needs_return
    }

    pub fn is_async(&self) -> bool {
        self.analysis.is_async
    }

    pub fn choose_scope(self, scope: ScopeKind) -> ExtractResult<ScopeChosen> {
        if !self.scopes.contains(&scope) {
            return Err(ExtractError::ScopeUnreachable { scope });
        }
        Ok(ScopeChosen {
            tree: self.tree,
            nodes: self.nodes,
            analysis: self.analysis,
            scope,
        })
    }
}

pub struct ScopeChosen {
    tree: SyntaxTree,
    nodes: LocatedNodes,
    analysis: FragmentAnalysis,
    scope: ScopeKind,
}

impl ScopeChosen {
    pub fn scope(&self) -> ScopeKind {
        self.scope
    }

    /// Find the receiving container and build the declaration and call for
    /// `name`.
    pub fn synthesize(self, name: &str) -> ExtractResult<Synthesized> {
        let target = insertion_target(&self.nodes.path(), self.scope).inspect_err(|e| {
            error!(error = %e, scope = %self.scope, "No container receives the extracted method");
        })?;
        let synthesis = synthesize(&target, name, &self.analysis)?;
        debug!(name, scope = %self.scope, is_static = target.is_static, "Synthesized extracted function");
        Ok(Synthesized {
            tree: self.tree,
            nodes: self.nodes,
            target,
            returns_at_call_site: self.analysis.returns_at_call_site,
            synthesis,
        })
    }
}

pub struct Synthesized {
    tree: SyntaxTree,
    nodes: LocatedNodes,
    target: InsertionTarget,
    returns_at_call_site: bool,
    synthesis: Synthesis,
}

impl Synthesized {
    /// Replace the call site and insert the declaration.
    pub fn splice(self) -> ExtractResult<Spliced> {
        let Synthesized {
            mut tree,
            nodes,
            target,
            returns_at_call_site,
            synthesis,
        } = self;

        let outcome =
            replace_call_site(&mut tree.module, &nodes, synthesis.call, returns_at_call_site)
                .and_then(|()| insert_member(&mut tree.module, &target, synthesis.member));
        if let Err(e) = outcome {
            error!(error = %e, scope = %target.scope, "Failed to splice extracted method");
            return Err(e);
        }
        Ok(Spliced { tree })
    }
}

pub struct Spliced {
    tree: SyntaxTree,
}

impl Spliced {
    /// Print the edited document
    pub fn serialize(self, preserve_comments: bool) -> ExtractResult<String> {
        self.tree.emit(preserve_comments)
    }
}

/// Run every step for a known scope and name.
pub fn extract_method(
    source: &str,
    selection: &SelectionSpan,
    options: &ExtractOptions,
    scope: ScopeKind,
    name: &str,
) -> ExtractResult<String> {
    Located::locate(source, selection, options.dialect)?
        .analyze(&options.ambient_globals)?
        .choose_scope(scope)?
        .synthesize(name)?
        .splice()?
        .serialize(options.preserve_comments)
}
