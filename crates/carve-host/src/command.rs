//! The extract-method command
//!
//! The syntax tree is never held across an `.await`: scope candidates are
//! computed in one synchronous pass, the prompts run, and then the document is
//! parsed again and rewritten in a second synchronous pass.

use crate::host::{EditorHost, SelectionSnapshot};
use carve_config::{logging::command_span, ExtractionConfig};
use carve_foundation::{ExtractError, ExtractResult, ScopeKind};
use carve_lang_typescript::{extract_method, Located};
use serde::Serialize;
use tracing::{debug, info, warn, Instrument};

/// How a command run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    /// The document was replaced
    Applied { scope: ScopeKind, name: String },
    /// A prompt was dismissed; the document is untouched
    Cancelled,
}

/// One code action offered for a selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionOffer {
    pub title: String,
    pub scope: ScopeKind,
}

impl From<ScopeKind> for ExtractionOffer {
    fn from(scope: ScopeKind) -> Self {
        Self {
            title: format!("Extract to {}", scope.title()),
            scope,
        }
    }
}

/// Drives extraction against an [`EditorHost`]
#[derive(Debug, Clone, Default)]
pub struct ExtractMethodCommand {
    config: ExtractionConfig,
}

impl ExtractMethodCommand {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Read the selection, prompt for scope and name, then rewrite the document.
    pub async fn run(&self, host: &dyn EditorHost) -> ExtractResult<ExtractOutcome> {
        let result = self.execute(host, None).await;
        self.settle(host, result).await
    }

    /// Same as [`run`](Self::run) with the scope already picked, e.g. from a
    /// code action.
    pub async fn run_with_scope(
        &self,
        host: &dyn EditorHost,
        scope: ScopeKind,
    ) -> ExtractResult<ExtractOutcome> {
        let result = self.execute(host, Some(scope)).await;
        self.settle(host, result).await
    }

    /// Code actions available for `snapshot`, one per reachable scope kind.
    pub fn offer_extractions(
        &self,
        snapshot: &SelectionSnapshot,
    ) -> ExtractResult<Vec<ExtractionOffer>> {
        Ok(self
            .candidate_scopes(snapshot)?
            .into_iter()
            .map(ExtractionOffer::from)
            .collect())
    }

    async fn execute(
        &self,
        host: &dyn EditorHost,
        preselected: Option<ScopeKind>,
    ) -> ExtractResult<ExtractOutcome> {
        let snapshot = host.read_selection().await?;
        let span = command_span("extract_method", &snapshot.language_id);

        async {
            let candidates = self.candidate_scopes(&snapshot)?;

            let scope = match preselected {
                Some(scope) if candidates.contains(&scope) => scope,
                Some(scope) => return Err(ExtractError::ScopeUnreachable { scope }),
                None => host
                    .prompt_for_scope_kind(&candidates)
                    .await
                    .ok_or(ExtractError::Cancelled)?,
            };

            let name = host
                .prompt_for_name(&self.config.default_function_name)
                .await
                .ok_or(ExtractError::Cancelled)?;
            let name = name.trim().to_string();

            let edited = self.rewrite(&snapshot, scope, &name)?;
            host.replace_whole_document(&edited).await?;

            info!(scope = %scope, name = %name, "Extracted method");
            Ok::<_, ExtractError>(ExtractOutcome::Applied { scope, name })
        }
        .instrument(span)
        .await
    }

    async fn settle(
        &self,
        host: &dyn EditorHost,
        result: ExtractResult<ExtractOutcome>,
    ) -> ExtractResult<ExtractOutcome> {
        match result {
            Err(e) if e.is_silent() => {
                debug!("Extraction cancelled by user");
                Ok(ExtractOutcome::Cancelled)
            }
            Err(e) => {
                warn!(error = %e, "Extraction failed");
                host.show_warning(&e.to_string()).await;
                Err(e)
            }
            ok => ok,
        }
    }

    fn candidate_scopes(&self, snapshot: &SelectionSnapshot) -> ExtractResult<Vec<ScopeKind>> {
        let options = self.config.extract_options(&snapshot.language_id);
        let analyzed = Located::locate(&snapshot.document, &snapshot.selection, options.dialect)?
            .analyze(&options.ambient_globals)?;
        Ok(analyzed.scopes().to_vec())
    }

    fn rewrite(
        &self,
        snapshot: &SelectionSnapshot,
        scope: ScopeKind,
        name: &str,
    ) -> ExtractResult<String> {
        let options = self.config.extract_options(&snapshot.language_id);
        extract_method(&snapshot.document, &snapshot.selection, &options, scope, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carve_foundation::{HostPosition, SelectionSpan};

    fn snapshot(document: &str, start: (u32, u32), end: (u32, u32), text: &str) -> SelectionSnapshot {
        SelectionSnapshot::new(
            document,
            "javascript",
            SelectionSpan::new(
                HostPosition::new(start.0, start.1),
                HostPosition::new(end.0, end.1),
                text,
            ),
        )
    }

    #[test]
    fn test_offers_are_titled_and_ordered() {
        let command = ExtractMethodCommand::default();
        let offers = command
            .offer_extractions(&snapshot(
                "class C {\n  m() {\n    run();\n  }\n}\n",
                (2, 4),
                (2, 10),
                "run();",
            ))
            .unwrap();
        let titles: Vec<_> = offers.iter().map(|o| o.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Extract to Class Method",
                "Extract to Nested Function",
                "Extract to Top-Level Function"
            ]
        );
    }

    #[test]
    fn test_offers_surface_mismatch() {
        let command = ExtractMethodCommand::default();
        let result = command.offer_extractions(&snapshot("let a = bc;\n", (0, 9), (0, 10), "c"));
        assert_eq!(result, Err(ExtractError::SpanMismatch));
    }
}
