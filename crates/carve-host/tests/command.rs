//! Command flow against a mocked editor host.

use carve_foundation::{ExtractError, ScopeKind};
use carve_host::{ExtractMethodCommand, ExtractOutcome};
use carve_test_support::{create_test_config, mock_editor_host, snapshot, squash, MockEditorHost};
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};

fn command() -> ExtractMethodCommand {
    ExtractMethodCommand::new(create_test_config().extraction)
}

fn host_for(marked: &str, language_id: &str) -> MockEditorHost {
    let snap = snapshot(marked, language_id);
    let mut host = mock_editor_host();
    host.expect_read_selection()
        .times(1)
        .returning(move || Ok(snap.clone()));
    host
}

fn capture_replacement(host: &mut MockEditorHost) -> Arc<Mutex<Option<String>>> {
    let written = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&written);
    host.expect_replace_whole_document()
        .times(1)
        .returning(move |text| {
            *sink.lock().unwrap() = Some(text.to_string());
            Ok(())
        });
    written
}

#[tokio::test]
async fn test_run_prompts_then_replaces_document() {
    let mut host = host_for("function f() { let x = 1; «console.log(x);» }", "javascript");
    host.expect_prompt_for_scope_kind()
        .withf(|candidates: &[ScopeKind]| {
            candidates == [ScopeKind::NestedFunction, ScopeKind::TopLevelFunction]
        })
        .times(1)
        .returning(|_| Some(ScopeKind::NestedFunction));
    host.expect_prompt_for_name()
        .withf(|default_name: &str| default_name == "extracted")
        .times(1)
        .returning(|_| Some("g".to_string()));
    let written = capture_replacement(&mut host);
    host.expect_show_warning().never();

    let outcome = command().run(&host).await.unwrap();

    assert_eq!(
        outcome,
        ExtractOutcome::Applied {
            scope: ScopeKind::NestedFunction,
            name: "g".to_string()
        }
    );
    let text = written.lock().unwrap().clone().unwrap();
    assert_eq!(
        squash(&text),
        squash("function f() { let x = 1; g(x); function g(x) { console.log(x); } }")
    );
}

#[tokio::test]
async fn test_dismissed_scope_prompt_cancels_silently() {
    let mut host = host_for("function f() {\n  «run();»\n}\n", "javascript");
    host.expect_prompt_for_scope_kind()
        .times(1)
        .returning(|_| None);
    host.expect_prompt_for_name().never();
    host.expect_replace_whole_document().never();
    host.expect_show_warning().never();

    let outcome = command().run(&host).await.unwrap();
    assert_eq!(outcome, ExtractOutcome::Cancelled);
}

#[tokio::test]
async fn test_dismissed_name_prompt_cancels_silently() {
    let mut host = host_for("«run();»\n", "typescript");
    host.expect_prompt_for_scope_kind()
        .times(1)
        .returning(|_| Some(ScopeKind::TopLevelFunction));
    host.expect_prompt_for_name().times(1).returning(|_| None);
    host.expect_replace_whole_document().never();
    host.expect_show_warning().never();

    let outcome = command().run(&host).await.unwrap();
    assert_eq!(outcome, ExtractOutcome::Cancelled);
}

#[tokio::test]
async fn test_mismatched_selection_warns_without_prompting() {
    let mut host = host_for("let total = pr«ice * cou»nt;\n", "typescript");
    host.expect_prompt_for_scope_kind().never();
    host.expect_prompt_for_name().never();
    host.expect_replace_whole_document().never();
    host.expect_show_warning()
        .withf(|message: &str| {
            message == "Selected block should represent a set of statements or an expression."
        })
        .times(1)
        .return_const(());

    let result = command().run(&host).await;
    assert_eq!(result, Err(ExtractError::SpanMismatch));
}

#[tokio::test]
async fn test_invalid_name_warns_and_leaves_document() {
    let mut host = host_for("«run();»\n", "javascript");
    host.expect_prompt_for_scope_kind()
        .returning(|_| Some(ScopeKind::TopLevelFunction));
    host.expect_prompt_for_name()
        .returning(|_| Some("2fast".to_string()));
    host.expect_replace_whole_document().never();
    host.expect_show_warning().times(1).return_const(());

    let result = command().run(&host).await;
    assert!(matches!(result, Err(ExtractError::InvalidInput { .. })));
}

#[tokio::test]
async fn test_run_with_scope_skips_scope_prompt() {
    let mut host = host_for(
        "class C { m() { if («a») { return 1; } } }",
        "typescript",
    );
    host.expect_prompt_for_scope_kind().never();
    host.expect_prompt_for_name()
        .times(1)
        .returning(|_| Some("  check ".to_string()));
    let written = capture_replacement(&mut host);

    let outcome = command()
        .run_with_scope(&host, ScopeKind::ClassMethod)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ExtractOutcome::Applied {
            scope: ScopeKind::ClassMethod,
            name: "check".to_string()
        }
    );
    let text = written.lock().unwrap().clone().unwrap();
    assert!(squash(&text).contains("if(this.check(a))"), "{}", text);
    assert!(squash(&text).contains("check(a){returna;}"), "{}", text);
}

#[tokio::test]
async fn test_run_with_unreachable_scope_is_reported() {
    let mut host = host_for("«run();»\n", "javascript");
    host.expect_prompt_for_name().never();
    host.expect_show_warning().times(1).return_const(());

    let result = command().run_with_scope(&host, ScopeKind::ClassMethod).await;
    assert_eq!(
        result,
        Err(ExtractError::ScopeUnreachable {
            scope: ScopeKind::ClassMethod
        })
    );
}

#[tokio::test]
async fn test_host_read_failure_is_surfaced() {
    let mut host = mock_editor_host();
    host.expect_read_selection()
        .returning(|| Err(ExtractError::host("no active editor")));
    host.expect_show_warning()
        .withf(|message: &str| message.contains("no active editor"))
        .times(1)
        .return_const(());

    let result = command().run(&host).await;
    assert!(matches!(result, Err(ExtractError::Host { .. })));
}
