//! Extract-method workflows from selection to replaced document

use crate::test_helpers::ScriptedEditor;
use carve_foundation::ScopeKind;
use carve_host::{ExtractMethodCommand, ExtractOutcome, ExtractionOffer};
use carve_test_support::{create_test_config, squash};
use pretty_assertions::assert_eq;

fn command() -> ExtractMethodCommand {
    ExtractMethodCommand::new(create_test_config().extraction)
}

#[tokio::test]
async fn test_statement_run_to_top_level_function() {
    let editor = ScriptedEditor::new(
        "function report(items) {\n    «console.log(\"start\");\n    console.log(items.length);»\n}\n",
        "javascript",
    )
    .picking(ScopeKind::TopLevelFunction)
    .naming("logItems");

    let outcome = command().run(&editor).await.unwrap();

    assert_eq!(
        outcome,
        ExtractOutcome::Applied {
            scope: ScopeKind::TopLevelFunction,
            name: "logItems".to_string()
        }
    );
    assert_eq!(
        editor.offered(),
        vec![ScopeKind::NestedFunction, ScopeKind::TopLevelFunction]
    );
    assert_eq!(
        squash(&editor.document()),
        squash(
            "function report(items) { logItems(items); }
             function logItems(items) { console.log(\"start\"); console.log(items.length); }"
        )
    );
    assert!(editor.warnings().is_empty());
}

#[tokio::test]
async fn test_default_name_is_used_when_accepted() {
    let editor = ScriptedEditor::new("const total = «price * count»;\n", "typescript")
        .picking(ScopeKind::TopLevelFunction);

    command().run(&editor).await.unwrap();

    assert_eq!(
        squash(&editor.document()),
        squash(
            "const total = extracted(price, count);
             function extracted(price, count) { return price * count; }"
        )
    );
}

#[tokio::test]
async fn test_class_method_from_tsx_document() {
    let editor = ScriptedEditor::new(
        "class Panel {\n  render(props: Props) {\n    return <div>{«props.title.toUpperCase()»}</div>;\n  }\n}\n",
        "typescriptreact",
    )
    .picking(ScopeKind::ClassMethod)
    .naming("heading");

    command().run(&editor).await.unwrap();

    let document = squash(&editor.document());
    assert!(document.contains("{this.heading(props)}"), "{}", document);
    assert!(
        document.contains("heading(props:Props){returnprops.title.toUpperCase();}"),
        "{}",
        document
    );
}

#[tokio::test]
async fn test_dismissed_name_leaves_document_untouched() {
    let marked = "function f() {\n  «run();»\n}\n";
    let editor = ScriptedEditor::new(marked, "javascript")
        .picking(ScopeKind::NestedFunction)
        .dismissing_name();
    let before = editor.document();

    let outcome = command().run(&editor).await.unwrap();

    assert_eq!(outcome, ExtractOutcome::Cancelled);
    assert_eq!(editor.document(), before);
    assert!(editor.warnings().is_empty());
}

#[tokio::test]
async fn test_parse_error_is_shown_and_document_kept() {
    let editor = ScriptedEditor::new("function f( {\n  «run();»\n}\n", "javascript")
        .picking(ScopeKind::TopLevelFunction);
    let before = editor.document();

    let result = command().run(&editor).await;

    assert!(result.is_err());
    assert_eq!(editor.document(), before);
    let warnings = editor.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with("Parse error"), "{:?}", warnings);
}

#[tokio::test]
async fn test_offer_then_apply_chosen_offer() {
    let editor = ScriptedEditor::new(
        "class C {\n  m() {\n    «this.items.forEach(log);»\n  }\n}\n",
        "typescript",
    )
    .naming("logAll");
    let command = command();

    let offers = command.offer_extractions(editor.snapshot()).unwrap();
    assert_eq!(
        offers,
        ScopeKind::ALL
            .iter()
            .copied()
            .map(ExtractionOffer::from)
            .collect::<Vec<_>>()
    );

    let chosen = offers[0].scope;
    command.run_with_scope(&editor, chosen).await.unwrap();

    let document = squash(&editor.document());
    assert!(document.contains("this.logAll(log);"), "{}", document);
    assert!(
        document.contains("logAll(log){this.items.forEach(log);}"),
        "{}",
        document
    );
    assert!(editor.offered().is_empty());
}
