//! Project configuration flowing into the command

use crate::test_helpers::ScriptedEditor;
use anyhow::Result;
use carve_config::{CarveConfig, LogFormat};
use carve_foundation::ScopeKind;
use carve_host::{ExtractMethodCommand, ExtractOutcome};
use carve_test_support::{squash, write_project_config};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn command_from(dir: &TempDir) -> Result<ExtractMethodCommand> {
    let config = CarveConfig::load_from_dir(dir.path())?;
    Ok(ExtractMethodCommand::new(config.extraction))
}

#[tokio::test]
async fn test_configured_default_name_reaches_prompt() -> Result<()> {
    let dir = TempDir::new()?;
    write_project_config(dir.path(), "[extraction]\ndefaultFunctionName = \"helper\"\n");

    let editor = ScriptedEditor::new("«run();»\n", "javascript").picking(ScopeKind::TopLevelFunction);
    let outcome = command_from(&dir)?.run(&editor).await?;

    assert_eq!(
        outcome,
        ExtractOutcome::Applied {
            scope: ScopeKind::TopLevelFunction,
            name: "helper".to_string()
        }
    );
    assert_eq!(squash(&editor.document()), squash("helper(run); function helper(run) { run(); }"));
    Ok(())
}

#[tokio::test]
async fn test_unknown_language_uses_default_language() -> Result<()> {
    let marked = "function f(a: number) {\n  return «a + 1»;\n}\n";

    let dir = TempDir::new()?;
    write_project_config(dir.path(), "[extraction]\ndefaultLanguage = \"javascript\"\n");
    let editor = ScriptedEditor::new(marked, "plaintext").picking(ScopeKind::TopLevelFunction);
    assert!(command_from(&dir)?.run(&editor).await.is_err());
    assert_eq!(editor.warnings().len(), 1);

    let dir = TempDir::new()?;
    write_project_config(
        dir.path(),
        "[extraction]\ndefaultLanguage = \"typescript\"\ndefaultFunctionName = \"extracted\"\n",
    );
    let editor = ScriptedEditor::new(marked, "plaintext").picking(ScopeKind::TopLevelFunction);
    command_from(&dir)?.run(&editor).await?;
    assert!(
        squash(&editor.document()).contains("functionextracted(a:number){returna+1;}"),
        "{}",
        editor.document()
    );
    Ok(())
}

#[tokio::test]
async fn test_comments_dropped_when_not_preserved() -> Result<()> {
    let marked = "// header\nfunction f() {\n  «run();»\n}\n";

    let dir = TempDir::new()?;
    write_project_config(dir.path(), "[extraction]\npreserveComments = false\n");
    let editor = ScriptedEditor::new(marked, "javascript").picking(ScopeKind::NestedFunction);
    command_from(&dir)?.run(&editor).await?;
    assert!(!editor.document().contains("header"), "{}", editor.document());

    let dir = TempDir::new()?;
    let editor = ScriptedEditor::new(marked, "javascript").picking(ScopeKind::NestedFunction);
    command_from(&dir)?.run(&editor).await?;
    assert!(editor.document().contains("// header"), "{}", editor.document());
    Ok(())
}

#[tokio::test]
async fn test_configured_ambient_globals_become_parameters_when_removed() -> Result<()> {
    let dir = TempDir::new()?;
    write_project_config(dir.path(), "[extraction]\nambientGlobals = [\"Math\"]\n");

    let editor = ScriptedEditor::new("«console.log(Math.max(a, b));»\n", "javascript")
        .picking(ScopeKind::TopLevelFunction)
        .naming("show");
    command_from(&dir)?.run(&editor).await?;

    assert!(
        squash(&editor.document()).contains("functionshow(console,a,b)"),
        "{}",
        editor.document()
    );
    Ok(())
}

#[test]
fn test_invalid_project_config_is_rejected() -> Result<()> {
    let dir = TempDir::new()?;
    write_project_config(dir.path(), "[logging]\nlevel = \"chatty\"\n");
    let err = CarveConfig::load_from_dir(dir.path()).unwrap_err();
    assert!(err.to_string().contains("Invalid log level"), "{}", err);
    Ok(())
}

#[test]
fn test_seeded_config_round_trips_through_project_file() -> Result<()> {
    let mut config = CarveConfig::default();
    config.logging.format = LogFormat::Json;
    config.extraction.default_function_name = "pulled".to_string();

    let dir = TempDir::new()?;
    write_project_config(dir.path(), &config.to_toml()?);
    assert_eq!(CarveConfig::load_from_dir(dir.path())?, config);
    Ok(())
}
