//! Configuration management for Carve

use carve_foundation::{ExtractError, ExtractResult};
use carve_lang_typescript::{default_ambient_globals, validate_function_name, Dialect, ExtractOptions};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config files searched (first found wins), relative to the project root
pub const CONFIG_FILES: [&str; 2] = ["carve.toml", ".carve/config.toml"];

/// Prefix for environment overrides, e.g. `CARVE__LOGGING__LEVEL=debug`
pub const ENV_PREFIX: &str = "CARVE__";

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarveConfig {
    /// Extraction defaults
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Extraction defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionConfig {
    /// Name offered in the name prompt
    pub default_function_name: String,
    /// Language used when the editor reports an unknown language id
    pub default_language: String,
    /// Re-emit comments when printing the edited document
    pub preserve_comments: bool,
    /// Globals never turned into parameters unless the file declares them
    pub ambient_globals: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        let mut ambient_globals: Vec<String> = default_ambient_globals().into_iter().collect();
        ambient_globals.sort();
        Self {
            default_function_name: "extractedMethod".to_string(),
            default_language: "typescript".to_string(),
            preserve_comments: true,
            ambient_globals,
        }
    }
}

impl ExtractionConfig {
    /// Dialect for an editor language id, falling back to the default language
    pub fn dialect_for(&self, language_id: &str) -> Dialect {
        Dialect::from_language_id(language_id)
            .or_else(|| Dialect::from_language_id(&self.default_language))
            .unwrap_or_default()
    }

    /// Engine options for a document in `language_id`
    pub fn extract_options(&self, language_id: &str) -> ExtractOptions {
        ExtractOptions {
            dialect: self.dialect_for(language_id),
            ambient_globals: self.ambient_globals.iter().cloned().collect(),
            preserve_comments: self.preserve_comments,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
}

/// Field names that environment variables cannot spell in camelCase
const CAMEL_CASE_KEYS: [&str; 4] = [
    "defaultFunctionName",
    "defaultLanguage",
    "preserveComments",
    "ambientGlobals",
];

/// Turn `EXTRACTION.DEFAULTFUNCTIONNAME` into `extraction.defaultFunctionName`
fn env_key_path(key: &str) -> String {
    key.split('.')
        .map(|segment| {
            let lower = segment.to_ascii_lowercase();
            CAMEL_CASE_KEYS
                .iter()
                .find(|known| known.to_ascii_lowercase() == lower)
                .map(|known| known.to_string())
                .unwrap_or(lower)
        })
        .collect::<Vec<_>>()
        .join(".")
}

impl CarveConfig {
    /// Load configuration relative to the current directory
    pub fn load() -> ExtractResult<Self> {
        let root = std::env::current_dir()
            .map_err(|e| ExtractError::config(format!("Cannot determine working directory: {}", e)))?;
        Self::load_from_dir(&root)
    }

    /// Load configuration for a project root
    ///
    /// Priority order (highest to lowest):
    /// 1. Environment variables (CARVE__*)
    /// 2. `carve.toml` or `.carve/config.toml` under `root`
    /// 3. Default values
    pub fn load_from_dir(root: &Path) -> ExtractResult<Self> {
        let mut figment = Self::defaults()?;

        for file in CONFIG_FILES {
            let path = root.join(file);
            if path.exists() {
                tracing::info!(path = %path.display(), "Loading TOML configuration");
                figment = figment.merge(Toml::file(path));
                break;
            }
        }

        Self::finish(figment.merge(Self::env_overrides()))
    }

    /// Load an explicit config file (environment overrides still apply)
    pub fn load_from(path: &Path) -> ExtractResult<Self> {
        if !path.exists() {
            return Err(ExtractError::config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let figment = Self::defaults()?
            .merge(Toml::file(path))
            .merge(Self::env_overrides());
        Self::finish(figment)
    }

    /// Render as TOML, e.g. to seed a project config file
    pub fn to_toml(&self) -> ExtractResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ExtractError::config(format!("Failed to serialize configuration: {}", e)))
    }

    fn defaults() -> ExtractResult<Figment> {
        let default_value = serde_json::to_value(CarveConfig::default())
            .map_err(|e| ExtractError::config(format!("Failed to serialize defaults: {}", e)))?;
        Ok(Figment::from(Serialized::defaults(default_value)))
    }

    fn env_overrides() -> Env {
        Env::prefixed(ENV_PREFIX)
            .split("__")
            .map(|key| env_key_path(key.as_str()).into())
            .lowercase(false)
    }

    fn finish(figment: Figment) -> ExtractResult<Self> {
        let config: CarveConfig = figment
            .extract()
            .map_err(|e| ExtractError::config(format!("Failed to load configuration: {}", e)))?;

        config.validate()?;

        tracing::debug!(
            level = %config.logging.level,
            default_language = %config.extraction.default_language,
            "Configuration loaded successfully"
        );
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ExtractResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ExtractError::config(format!(
                "Invalid log level '{}', must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            )));
        }

        validate_function_name(&self.extraction.default_function_name).map_err(|e| {
            ExtractError::config(format!("Invalid defaultFunctionName: {}", e))
        })?;

        if self.extraction.default_language.trim().is_empty() {
            return Err(ExtractError::config("defaultLanguage cannot be empty"));
        }
        if Dialect::from_language_id(&self.extraction.default_language).is_none() {
            return Err(ExtractError::config(format!(
                "Unsupported defaultLanguage '{}'",
                self.extraction.default_language
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = CarveConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.extraction.default_function_name, "extractedMethod");
        assert!(config.extraction.ambient_globals.contains(&"console".to_string()));
    }

    #[test]
    fn test_load_from_dir_without_files_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = CarveConfig::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.extraction, ExtractionConfig::default());
    }

    #[test]
    fn test_project_toml_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".carve")).unwrap();
        fs::write(
            dir.path().join(".carve/config.toml"),
            r#"
[extraction]
defaultFunctionName = "helper"
defaultLanguage = "javascript"

[logging]
format = "json"
"#,
        )
        .unwrap();

        let config = CarveConfig::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.extraction.default_function_name, "helper");
        assert_eq!(config.extraction.default_language, "javascript");
        assert!(config.extraction.preserve_comments);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_root_file_wins_over_dot_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".carve")).unwrap();
        fs::write(
            dir.path().join("carve.toml"),
            "[extraction]\ndefaultFunctionName = \"fromRoot\"\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(".carve/config.toml"),
            "[extraction]\ndefaultFunctionName = \"fromDotDir\"\n",
        )
        .unwrap();

        let config = CarveConfig::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.extraction.default_function_name, "fromRoot");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[extraction]\ndefaultFunctionName = \"class\"\n").unwrap();
        let err = CarveConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ExtractError::Config { .. }));

        let mut config = CarveConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = CarveConfig::default();
        config.extraction.default_language = "cobol".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = CarveConfig::load_from(Path::new("/nonexistent/carve.toml")).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_written_toml_loads_back() {
        let mut config = CarveConfig::default();
        config.extraction.ambient_globals = vec!["console".to_string(), "$".to_string()];
        config.extraction.preserve_comments = false;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("carve.toml");
        fs::write(&path, config.to_toml().unwrap()).unwrap();

        assert_eq!(CarveConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_env_keys_map_onto_camel_case_fields() {
        assert_eq!(
            env_key_path("EXTRACTION.DEFAULTFUNCTIONNAME"),
            "extraction.defaultFunctionName"
        );
        assert_eq!(env_key_path("LOGGING.LEVEL"), "logging.level");
    }

    #[test]
    fn test_dialect_falls_back_to_default_language() {
        let mut extraction = ExtractionConfig::default();
        assert_eq!(extraction.dialect_for("javascriptreact"), Dialect::JavaScript);
        assert_eq!(
            extraction.dialect_for("plaintext"),
            Dialect::TypeScript { tsx: false }
        );

        extraction.default_language = "javascript".to_string();
        let options = extraction.extract_options("markdown");
        assert_eq!(options.dialect, Dialect::JavaScript);
        assert!(options.ambient_globals.contains("JSON"));
    }
}
