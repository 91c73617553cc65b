//! Centralized logging initialization with environment variable support

use crate::{CarveConfig, LogFormat};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber
///
/// Environment variables (in priority order):
/// - `RUST_LOG`: Standard Rust log filter (takes precedence over all)
/// - `LOG_FORMAT`: Override format (json, pretty)
///
/// Logs always go to stderr so an editor bridge can own stdout.
pub fn initialize(config: &CarveConfig) {
    let env_filter = build_filter(std::env::var("RUST_LOG").ok().as_deref(), &config.logging.level);

    match resolve_format(std::env::var("LOG_FORMAT").ok().as_deref(), config.logging.format) {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// `RUST_LOG` when set and valid, the configured level otherwise
fn build_filter(rust_log: Option<&str>, configured_level: &str) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_new(configured_level.to_lowercase()).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn resolve_format(env_override: Option<&str>, configured: LogFormat) -> LogFormat {
    env_override
        .and_then(|f| match f.to_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "pretty" | "human" => Some(LogFormat::Pretty),
            _ => None,
        })
        .unwrap_or(configured)
}

/// Span wrapping one extract-method command run
///
/// ```rust
/// use carve_config::logging::command_span;
///
/// let span = command_span("extract_method", "typescript");
/// let _enter = span.enter();
/// tracing::info!("Extracting");
/// ```
pub fn command_span(command: &str, language_id: &str) -> tracing::Span {
    tracing::info_span!(
        "command",
        command = %command,
        language_id = %language_id
    )
}
