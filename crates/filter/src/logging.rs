//! Structured logging setup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing::level_filters::LevelFilter;

/// Logging options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level filter used when `RUST_LOG` is not set
    pub level: String,
    /// Include the event target in each line
    pub with_target: bool,
    /// Include thread IDs and names in each line
    pub with_thread_info: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_target: true,
            with_thread_info: false,
        }
    }
}

impl LoggingConfig {
    /// Parse the configured level.
    pub fn level_filter(&self) -> Result<LevelFilter> {
        self.level
            .parse::<LevelFilter>()
            .with_context(|| format!("Invalid log level: {}", self.level))
    }
}

/// Initialize structured logging.
///
/// Events go to stderr; stdout is left to report output. `RUST_LOG` takes
/// precedence over the configured level. Fails if a global subscriber is
/// already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let level = config.level_filter()?;
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let fmt_layer = fmt::layer()
        .with_target(config.with_target)
        .with_thread_ids(config.with_thread_info)
        .with_thread_names(config.with_thread_info)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    info!(
        level = %level,
        target = config.with_target,
        thread_info = config.with_thread_info,
        "Structured logging initialized"
    );

    Ok(())
}
