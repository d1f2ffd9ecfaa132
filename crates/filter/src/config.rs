//! Filter configuration
//!
//! JSON file holding the command timings and logging options. A missing file
//! is created with defaults on first load.

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::logging::LoggingConfig;
use crate::sequencer::SequencerTiming;

/// Schema prefix every config file must carry.
pub const SCHEMA_PREFIX: &str = "dsbridge.config/";

/// Complete filter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Configuration schema version
    pub schema_version: String,
    /// Command timing
    pub sequencer: SequencerConfig,
    /// Logging
    pub logging: LoggingConfig,
}

/// Enable and output-push timer settings, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerConfig {
    /// Delay before the first enable attempt
    pub enable_delay_ms: u64,
    /// Period between enable attempts
    pub enable_interval_ms: u64,
    /// Delay between enable success and the first output push
    pub output_delay_ms: u64,
    /// Period between output pushes
    pub output_interval_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            schema_version: format!("{SCHEMA_PREFIX}v1"),
            sequencer: SequencerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SequencerConfig {
    fn default() -> Self {
        let timing = SequencerTiming::default();
        Self {
            enable_delay_ms: timing.enable_delay.as_millis() as u64,
            enable_interval_ms: timing.enable_interval.as_millis() as u64,
            output_delay_ms: timing.output_delay.as_millis() as u64,
            output_interval_ms: timing.output_interval.as_millis() as u64,
        }
    }
}

impl From<&SequencerConfig> for SequencerTiming {
    fn from(config: &SequencerConfig) -> Self {
        Self {
            enable_delay: Duration::from_millis(config.enable_delay_ms),
            enable_interval: Duration::from_millis(config.enable_interval_ms),
            output_delay: Duration::from_millis(config.output_delay_ms),
            output_interval: Duration::from_millis(config.output_interval_ms),
        }
    }
}

impl SequencerConfig {
    /// Both periods must be non-zero; delays may be zero.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("enable_interval_ms", self.enable_interval_ms),
            ("output_interval_ms", self.output_interval_ms),
        ] {
            anyhow::ensure!(value > 0, "sequencer.{name} must be non-zero");
        }
        Ok(())
    }
}

impl BridgeConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: BridgeConfig = serde_json::from_str(text).context("Malformed config JSON")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate, then render as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        self.validate()?;
        serde_json::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Load configuration from `path`. A missing file is created with the
    /// defaults, which are returned.
    pub async fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match tokio::fs::read_to_string(path).await {
            Ok(text) => {
                let config = Self::from_json(&text)
                    .with_context(|| format!("Invalid config file {}", path.display()))?;
                debug!(path = %path.display(), "config loaded");
                Ok(config)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no config file, writing defaults");
                let config = Self::default();
                config.save_to_path(path).await?;
                Ok(config)
            }
            Err(e) => {
                Err(e).with_context(|| format!("Failed to read config file {}", path.display()))
            }
        }
    }

    /// Write the configuration to `path`, creating parent directories.
    /// Invalid configurations are refused before anything is written.
    pub async fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let text = self.to_json()?;

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        tokio::fs::write(path, text)
            .await
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        debug!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Per-user config location: `%LOCALAPPDATA%\dsbridge\config.json` on
    /// Windows, `$XDG_CONFIG_HOME/dsbridge/config.json` (falling back to
    /// `~/.config`) elsewhere.
    pub fn default_config_path() -> Result<PathBuf> {
        let base = if cfg!(windows) {
            env::var_os("LOCALAPPDATA").map(PathBuf::from)
        } else {
            env::var_os("XDG_CONFIG_HOME")
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from)
                .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        };
        let base = base.context("No per-user config directory (LOCALAPPDATA/XDG_CONFIG_HOME/HOME unset)")?;
        Ok(base.join("dsbridge").join("config.json"))
    }

    /// Check schema, timings and logging level.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.schema_version.starts_with(SCHEMA_PREFIX),
            "Unsupported schema version {:?}, expected {SCHEMA_PREFIX}*",
            self.schema_version
        );
        self.sequencer.validate()?;
        self.logging.level_filter()?;
        Ok(())
    }

    /// Timer settings for the command sequencer
    pub fn timing(&self) -> SequencerTiming {
        SequencerTiming::from(&self.sequencer)
    }
}
