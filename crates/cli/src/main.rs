//! dsbridgectl - DualShock 3 filter tooling
//!
//! Inspect what the filter does to captured reports, dump the descriptors it
//! presents to the host, and exercise the command lifecycle without hardware.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod completion;
mod error;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dsbridge_filter::{BridgeConfig, LoggingConfig, init_logging};

use crate::commands::*;
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "dsbridgectl")]
#[command(about = "DualShock 3 filter tooling - translate reports, dump descriptors, simulate")]
#[command(version)]
#[command(long_about = "
dsbridgectl runs the dsbridge filter logic outside of a driver stack.
Captured input reports can be translated, the spoofed descriptors dumped,
and the enable/output command lifecycle simulated against an in-memory
transport. Use --json for machine-readable output.
")]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(
        long,
        global = true,
        help = "Output in JSON format for machine parsing"
    )]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a raw DualShock 3 input report
    Translate {
        /// Report bytes as hex, e.g. "01 00 10 00 ..."
        #[arg(long, conflicts_with = "file")]
        hex: Option<String>,
        /// File holding the report as hex text
        #[arg(long)]
        file: Option<PathBuf>,
        /// Virtual-controller slot of the device
        #[arg(long, default_value_t = 0)]
        device_index: u32,
    },

    /// Answer a descriptor query
    Descriptor {
        /// Which descriptor to request
        #[arg(value_enum)]
        target: DescriptorTarget,
        /// Host buffer length (defaults to 255)
        #[arg(short, long)]
        length: Option<usize>,
    },

    /// Run the enable/output lifecycle against a mock transport
    Simulate {
        /// Number of enable attempts that fail before one succeeds
        #[arg(long, default_value_t = 0)]
        enable_failures: u32,
        /// How long to run, in milliseconds
        #[arg(long, default_value_t = 500)]
        duration_ms: u64,
        /// Virtual-controller slot of the device
        #[arg(long, default_value_t = 0)]
        device_index: u32,
        /// Take timings from this configuration file
        #[arg(long, env = "DSBRIDGE_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Configuration file commands
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&logging_config(&cli).await)?;

    match execute_command(&cli).await {
        Ok(()) => Ok(()),
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }

            let exit_code = match e.downcast_ref::<CliError>() {
                Some(CliError::InvalidInput(_)) => 2,
                Some(CliError::Filter(_)) => 3,
                Some(CliError::InvalidConfiguration(_)) | Some(CliError::JsonError(_)) => 4,
                _ => 1,
            };

            std::process::exit(exit_code);
        }
    }
}

/// Logging settings for this run.
///
/// `simulate --config` contributes its `logging` section; each `-v` raises the
/// level past it. `RUST_LOG` still wins inside [`init_logging`].
async fn logging_config(cli: &Cli) -> LoggingConfig {
    let mut logging = match &cli.command {
        Commands::Simulate {
            config: Some(path), ..
        } => match BridgeConfig::load_from_path(path).await {
            Ok(config) => config.logging,
            // reported again, with its exit code, when the command runs
            Err(_) => quiet_logging(),
        },
        _ => quiet_logging(),
    };

    let verbose_level = match cli.verbose {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    };
    if let Some(level) = verbose_level {
        logging.level = level.to_string();
    }
    logging
}

fn quiet_logging() -> LoggingConfig {
    LoggingConfig {
        level: "warn".to_string(),
        with_target: false,
        ..LoggingConfig::default()
    }
}

async fn execute_command(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Translate {
            hex,
            file,
            device_index,
        } => {
            commands::translate::execute(hex.as_deref(), file.as_deref(), *device_index, cli.json)
                .await
        }
        Commands::Descriptor { target, length } => {
            commands::descriptor::execute(*target, *length, cli.json)
        }
        Commands::Simulate {
            enable_failures,
            duration_ms,
            device_index,
            config,
        } => {
            commands::simulate::execute(
                *enable_failures,
                *duration_ms,
                *device_index,
                config.as_deref(),
                cli.json,
            )
            .await
        }
        Commands::Config(cmd) => commands::config::execute(cmd, cli.json).await,
        Commands::Completion { shell } => {
            completion::generate_completion(*shell);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn parse_translate_hex() -> TestResult {
        let cli = Cli::try_parse_from(["dsbridgectl", "translate", "--hex", "01 00"])?;
        assert!(!cli.json);
        assert!(matches!(
            cli.command,
            Commands::Translate { hex: Some(ref h), file: None, device_index: 0 } if h == "01 00"
        ));
        Ok(())
    }

    #[test]
    fn parse_translate_rejects_hex_and_file() {
        let result = Cli::try_parse_from([
            "dsbridgectl",
            "translate",
            "--hex",
            "01",
            "--file",
            "report.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_global_json_flag_after_subcommand() -> TestResult {
        let cli = Cli::try_parse_from(["dsbridgectl", "descriptor", "report", "--json"])?;
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Commands::Descriptor { target: DescriptorTarget::Report, length: None }
        ));
        Ok(())
    }

    #[test]
    fn parse_verbose_count() -> TestResult {
        let cli = Cli::try_parse_from(["dsbridgectl", "-vv", "config", "show"])?;
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Config(ConfigCommands::Show { path: None })));
        Ok(())
    }

    #[test]
    fn parse_simulate_defaults() -> TestResult {
        let cli = Cli::try_parse_from(["dsbridgectl", "simulate", "--enable-failures", "3"])?;
        match cli.command {
            Commands::Simulate {
                enable_failures,
                duration_ms,
                device_index,
                ..
            } => {
                assert_eq!(enable_failures, 3);
                assert_eq!(duration_ms, 500);
                assert_eq!(device_index, 0);
            }
            _ => return Err("expected simulate".into()),
        }
        Ok(())
    }

    #[tokio::test]
    async fn logging_defaults_to_warn_and_verbose_raises_it() -> TestResult {
        let quiet = Cli::try_parse_from(["dsbridgectl", "descriptor", "report"])?;
        assert_eq!(logging_config(&quiet).await.level, "warn");

        let loud = Cli::try_parse_from(["dsbridgectl", "-vv", "descriptor", "report"])?;
        assert_eq!(logging_config(&loud).await.level, "debug");
        Ok(())
    }

    #[tokio::test]
    async fn simulate_config_supplies_logging_section() -> TestResult {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("config.json");
        let mut config = BridgeConfig::default();
        config.logging.level = "debug".to_string();
        config.logging.with_thread_info = true;
        config.save_to_path(&path).await?;
        let path = path.to_string_lossy().to_string();

        let cli = Cli::try_parse_from(["dsbridgectl", "simulate", "--config", path.as_str()])?;
        let logging = logging_config(&cli).await;
        assert_eq!(logging.level, "debug");
        assert!(logging.with_thread_info);

        let cli =
            Cli::try_parse_from(["dsbridgectl", "-vvv", "simulate", "--config", path.as_str()])?;
        assert_eq!(logging_config(&cli).await.level, "trace");
        Ok(())
    }

    #[test]
    fn verify_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
