//! Command implementations for dsbridgectl

pub mod config;
pub mod descriptor;
pub mod simulate;
pub mod translate;

use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};
use dsbridge_filter::DescriptorKind;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a default configuration file
    Init {
        /// Configuration file path (defaults to the per-user location)
        #[arg(short, long)]
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Load, validate and print the configuration
    Show {
        /// Configuration file path (defaults to the per-user location)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DescriptorTarget {
    /// Configuration descriptor (header probe or full read)
    Configuration,
    /// HID report descriptor
    Report,
}

impl From<DescriptorTarget> for DescriptorKind {
    fn from(target: DescriptorTarget) -> Self {
        match target {
            DescriptorTarget::Configuration => DescriptorKind::Configuration,
            DescriptorTarget::Report => DescriptorKind::HidReport,
        }
    }
}
