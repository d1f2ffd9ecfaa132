//! Run the enable/output lifecycle against an in-memory transport.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use dsbridge_errors::TransferError;
use dsbridge_filter::command::CommandKind;
use dsbridge_filter::ports::mock::MockControlPipe;
use dsbridge_filter::{BridgeConfig, CommandSequencer, DeviceContext, DeviceType};
use tracing::info;

use crate::error::CliError;
use crate::output::{self, SimulationView};

pub async fn execute(
    enable_failures: u32,
    duration_ms: u64,
    device_index: u32,
    config_path: Option<&Path>,
    json: bool,
) -> Result<()> {
    let config = match config_path {
        Some(path) => BridgeConfig::load_from_path(path).await?,
        None => BridgeConfig::default(),
    };
    let timing = config.timing();

    let pipe = MockControlPipe::new();
    pipe.script((0..enable_failures).map(|_| Err(TransferError::Stalled)));

    let device = Arc::new(DeviceContext::new(DeviceType::DualShock3, device_index, None));
    let sequencer = CommandSequencer::attach(device, Arc::new(pipe.clone()), timing)
        .map_err(CliError::from)?;

    info!(enable_failures, duration_ms, "simulation running");
    tokio::time::sleep(Duration::from_millis(duration_ms)).await;
    sequencer.stop();

    let view = SimulationView {
        snapshot: sequencer.snapshot(),
        enable_commands: pipe.submitted_count(CommandKind::Enable),
        output_commands: pipe.submitted_count(CommandKind::OutputPush),
    };
    output::print_simulation(&view, json);
    Ok(())
}
