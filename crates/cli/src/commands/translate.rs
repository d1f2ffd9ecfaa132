//! Translate a captured DualShock 3 input report.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use dsbridge_errors::TransferStatus;
use dsbridge_filter::ports::mock::MockVirtualPad;
use dsbridge_filter::{DeviceContext, DeviceType, on_input_report};
use dsbridge_hid_ds3_protocol::CANONICAL_REPORT_LEN;
use tracing::debug;

use crate::error::{CliError, parse_hex};
use crate::output::{self, TranslationView};

pub async fn execute(
    hex: Option<&str>,
    file: Option<&Path>,
    device_index: u32,
    json: bool,
) -> Result<()> {
    let text = match (hex, file) {
        (Some(hex), None) => hex.to_string(),
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read report file: {:?}", path))?,
        _ => {
            return Err(CliError::InvalidInput(
                "provide exactly one of --hex or --file".to_string(),
            )
            .into());
        }
    };

    let raw = parse_hex(&text)?;
    debug!(len = raw.len(), "translating captured report");

    let pad = MockVirtualPad::new();
    let device = DeviceContext::new(
        DeviceType::DualShock3,
        device_index,
        Some(Arc::new(pad.clone())),
    );

    let mut report = raw.clone();
    let status: TransferStatus = Ok(report.len());
    on_input_report(&device, &status, &mut report).map_err(CliError::from)?;

    let state = device
        .with_handler(|h| Ok(h.last_state()))
        .map_err(CliError::from)?
        .ok_or_else(|| CliError::InvalidInput("report produced no state".to_string()))?;
    let forwarded = pad.reports().pop();

    let view = TranslationView {
        raw: &raw,
        canonical: &report[..CANONICAL_REPORT_LEN.min(report.len())],
        state,
        forwarded,
    };
    output::print_translation(&view, json);
    Ok(())
}
