//! Answer a descriptor query the way the filter would.

use anyhow::Result;
use dsbridge_filter::{DeviceContext, DeviceType, respond};
use dsbridge_hid_ds3_protocol::SPOOFED_DS3_IDENTITY;

use super::DescriptorTarget;
use crate::error::CliError;
use crate::output;

/// Buffer size used when the caller does not ask for a specific length.
const DEFAULT_REQUEST_LEN: usize = 255;

pub fn execute(target: DescriptorTarget, length: Option<usize>, json: bool) -> Result<()> {
    let device = DeviceContext::new(DeviceType::DualShock3, 0, None);
    let requested = length.unwrap_or(DEFAULT_REQUEST_LEN);
    let mut buffer = vec![0u8; requested];

    let written = respond(&device, target.into(), &mut buffer).map_err(CliError::from)?;
    output::print_descriptor(
        target,
        &SPOOFED_DS3_IDENTITY,
        requested,
        &buffer[..written],
        json,
    );
    Ok(())
}
