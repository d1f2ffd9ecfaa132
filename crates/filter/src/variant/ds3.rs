//! DualShock 3 handler.

use dsbridge_errors::{FilterError, FilterResult};
use dsbridge_hid_ds3_protocol::{
    CONFIGURATION_DESCRIPTOR, CONFIGURATION_DESCRIPTOR_LEN, CONFIGURATION_HEADER_LEN,
    CanonicalGamepadState, Ds3ProtocolError, HID_REPORT_DESCRIPTOR, HID_REPORT_DESCRIPTOR_LEN,
    NativeOutputReport, configuration_header, translate_input_report,
};
use dsbridge_xusb::XusbReport;
use tracing::{trace, warn};

use super::VariantHandler;
use crate::command::ControlCommand;
use crate::device::DeviceType;

fn protocol_error(e: Ds3ProtocolError) -> FilterError {
    match e {
        Ds3ProtocolError::ReportTooShort { required, actual } => {
            FilterError::buffer_too_small(required, actual)
        }
        other => FilterError::InvalidReport(other.to_string()),
    }
}

/// Per-device DualShock 3 state: last input, native output buffer, and a
/// scratch buffer for in-place translation.
#[derive(Debug, Default)]
pub struct Ds3Handler {
    last_state: Option<CanonicalGamepadState>,
    output: NativeOutputReport,
    scratch: Vec<u8>,
}

impl Ds3Handler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VariantHandler for Ds3Handler {
    fn device_type(&self) -> DeviceType {
        DeviceType::DualShock3
    }

    /// The host first asks for the 9-byte header to learn `wTotalLength`,
    /// then for the whole descriptor. Any other length is answered with
    /// nothing.
    fn configuration_descriptor(&self, buffer: &mut [u8]) -> FilterResult<usize> {
        let len = buffer.len();
        if len == CONFIGURATION_HEADER_LEN {
            buffer.copy_from_slice(configuration_header());
            return Ok(CONFIGURATION_HEADER_LEN);
        }
        if len >= CONFIGURATION_DESCRIPTOR_LEN {
            buffer[..CONFIGURATION_DESCRIPTOR_LEN].copy_from_slice(&CONFIGURATION_DESCRIPTOR);
            return Ok(CONFIGURATION_DESCRIPTOR_LEN);
        }
        warn!(
            len,
            header = CONFIGURATION_HEADER_LEN,
            full = CONFIGURATION_DESCRIPTOR_LEN,
            "configuration descriptor query of unexpected length left unanswered"
        );
        Ok(0)
    }

    fn report_descriptor(&self, buffer: &mut [u8]) -> FilterResult<usize> {
        let actual = buffer.len();
        let dst = buffer
            .get_mut(..HID_REPORT_DESCRIPTOR_LEN)
            .ok_or_else(|| FilterError::buffer_too_small(HID_REPORT_DESCRIPTOR_LEN, actual))?;
        dst.copy_from_slice(HID_REPORT_DESCRIPTOR);
        Ok(HID_REPORT_DESCRIPTOR_LEN)
    }

    fn translate_input(&mut self, report: &mut [u8]) -> FilterResult<XusbReport> {
        self.scratch.clear();
        self.scratch.resize(report.len(), 0);
        let translation =
            translate_input_report(report, &mut self.scratch).map_err(protocol_error)?;
        report.copy_from_slice(&self.scratch);
        self.last_state = Some(translation.state);
        trace!(buttons = translation.state.buttons, "input report translated");
        Ok(translation.xusb)
    }

    fn translate_output(&mut self, host_report: &[u8]) -> FilterResult<()> {
        self.output
            .apply_host_report(host_report)
            .map_err(protocol_error)?;
        trace!(rumble = ?self.output.rumble(), "native output updated");
        Ok(())
    }

    fn last_state(&self) -> Option<CanonicalGamepadState> {
        self.last_state
    }

    fn native_output(&self) -> &[u8] {
        self.output.as_bytes()
    }

    fn enable_command(&self) -> ControlCommand<'static> {
        ControlCommand::ds3_enable()
    }

    fn output_command(&self) -> ControlCommand<'_> {
        ControlCommand::ds3_output(self.output.as_bytes())
    }

    fn assign_slot(&mut self, device_index: u32) {
        self.output.set_player_led(device_index);
    }
}
