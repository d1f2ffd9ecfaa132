//! Protocol-variant dispatch.
//!
//! Each supported controller protocol implements [`VariantHandler`];
//! [`variant_handler`] is the single place a [`DeviceType`] is mapped to one.
//! Adding a variant means adding a handler and one match arm.

mod ds3;

pub use ds3::Ds3Handler;

use dsbridge_errors::{FilterError, FilterResult};
use dsbridge_hid_ds3_protocol::CanonicalGamepadState;
use dsbridge_xusb::XusbReport;

use crate::command::ControlCommand;
use crate::device::DeviceType;

/// Protocol-specific half of the filter.
pub trait VariantHandler: Send {
    fn device_type(&self) -> DeviceType;

    /// Answer a configuration descriptor query. Returns bytes written.
    fn configuration_descriptor(&self, buffer: &mut [u8]) -> FilterResult<usize>;

    /// Answer a HID report descriptor query. Returns bytes written.
    fn report_descriptor(&self, buffer: &mut [u8]) -> FilterResult<usize>;

    /// Rewrite a raw input report in place as the canonical report, cache the
    /// decoded state, and return the virtual-controller report.
    fn translate_input(&mut self, report: &mut [u8]) -> FilterResult<XusbReport>;

    /// Merge a host output report into the native output state.
    fn translate_output(&mut self, host_report: &[u8]) -> FilterResult<()>;

    /// State decoded from the most recent input report.
    fn last_state(&self) -> Option<CanonicalGamepadState>;

    /// Native output buffer as it will be sent on the next push.
    fn native_output(&self) -> &[u8];

    /// Command that switches the device into streaming mode.
    fn enable_command(&self) -> ControlCommand<'static>;

    /// Command that pushes the current native output buffer.
    fn output_command(&self) -> ControlCommand<'_>;

    /// Tell the handler which virtual-controller slot the device occupies.
    fn assign_slot(&mut self, device_index: u32);
}

/// Resolve the handler for a device type.
///
/// # Errors
///
/// [`FilterError::UnsupportedVariant`] for device types without a handler.
pub fn variant_handler(device_type: DeviceType) -> FilterResult<Box<dyn VariantHandler>> {
    match device_type {
        DeviceType::DualShock3 => Ok(Box::new(Ds3Handler::new())),
        DeviceType::DualShock4 | DeviceType::Unknown => {
            Err(FilterError::unsupported(device_type.name()))
        }
    }
}
