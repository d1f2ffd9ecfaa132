//! Output data path: output reports written by the host.

use dsbridge_errors::FilterResult;
use tracing::debug;

use crate::device::DeviceContext;

/// Merge a host output report into the device's native output buffer.
///
/// The buffer is sent to the device by the next output push; nothing is
/// transmitted here.
///
/// # Errors
///
/// [`dsbridge_errors::FilterError::BufferTooSmall`] for host reports shorter
/// than the rumble block, [`dsbridge_errors::FilterError::UnsupportedVariant`]
/// for devices without a handler. The native buffer is unchanged in both cases.
pub fn on_output_report(device: &DeviceContext, host_report: &[u8]) -> FilterResult<()> {
    device.with_handler(|handler| handler.translate_output(host_report))?;
    debug!(
        device_index = device.device_index(),
        len = host_report.len(),
        "host output report merged"
    );
    Ok(())
}
