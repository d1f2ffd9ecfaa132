//! Input data path: interrupt IN completions from the device.

use dsbridge_errors::{FilterResult, TransferStatus};
use dsbridge_xusb::XusbSubmitReport;
use tracing::{debug, trace, warn};

use crate::device::DeviceContext;

/// What happened to one input completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// The lower transfer failed; the buffer was not touched.
    Skipped,
    /// The buffer now holds the canonical report.
    Translated {
        /// Whether the XUSB report reached the virtual-controller bus.
        forwarded: bool,
    },
}

/// Handle a completed input transfer.
///
/// On success the first `transferred` bytes of `report` are rewritten in
/// place as the canonical report, the decoded state is cached in the variant
/// handler, and the XUSB report is sent to the virtual pad for slot
/// `device_index + 1` when one is attached. A virtual-pad failure is logged
/// and does not fail the completion.
///
/// # Errors
///
/// [`dsbridge_errors::FilterError::UnsupportedVariant`] for devices without a
/// handler, or a translation error for reports that are too short. The buffer
/// is untouched and nothing is forwarded in either case.
pub fn on_input_report(
    device: &DeviceContext,
    status: &TransferStatus,
    report: &mut [u8],
) -> FilterResult<InputOutcome> {
    let transferred = match status {
        Ok(len) => (*len).min(report.len()),
        Err(e) => {
            debug!(device_index = device.device_index(), status = %e, "input transfer failed, skipping");
            return Ok(InputOutcome::Skipped);
        }
    };

    let report = &mut report[..transferred];
    let xusb = device.with_handler(|handler| handler.translate_input(report))?;

    let Some(pad) = device.virtual_pad() else {
        trace!(device_index = device.device_index(), "no virtual pad attached");
        return Ok(InputOutcome::Translated { forwarded: false });
    };

    let submit = XusbSubmitReport {
        report: xusb,
        ..XusbSubmitReport::for_slot(device.device_index())
    };
    match pad.submit_report(submit) {
        Ok(()) => Ok(InputOutcome::Translated { forwarded: true }),
        Err(e) => {
            warn!(device_index = device.device_index(), error = %e, "virtual pad rejected report");
            Ok(InputOutcome::Translated { forwarded: false })
        }
    }
}
