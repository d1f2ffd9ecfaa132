//! Descriptor queries from the host.

use dsbridge_errors::FilterResult;
use tracing::debug;

use crate::device::DeviceContext;

/// Descriptor types the filter answers itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    Configuration,
    HidReport,
}

/// Fill `buffer` with the canned configuration descriptor.
///
/// Returns the number of bytes written: the header length for a header
/// probe, the full length for a full read, `0` for any other buffer size.
pub fn configuration_descriptor(device: &DeviceContext, buffer: &mut [u8]) -> FilterResult<usize> {
    respond(device, DescriptorKind::Configuration, buffer)
}

/// Fill `buffer` with the canned HID report descriptor.
///
/// # Errors
///
/// [`dsbridge_errors::FilterError::BufferTooSmall`] if the buffer cannot hold
/// the whole descriptor; nothing is written.
pub fn report_descriptor(device: &DeviceContext, buffer: &mut [u8]) -> FilterResult<usize> {
    respond(device, DescriptorKind::HidReport, buffer)
}

/// Answer a descriptor query for `device`.
pub fn respond(
    device: &DeviceContext,
    kind: DescriptorKind,
    buffer: &mut [u8],
) -> FilterResult<usize> {
    let requested = buffer.len();
    let written = device.with_handler(|handler| match kind {
        DescriptorKind::Configuration => handler.configuration_descriptor(buffer),
        DescriptorKind::HidReport => handler.report_descriptor(buffer),
    })?;
    debug!(
        device_index = device.device_index(),
        ?kind,
        requested,
        written,
        "descriptor query answered"
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceType;
    use dsbridge_errors::FilterError;
    use dsbridge_hid_ds3_protocol::{CONFIGURATION_DESCRIPTOR_LEN, HID_REPORT_DESCRIPTOR_LEN};

    #[test]
    fn test_ds3_descriptor_queries() {
        let device = DeviceContext::new(DeviceType::DualShock3, 0, None);
        let mut buf = [0u8; 256];
        assert_eq!(
            respond(&device, DescriptorKind::Configuration, &mut buf),
            Ok(CONFIGURATION_DESCRIPTOR_LEN)
        );
        assert_eq!(
            report_descriptor(&device, &mut buf),
            Ok(HID_REPORT_DESCRIPTOR_LEN)
        );
    }

    #[test]
    fn test_unsupported_device_writes_nothing() {
        let device = DeviceContext::new(DeviceType::DualShock4, 0, None);
        let mut buf = [0xEEu8; 64];
        for kind in [DescriptorKind::Configuration, DescriptorKind::HidReport] {
            assert_eq!(
                respond(&device, kind, &mut buf),
                Err(FilterError::unsupported("DualShock4"))
            );
        }
        assert!(buf.iter().all(|b| *b == 0xEE));
    }
}
