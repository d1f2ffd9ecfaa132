//! Per-device state shared by every filter entry point.

use std::fmt;
use std::sync::Arc;

use dsbridge_errors::{FilterError, FilterResult};
use dsbridge_hid_ds3_protocol::{is_dualshock3, is_dualshock4};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::ports::VirtualPad;
use crate::variant::{VariantHandler, variant_handler};

/// Controller protocol variant, derived from the USB identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    Unknown,
    DualShock3,
    DualShock4,
}

impl DeviceType {
    /// Classify a device by its USB vendor and product IDs.
    pub fn from_usb_ids(vendor_id: u16, product_id: u16) -> Self {
        if is_dualshock3(vendor_id, product_id) {
            DeviceType::DualShock3
        } else if is_dualshock4(vendor_id, product_id) {
            DeviceType::DualShock4
        } else {
            DeviceType::Unknown
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DeviceType::Unknown => "Unknown",
            DeviceType::DualShock3 => "DualShock3",
            DeviceType::DualShock4 => "DualShock4",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One attached controller.
///
/// The variant handler is resolved once, when the context is created. Every
/// operation reaches it through [`DeviceContext::with_handler`], which is the
/// only place an unsupported variant is turned into an error.
pub struct DeviceContext {
    device_type: DeviceType,
    device_index: u32,
    virtual_pad: Option<Arc<dyn VirtualPad>>,
    handler: Option<Mutex<Box<dyn VariantHandler>>>,
}

impl DeviceContext {
    /// Create the context for a device in virtual-controller slot `device_index`.
    ///
    /// `virtual_pad` is `None` when no virtual-controller backend is available;
    /// input is still translated, just not forwarded.
    pub fn new(
        device_type: DeviceType,
        device_index: u32,
        virtual_pad: Option<Arc<dyn VirtualPad>>,
    ) -> Self {
        let handler = match variant_handler(device_type) {
            Ok(mut handler) => {
                handler.assign_slot(device_index);
                debug!(%device_type, device_index, "variant handler attached");
                Some(Mutex::new(handler))
            }
            Err(e) => {
                warn!(%device_type, device_index, error = %e, "no variant handler, passing through");
                None
            }
        };

        Self {
            device_type,
            device_index,
            virtual_pad,
            handler,
        }
    }

    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    pub fn device_index(&self) -> u32 {
        self.device_index
    }

    pub fn virtual_pad(&self) -> Option<&Arc<dyn VirtualPad>> {
        self.virtual_pad.as_ref()
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Run `f` against the variant handler.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnsupportedVariant`] if the device type has no
    /// handler, otherwise whatever `f` returns.
    pub fn with_handler<R>(
        &self,
        f: impl FnOnce(&mut dyn VariantHandler) -> FilterResult<R>,
    ) -> FilterResult<R> {
        let handler = self
            .handler
            .as_ref()
            .ok_or_else(|| FilterError::unsupported(self.device_type.name()))?;
        let mut guard = handler.lock();
        f(guard.as_mut())
    }
}

impl fmt::Debug for DeviceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceContext")
            .field("device_type", &self.device_type)
            .field("device_index", &self.device_index)
            .field("virtual_pad", &self.virtual_pad.is_some())
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_type_from_usb_ids() {
        assert_eq!(DeviceType::from_usb_ids(0x054C, 0x0268), DeviceType::DualShock3);
        assert_eq!(DeviceType::from_usb_ids(0x054C, 0x05C4), DeviceType::DualShock4);
        assert_eq!(DeviceType::from_usb_ids(0x054C, 0x09CC), DeviceType::DualShock4);
        assert_eq!(DeviceType::from_usb_ids(0x045E, 0x028E), DeviceType::Unknown);
    }

    #[test]
    fn test_ds3_context_has_handler() {
        let device = DeviceContext::new(DeviceType::DualShock3, 0, None);
        assert!(device.has_handler());
        let ty = device.with_handler(|h| Ok(h.device_type()));
        assert_eq!(ty, Ok(DeviceType::DualShock3));
    }

    #[test]
    fn test_handler_mutations_persist_between_calls() {
        let device = DeviceContext::new(DeviceType::DualShock3, 1, None);
        device
            .with_handler(|h| h.translate_output(&[0x01, 0x00, 0x10, 0x20, 0x30, 0x40]))
            .expect("host report is long enough");
        let native = device
            .with_handler(|h| Ok(h.native_output().to_vec()))
            .expect("handler exists");
        assert_eq!(&native[1..5], &[0x10, 0x20, 0x30, 0x40]);
        assert_eq!(native[9], 0x04);
    }

    #[test]
    fn test_unsupported_variants_report_not_implemented() {
        for device_type in [DeviceType::DualShock4, DeviceType::Unknown] {
            let device = DeviceContext::new(device_type, 0, None);
            assert!(!device.has_handler());
            let result = device.with_handler(|_| Ok(()));
            assert_eq!(
                result,
                Err(FilterError::UnsupportedVariant {
                    variant: device_type.name()
                })
            );
        }
    }
}
