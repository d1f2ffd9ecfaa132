//! XUSB virtual-controller report types.
//!
//! The host-facing virtual controller speaks the Xbox 360 wired ("XUSB")
//! gamepad format: a 16-bit button mask, two trigger bytes and four signed
//! thumbstick axes. Reports are submitted per slot with a 1-based serial
//! number.

#![deny(static_mut_refs)]

use serde::{Deserialize, Serialize};

/// XUSB button bits in [`XusbReport::buttons`].
pub mod buttons {
    pub const DPAD_UP: u16 = 0x0001;
    pub const DPAD_DOWN: u16 = 0x0002;
    pub const DPAD_LEFT: u16 = 0x0004;
    pub const DPAD_RIGHT: u16 = 0x0008;
    pub const START: u16 = 0x0010;
    pub const BACK: u16 = 0x0020;
    pub const LEFT_THUMB: u16 = 0x0040;
    pub const RIGHT_THUMB: u16 = 0x0080;
    pub const LEFT_SHOULDER: u16 = 0x0100;
    pub const RIGHT_SHOULDER: u16 = 0x0200;
    pub const GUIDE: u16 = 0x0400;
    pub const A: u16 = 0x1000;
    pub const B: u16 = 0x2000;
    pub const X: u16 = 0x4000;
    pub const Y: u16 = 0x8000;

    /// All four d-pad bits.
    pub const DPAD_MASK: u16 = DPAD_UP | DPAD_DOWN | DPAD_LEFT | DPAD_RIGHT;
}

/// XUSB gamepad state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XusbReport {
    pub buttons: u16,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub thumb_lx: i16,
    pub thumb_ly: i16,
    pub thumb_rx: i16,
    pub thumb_ry: i16,
}

impl XusbReport {
    /// Returns `true` if every bit of `mask` is set.
    pub fn is_pressed(&self, mask: u16) -> bool {
        self.buttons & mask == mask
    }

    /// Set the bits of `mask`.
    pub fn press(&mut self, mask: u16) {
        self.buttons |= mask;
    }
}

/// A report addressed to one virtual-controller slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XusbSubmitReport {
    /// 1-based serial number of the target virtual controller.
    pub serial_no: u32,
    pub report: XusbReport,
}

impl XusbSubmitReport {
    /// Create an empty report for the controller in zero-based slot `device_index`.
    pub fn for_slot(device_index: u32) -> Self {
        Self {
            serial_no: device_index.saturating_add(1),
            report: XusbReport::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_is_one_based() {
        assert_eq!(XusbSubmitReport::for_slot(0).serial_no, 1);
        assert_eq!(XusbSubmitReport::for_slot(3).serial_no, 4);
        assert_eq!(XusbSubmitReport::for_slot(u32::MAX).serial_no, u32::MAX);
    }

    #[test]
    fn test_press_and_query() {
        let mut report = XusbReport::default();
        report.press(buttons::A | buttons::DPAD_UP);
        assert!(report.is_pressed(buttons::A));
        assert!(report.is_pressed(buttons::DPAD_UP));
        assert!(!report.is_pressed(buttons::A | buttons::B));
    }

    #[test]
    fn test_button_bits_are_distinct() {
        let all = [
            buttons::DPAD_UP,
            buttons::DPAD_DOWN,
            buttons::DPAD_LEFT,
            buttons::DPAD_RIGHT,
            buttons::START,
            buttons::BACK,
            buttons::LEFT_THUMB,
            buttons::RIGHT_THUMB,
            buttons::LEFT_SHOULDER,
            buttons::RIGHT_SHOULDER,
            buttons::GUIDE,
            buttons::A,
            buttons::B,
            buttons::X,
            buttons::Y,
        ];
        let combined = all.iter().fold(0u16, |acc, b| {
            assert_eq!(acc & b, 0, "bit {b:#06x} overlaps");
            acc | b
        });
        assert_eq!(combined.count_ones() as usize, all.len());
    }

    #[test]
    fn test_report_serializes() -> Result<(), serde_json::Error> {
        let submit = XusbSubmitReport::for_slot(1);
        let json = serde_json::to_string(&submit)?;
        let back: XusbSubmitReport = serde_json::from_str(&json)?;
        assert_eq!(back, submit);
        Ok(())
    }
}
