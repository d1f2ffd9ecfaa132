//! DualShock 3 output report layout and host-to-native translation.
//!
//! All functions are pure and allocation-free.
//!
//! The native output report travels over the control endpoint as
//! `SET_REPORT(Output, 0x01)` and has no report ID of its own on the wire;
//! byte 0 is a reserved slot that the translation never writes.
//!
//! | Byte  | Content |
//! |-------|---------|
//! | 0     | reserved report-ID slot |
//! | 1     | right (small) motor duration |
//! | 2     | right (small) motor on/off |
//! | 3     | left (large) motor duration |
//! | 4     | left (large) motor force |
//! | 9     | LED bitmask (bit 1 = LED 1 … bit 4 = LED 4) |
//! | 10–29 | per-LED PWM blocks, LED 4 first |
//!
//! The host-facing output report (declared by the spoofed HID descriptor)
//! has a two byte header, report ID and a reserved byte, followed by the
//! same four rumble bytes.

#![deny(static_mut_refs)]

use crate::error::Ds3ProtocolError;

/// Length of the native output report.
pub const NATIVE_OUTPUT_REPORT_LEN: usize = 48;

/// Offset of the rumble block in the host output report.
pub const HOST_RUMBLE_OFFSET: usize = 2;

/// Offset of the rumble block in the native output report.
pub const NATIVE_RUMBLE_OFFSET: usize = 1;

/// Length of the rumble block.
pub const RUMBLE_LEN: usize = 4;

/// Shortest host output report that carries a full rumble block.
pub const HOST_OUTPUT_REPORT_MIN_LEN: usize = HOST_RUMBLE_OFFSET + RUMBLE_LEN;

const LED_MASK_OFFSET: usize = 9;

/// Power-on output state: motors idle with maximum duration, LEDs off,
/// LED PWM blocks at the controller's default blink parameters.
pub const NATIVE_OUTPUT_TEMPLATE: [u8; NATIVE_OUTPUT_REPORT_LEN] = [
    0x00, 0xFF, 0x00, 0xFF, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, //
    0xFF, 0x27, 0x10, 0x00, 0x32, //
    0xFF, 0x27, 0x10, 0x00, 0x32, //
    0xFF, 0x27, 0x10, 0x00, 0x32, //
    0xFF, 0x27, 0x10, 0x00, 0x32, //
    0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00,
];

/// LED bitmask bits.
pub mod leds {
    pub const LED_1: u8 = 0x02;
    pub const LED_2: u8 = 0x04;
    pub const LED_3: u8 = 0x08;
    pub const LED_4: u8 = 0x10;
    pub const ALL: u8 = LED_1 | LED_2 | LED_3 | LED_4;
}

/// LED pattern for a zero-based controller slot.
///
/// Slots 0–3 light a single LED; slots 4–6 combine LED 4 with LED 1–3, the
/// numbering printed on the controller. Anything higher lights all four.
pub fn player_led_mask(device_index: u32) -> u8 {
    use leds::*;
    match device_index {
        0 => LED_1,
        1 => LED_2,
        2 => LED_3,
        3 => LED_4,
        4 => LED_4 | LED_1,
        5 => LED_4 | LED_2,
        6 => LED_4 | LED_3,
        _ => ALL,
    }
}

/// Rumble block, in wire order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rumble {
    pub right_duration: u8,
    pub right_power: u8,
    pub left_duration: u8,
    pub left_power: u8,
}

/// The device's native output report buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeOutputReport {
    bytes: [u8; NATIVE_OUTPUT_REPORT_LEN],
}

impl Default for NativeOutputReport {
    fn default() -> Self {
        Self {
            bytes: NATIVE_OUTPUT_TEMPLATE,
        }
    }
}

impl NativeOutputReport {
    /// Create a report initialised from [`NATIVE_OUTPUT_TEMPLATE`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire bytes.
    pub fn as_bytes(&self) -> &[u8; NATIVE_OUTPUT_REPORT_LEN] {
        &self.bytes
    }

    /// Reserved report-ID slot (byte 0).
    pub fn report_id(&self) -> u8 {
        self.bytes[0]
    }

    /// Copy the rumble block of a host output report into this report.
    ///
    /// Host bytes `[2..6)` land at native bytes `[1..5)`. Byte 0 is never
    /// written.
    ///
    /// # Errors
    ///
    /// Returns [`Ds3ProtocolError::ReportTooShort`] if `host` is shorter than
    /// [`HOST_OUTPUT_REPORT_MIN_LEN`]; the report is left unchanged.
    pub fn apply_host_report(&mut self, host: &[u8]) -> Result<(), Ds3ProtocolError> {
        let rumble = host
            .get(HOST_RUMBLE_OFFSET..HOST_OUTPUT_REPORT_MIN_LEN)
            .ok_or(Ds3ProtocolError::ReportTooShort {
                required: HOST_OUTPUT_REPORT_MIN_LEN,
                actual: host.len(),
            })?;
        self.bytes[NATIVE_RUMBLE_OFFSET..NATIVE_RUMBLE_OFFSET + RUMBLE_LEN]
            .copy_from_slice(rumble);
        Ok(())
    }

    /// Current rumble block.
    pub fn rumble(&self) -> Rumble {
        Rumble {
            right_duration: self.bytes[1],
            right_power: self.bytes[2],
            left_duration: self.bytes[3],
            left_power: self.bytes[4],
        }
    }

    /// Current LED bitmask.
    pub fn led_mask(&self) -> u8 {
        self.bytes[LED_MASK_OFFSET]
    }

    /// Overwrite the LED bitmask. Bits outside [`leds::ALL`] are dropped.
    pub fn set_led_mask(&mut self, mask: u8) {
        self.bytes[LED_MASK_OFFSET] = mask & leds::ALL;
    }

    /// Light the LED pattern of a controller slot.
    pub fn set_player_led(&mut self, device_index: u32) {
        self.set_led_mask(player_led_mask(device_index));
    }
}
