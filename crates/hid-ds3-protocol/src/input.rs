//! DualShock 3 input report translation.
//!
//! All functions are pure and allocation-free.
//!
//! ## Raw input report (interrupt IN, 49 bytes)
//!
//! | Byte  | Content |
//! |-------|---------|
//! | 0     | report ID (`0x01`) |
//! | 2     | d-pad bits (upper nibble: up, right, down, left), select, L3, R3, start (lower nibble) |
//! | 3     | triangle, circle, cross, square (upper nibble), L2, R2, L1, R1 (lower nibble) |
//! | 4     | PS button |
//! | 6–9   | LX, LY, RX, RY |
//! | 14–17 | d-pad pressures (up, right, down, left) |
//! | 18–19 | L2, R2 analog |
//! | 20–21 | L1, R1 pressures |
//! | 22–25 | triangle, circle, cross, square pressures |
//!
//! Bytes past 25 (motion sensors, battery, connection state) are not carried
//! into the canonical report.
//!
//! ## Canonical report
//!
//! | Byte  | Content |
//! |-------|---------|
//! | 0     | report ID, copied |
//! | 1–4   | LX, LY, RX, RY |
//! | 5     | hat code (low nibble), face buttons (high nibble) |
//! | 6     | select, L3, R3, start, L2, R2, L1, R1 |
//! | 7     | PS button |
//! | 8–9   | L2, R2 analog |
//! | 10–13 | d-pad pressures |
//! | 14–15 | L1, R1 pressures |
//! | 16–19 | face pressures |
//!
//! Everything after byte 19 is zero.

#![deny(static_mut_refs)]

use dsbridge_xusb::XusbReport;

use crate::error::Ds3ProtocolError;
use crate::types::{HatDirection, XUSB_BUTTON_MAP, buttons};

/// Wire length of a DualShock 3 input report.
pub const RAW_INPUT_REPORT_LEN: usize = 49;

/// Shortest raw report that covers every translated field.
pub const MIN_INPUT_REPORT_LEN: usize = 26;

/// Length of the canonical report, including the report ID.
pub const CANONICAL_REPORT_LEN: usize = 20;

/// Length of the canonical payload (everything after the report ID).
pub const CANONICAL_PAYLOAD_LEN: usize = CANONICAL_REPORT_LEN - 1;

mod raw {
    pub const REPORT_ID: usize = 0;
    pub const DPAD_SYSTEM: usize = 2;
    pub const FACE_SHOULDER: usize = 3;
    pub const PS: usize = 4;
    pub const THUMBS: usize = 6;
    pub const DPAD_PRESSURE: usize = 14;
    pub const TRIGGERS: usize = 18;
    pub const SHOULDER_PRESSURE: usize = 20;
    pub const FACE_PRESSURE: usize = 22;
}

mod canonical {
    pub const REPORT_ID: usize = 0;
    pub const THUMBS: usize = 1;
    pub const HAT_FACE: usize = 5;
    pub const BUTTONS: usize = 6;
    pub const PS: usize = 7;
    pub const TRIGGERS: usize = 8;
    pub const DPAD_PRESSURE: usize = 10;
    pub const SHOULDER_PRESSURE: usize = 14;
    pub const FACE_PRESSURE: usize = 16;
}

/// Device-agnostic gamepad state cached after every input report.
///
/// Field order matches the canonical payload byte order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CanonicalGamepadState {
    pub left_thumb_x: u8,
    pub left_thumb_y: u8,
    pub right_thumb_x: u8,
    pub right_thumb_y: u8,
    /// Hat code (low nibble) and button bits, see [`crate::types::buttons`].
    pub buttons: u16,
    pub ps_button: u8,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub pressure_up: u8,
    pub pressure_right: u8,
    pub pressure_down: u8,
    pub pressure_left: u8,
    pub pressure_l1: u8,
    pub pressure_r1: u8,
    pub pressure_triangle: u8,
    pub pressure_circle: u8,
    pub pressure_cross: u8,
    pub pressure_square: u8,
}

impl CanonicalGamepadState {
    /// Decode a canonical payload (canonical report without its report ID).
    pub fn from_payload(p: &[u8; CANONICAL_PAYLOAD_LEN]) -> Self {
        Self {
            left_thumb_x: p[0],
            left_thumb_y: p[1],
            right_thumb_x: p[2],
            right_thumb_y: p[3],
            buttons: u16::from_le_bytes([p[4], p[5]]),
            ps_button: p[6],
            left_trigger: p[7],
            right_trigger: p[8],
            pressure_up: p[9],
            pressure_right: p[10],
            pressure_down: p[11],
            pressure_left: p[12],
            pressure_l1: p[13],
            pressure_r1: p[14],
            pressure_triangle: p[15],
            pressure_circle: p[16],
            pressure_cross: p[17],
            pressure_square: p[18],
        }
    }

    /// Encode as a canonical payload.
    pub fn to_payload(&self) -> [u8; CANONICAL_PAYLOAD_LEN] {
        let [b0, b1] = self.buttons.to_le_bytes();
        [
            self.left_thumb_x,
            self.left_thumb_y,
            self.right_thumb_x,
            self.right_thumb_y,
            b0,
            b1,
            self.ps_button,
            self.left_trigger,
            self.right_trigger,
            self.pressure_up,
            self.pressure_right,
            self.pressure_down,
            self.pressure_left,
            self.pressure_l1,
            self.pressure_r1,
            self.pressure_triangle,
            self.pressure_circle,
            self.pressure_cross,
            self.pressure_square,
        ]
    }

    /// Current d-pad direction.
    pub fn hat(&self) -> HatDirection {
        HatDirection::from_code((self.buttons & buttons::HAT_MASK) as u8)
    }

    /// Returns `true` if every bit of `mask` is set.
    pub fn is_pressed(&self, mask: u16) -> bool {
        self.buttons & mask == mask
    }

    /// PS button state.
    pub fn ps_pressed(&self) -> bool {
        self.ps_button & 0x01 != 0
    }

    /// XUSB button mask: mapped buttons plus d-pad flags from the hat.
    pub fn xusb_buttons(&self) -> u16 {
        XUSB_BUTTON_MAP
            .iter()
            .filter(|(src, _)| self.buttons & src != 0)
            .fold(self.hat().xusb_dpad(), |acc, (_, dst)| acc | dst)
    }
}

/// Result of translating one input report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputTranslation {
    /// Canonical state to cache for sideband readers.
    pub state: CanonicalGamepadState,
    /// Report for the host-facing virtual controller. Only `buttons` is populated.
    pub xusb: XusbReport,
}

/// Translate a raw DualShock 3 input report into the canonical layout.
///
/// `out` must be exactly as long as `raw`; it is zeroed and then filled with
/// the canonical report, so unset fields never carry stale data. `raw` is
/// not modified.
///
/// # Errors
///
/// Returns [`Ds3ProtocolError::ReportTooShort`] if `raw` is shorter than
/// [`MIN_INPUT_REPORT_LEN`] and [`Ds3ProtocolError::LengthMismatch`] if the
/// buffer lengths differ. `out` is left untouched in both cases.
pub fn translate_input_report(
    raw: &[u8],
    out: &mut [u8],
) -> Result<InputTranslation, Ds3ProtocolError> {
    if raw.len() < MIN_INPUT_REPORT_LEN {
        return Err(Ds3ProtocolError::ReportTooShort {
            required: MIN_INPUT_REPORT_LEN,
            actual: raw.len(),
        });
    }
    if out.len() != raw.len() {
        return Err(Ds3ProtocolError::LengthMismatch {
            expected: raw.len(),
            actual: out.len(),
        });
    }

    out.fill(0);
    out[canonical::REPORT_ID] = raw[raw::REPORT_ID];

    let hat = HatDirection::from_dpad_bits(raw[raw::DPAD_SYSTEM]);
    out[canonical::HAT_FACE] = (raw[raw::FACE_SHOULDER] & 0xF0) | hat.code();

    out[canonical::THUMBS..canonical::THUMBS + 4]
        .copy_from_slice(&raw[raw::THUMBS..raw::THUMBS + 4]);

    out[canonical::BUTTONS] =
        (raw[raw::DPAD_SYSTEM] & 0x0F) | ((raw[raw::FACE_SHOULDER] & 0x0F) << 4);

    out[canonical::PS] = raw[raw::PS];
    out[canonical::TRIGGERS..canonical::TRIGGERS + 2]
        .copy_from_slice(&raw[raw::TRIGGERS..raw::TRIGGERS + 2]);
    out[canonical::DPAD_PRESSURE..canonical::DPAD_PRESSURE + 4]
        .copy_from_slice(&raw[raw::DPAD_PRESSURE..raw::DPAD_PRESSURE + 4]);
    out[canonical::SHOULDER_PRESSURE..canonical::SHOULDER_PRESSURE + 2]
        .copy_from_slice(&raw[raw::SHOULDER_PRESSURE..raw::SHOULDER_PRESSURE + 2]);
    out[canonical::FACE_PRESSURE..canonical::FACE_PRESSURE + 4]
        .copy_from_slice(&raw[raw::FACE_PRESSURE..raw::FACE_PRESSURE + 4]);

    let mut payload = [0u8; CANONICAL_PAYLOAD_LEN];
    payload.copy_from_slice(&out[1..CANONICAL_REPORT_LEN]);
    let state = CanonicalGamepadState::from_payload(&payload);

    let mut xusb = XusbReport::default();
    xusb.press(state.xusb_buttons());

    Ok(InputTranslation { state, xusb })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsbridge_xusb::buttons as xusb;

    fn idle_report() -> [u8; RAW_INPUT_REPORT_LEN] {
        let mut raw = [0u8; RAW_INPUT_REPORT_LEN];
        raw[0] = 0x01;
        raw
    }

    fn translate(raw: &[u8]) -> (Vec<u8>, InputTranslation) {
        let mut out = vec![0xAAu8; raw.len()];
        let translation =
            translate_input_report(raw, &mut out).expect("translation should succeed");
        (out, translation)
    }

    #[test]
    fn test_idle_report_translates_to_released() {
        let (out, t) = translate(&idle_report());
        assert_eq!(out[0], 0x01);
        assert_eq!(out[5], 0x08);
        assert!(out.iter().enumerate().all(|(i, b)| i == 0 || i == 5 || *b == 0));
        assert_eq!(t.state.hat(), HatDirection::Released);
        assert_eq!(t.xusb.buttons, 0);
    }

    #[test]
    fn test_northeast_sets_up_and_right() {
        let mut raw = idle_report();
        raw[2] = 0x30;
        let (out, t) = translate(&raw);
        assert_eq!(out[5] & 0x0F, 1);
        assert_eq!(t.xusb.buttons, xusb::DPAD_UP | xusb::DPAD_RIGHT);
    }

    #[test]
    fn test_sticks_and_pressures_are_copied() {
        let mut raw = idle_report();
        raw[6..10].copy_from_slice(&[0x10, 0x20, 0x30, 0x40]);
        raw[14..18].copy_from_slice(&[1, 2, 3, 4]);
        raw[18] = 0xFE;
        raw[19] = 0xFD;
        raw[20] = 0x55;
        raw[21] = 0x66;
        raw[22..26].copy_from_slice(&[9, 8, 7, 6]);
        raw[4] = 0x01;
        let (out, t) = translate(&raw);
        assert_eq!(&out[1..5], &[0x10, 0x20, 0x30, 0x40]);
        assert_eq!(out[7], 0x01);
        assert_eq!(&out[8..10], &[0xFE, 0xFD]);
        assert_eq!(&out[10..14], &[1, 2, 3, 4]);
        assert_eq!(&out[14..16], &[0x55, 0x66]);
        assert_eq!(&out[16..20], &[9, 8, 7, 6]);
        assert_eq!(t.state.left_trigger, 0xFE);
        assert_eq!(t.state.pressure_square, 6);
        assert!(t.state.ps_pressed());
    }

    #[test]
    fn test_buttons_pack_and_map() {
        let mut raw = idle_report();
        // select + start, L1 + R1, triangle + cross
        raw[2] = 0x09;
        raw[3] = 0x50 | 0x0C;
        let (out, t) = translate(&raw);
        assert_eq!(out[6], 0x09 | (0x0C << 4));
        assert_eq!(out[5] & 0xF0, 0x50);
        assert!(t.state.is_pressed(buttons::SELECT | buttons::START));
        assert!(t.state.is_pressed(buttons::LEFT_SHOULDER | buttons::RIGHT_SHOULDER));
        assert!(t.state.is_pressed(buttons::TRIANGLE | buttons::CROSS));
        assert_eq!(
            t.xusb.buttons,
            xusb::BACK
                | xusb::START
                | xusb::LEFT_SHOULDER
                | xusb::RIGHT_SHOULDER
                | xusb::Y
                | xusb::A
        );
    }

    #[test]
    fn test_triggers_have_no_xusb_button() {
        let mut raw = idle_report();
        raw[3] = 0x03;
        let (_, t) = translate(&raw);
        assert!(t.state.is_pressed(buttons::LEFT_TRIGGER | buttons::RIGHT_TRIGGER));
        assert_eq!(t.xusb.buttons, 0);
    }

    #[test]
    fn test_tail_is_zeroed() {
        let mut raw = [0xFFu8; RAW_INPUT_REPORT_LEN];
        raw[2] = 0x00;
        let (out, _) = translate(&raw);
        assert!(out[CANONICAL_REPORT_LEN..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_short_report_rejected() {
        let raw = [0x01u8; MIN_INPUT_REPORT_LEN - 1];
        let mut out = [0xAAu8; MIN_INPUT_REPORT_LEN - 1];
        assert_eq!(
            translate_input_report(&raw, &mut out),
            Err(Ds3ProtocolError::ReportTooShort {
                required: MIN_INPUT_REPORT_LEN,
                actual: MIN_INPUT_REPORT_LEN - 1,
            })
        );
        assert!(out.iter().all(|b| *b == 0xAA));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let raw = idle_report();
        let mut out = [0u8; RAW_INPUT_REPORT_LEN - 1];
        assert!(matches!(
            translate_input_report(&raw, &mut out),
            Err(Ds3ProtocolError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_payload_encoding_matches_report_bytes() {
        let mut raw = idle_report();
        raw[2] = 0x4A;
        raw[3] = 0xA5;
        raw[6] = 0x7F;
        let (out, t) = translate(&raw);
        assert_eq!(&t.state.to_payload()[..], &out[1..CANONICAL_REPORT_LEN]);
    }
}
