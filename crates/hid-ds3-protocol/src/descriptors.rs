//! Canned descriptors presented to the host in place of the controller's own.
//!
//! The DualShock 3's native HID report descriptor describes its raw 49-byte
//! report, which the host gamepad stack cannot interpret. The filter answers
//! descriptor queries with the blobs below, which describe the canonical
//! input report and the host output report instead.

#![deny(static_mut_refs)]

use crate::ids::{SONY_VENDOR_ID, product_ids, report_ids};
use crate::input::CANONICAL_REPORT_LEN;
use crate::output::HOST_OUTPUT_REPORT_MIN_LEN;

/// Size of the standard configuration descriptor header (`bLength`).
pub const CONFIGURATION_HEADER_LEN: usize = 9;

/// HID report descriptor matching the canonical input report (ID 1, 20 bytes)
/// and the host output report (ID 1, 6 bytes).
pub const HID_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x05, // Usage (Game Pad)
    0xA1, 0x01, // Collection (Application)
    0x85, report_ids::INPUT, //   Report ID
    0x09, 0x30, //   Usage (X)
    0x09, 0x31, //   Usage (Y)
    0x09, 0x32, //   Usage (Z)
    0x09, 0x35, //   Usage (Rz)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, //   Logical Maximum (255)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x04, //   Report Count (4)
    0x81, 0x02, //   Input (Data, Var, Abs)
    0x09, 0x39, //   Usage (Hat Switch)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x07, //   Logical Maximum (7)
    0x35, 0x00, //   Physical Minimum (0)
    0x46, 0x3B, 0x01, //   Physical Maximum (315)
    0x65, 0x14, //   Unit (Degrees)
    0x75, 0x04, //   Report Size (4)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x42, //   Input (Data, Var, Abs, Null State)
    0x65, 0x00, //   Unit (None)
    0x05, 0x09, //   Usage Page (Button)
    0x19, 0x01, //   Usage Minimum (1)
    0x29, 0x0C, //   Usage Maximum (12)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x0C, //   Report Count (12)
    0x81, 0x02, //   Input (Data, Var, Abs)
    0x09, 0x0D, //   Usage (Button 13)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x02, //   Input (Data, Var, Abs)
    0x95, 0x07, //   Report Count (7)
    0x81, 0x03, //   Input (Const, Var, Abs)
    0x05, 0x01, //   Usage Page (Generic Desktop)
    0x09, 0x33, //   Usage (Rx)
    0x09, 0x34, //   Usage (Ry)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, //   Logical Maximum (255)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x02, //   Report Count (2)
    0x81, 0x02, //   Input (Data, Var, Abs)
    0x06, 0x00, 0xFF, //   Usage Page (Vendor Defined 0xFF00)
    0x09, 0x20, //   Usage (0x20) pressures
    0x95, 0x0A, //   Report Count (10)
    0x81, 0x02, //   Input (Data, Var, Abs)
    0x09, 0x21, //   Usage (0x21) rumble
    0x95, 0x05, //   Report Count (5)
    0x91, 0x02, //   Output (Data, Var, Abs)
    0xC0, // End Collection
];

/// Length of [`HID_REPORT_DESCRIPTOR`].
pub const HID_REPORT_DESCRIPTOR_LEN: usize = HID_REPORT_DESCRIPTOR.len();

const HID_REPORT_DESCRIPTOR_LEN_LE: [u8; 2] = (HID_REPORT_DESCRIPTOR_LEN as u16).to_le_bytes();

/// Total length of [`CONFIGURATION_DESCRIPTOR`].
pub const CONFIGURATION_DESCRIPTOR_LEN: usize = 41;

/// Single-configuration, single-interface HID configuration descriptor with
/// one interrupt IN and one interrupt OUT endpoint.
pub const CONFIGURATION_DESCRIPTOR: [u8; CONFIGURATION_DESCRIPTOR_LEN] = [
    // Configuration
    0x09, 0x02, CONFIGURATION_DESCRIPTOR_LEN as u8, 0x00, // bLength, type, wTotalLength
    0x01, 0x01, 0x00, // bNumInterfaces, bConfigurationValue, iConfiguration
    0x80, 0xFA, // bus powered, 500 mA
    // Interface 0: HID, no subclass, no protocol
    0x09, 0x04, 0x00, 0x00, 0x02, 0x03, 0x00, 0x00, 0x00, //
    // HID 1.11, one report descriptor
    0x09, 0x21, 0x11, 0x01, 0x00, 0x01, 0x22,
    HID_REPORT_DESCRIPTOR_LEN_LE[0],
    HID_REPORT_DESCRIPTOR_LEN_LE[1],
    // EP 1 IN, interrupt, 64 bytes, 1 ms
    0x07, 0x05, 0x81, 0x03, 0x40, 0x00, 0x01, //
    // EP 2 OUT, interrupt, 64 bytes, 1 ms
    0x07, 0x05, 0x02, 0x03, 0x40, 0x00, 0x01,
];

const _: () = assert!(HID_REPORT_DESCRIPTOR_LEN <= u16::MAX as usize);
// One Report ID item covers both directions.
const _: () = assert!(report_ids::HOST_OUTPUT == report_ids::INPUT);
const _: () = assert!(CONFIGURATION_DESCRIPTOR[0] as usize == CONFIGURATION_HEADER_LEN);

/// First [`CONFIGURATION_HEADER_LEN`] bytes of [`CONFIGURATION_DESCRIPTOR`].
pub fn configuration_header() -> &'static [u8] {
    &CONFIGURATION_DESCRIPTOR[..CONFIGURATION_HEADER_LEN]
}

/// USB identity reported alongside the canned descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UsbIdentity {
    pub vendor_id: u16,
    pub product_id: u16,
    /// Length of the canonical input report, including the report ID.
    pub input_report_len: usize,
    /// Length of the host output report, including the report ID.
    pub output_report_len: usize,
}

/// Identity the host sees for a DualShock 3 behind the filter. Vendor and
/// product stay Sony's; the report layout is the canonical one.
pub const SPOOFED_DS3_IDENTITY: UsbIdentity = UsbIdentity {
    vendor_id: SONY_VENDOR_ID,
    product_id: product_ids::DUALSHOCK3,
    input_report_len: CANONICAL_REPORT_LEN,
    output_report_len: HOST_OUTPUT_REPORT_MIN_LEN,
};

#[cfg(test)]
mod tests {
    use super::*;

    /// Walk the report descriptor's short items and sum input/output bits.
    fn report_bits(desc: &[u8]) -> (usize, usize) {
        let (mut size, mut count) = (0usize, 0usize);
        let (mut input, mut output) = (0usize, 0usize);
        let mut i = 0;
        while i < desc.len() {
            let prefix = desc[i];
            let len = match prefix & 0x03 {
                3 => 4,
                n => usize::from(n),
            };
            let data = desc[i + 1..i + 1 + len]
                .iter()
                .rev()
                .fold(0usize, |acc, b| (acc << 8) | usize::from(*b));
            match prefix & 0xFC {
                0x74 => size = data,
                0x94 => count = data,
                0x80 => input += size * count,
                0x90 => output += size * count,
                _ => {}
            }
            i += 1 + len;
        }
        (input, output)
    }

    #[test]
    fn test_configuration_header_fields() {
        let header = configuration_header();
        assert_eq!(header.len(), CONFIGURATION_HEADER_LEN);
        assert_eq!(header[1], 0x02);
        assert_eq!(
            u16::from_le_bytes([header[2], header[3]]) as usize,
            CONFIGURATION_DESCRIPTOR_LEN
        );
    }

    #[test]
    fn test_descriptor_chain_lengths_sum() {
        let mut offset = 0;
        let mut types = Vec::new();
        while offset < CONFIGURATION_DESCRIPTOR_LEN {
            let len = usize::from(CONFIGURATION_DESCRIPTOR[offset]);
            assert!(len > 0);
            types.push(CONFIGURATION_DESCRIPTOR[offset + 1]);
            offset += len;
        }
        assert_eq!(offset, CONFIGURATION_DESCRIPTOR_LEN);
        assert_eq!(types, vec![0x02, 0x04, 0x21, 0x05, 0x05]);
    }

    #[test]
    fn test_hid_descriptor_points_at_report_descriptor() {
        let hid = &CONFIGURATION_DESCRIPTOR[18..27];
        assert_eq!(hid[6], 0x22);
        assert_eq!(
            usize::from(u16::from_le_bytes([hid[7], hid[8]])),
            HID_REPORT_DESCRIPTOR_LEN
        );
    }

    #[test]
    fn test_report_descriptor_matches_report_layouts() {
        let (input, output) = report_bits(HID_REPORT_DESCRIPTOR);
        assert_eq!(input / 8, CANONICAL_REPORT_LEN - 1);
        assert_eq!(output / 8, HOST_OUTPUT_REPORT_MIN_LEN - 1);
        assert_eq!(HID_REPORT_DESCRIPTOR.last(), Some(&0xC0));
    }
}
