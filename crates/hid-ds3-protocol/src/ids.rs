//! DualShock 3 USB identity, report IDs and control-request constants.
//!
//! The DualShock 3 does not stream input on its own after enumeration. The
//! host has to send a HID `SET_REPORT` for feature report `0xF4` carrying the
//! four magic bytes [`ENABLE_PAYLOAD`] before the interrupt endpoint starts
//! delivering input reports. Rumble and LED state are delivered through
//! `SET_REPORT` for output report `0x01` on the control endpoint, not the
//! interrupt OUT endpoint.

#![deny(static_mut_refs)]

/// Sony Interactive Entertainment USB vendor ID.
pub const SONY_VENDOR_ID: u16 = 0x054C;

/// Product IDs of Sony controllers the dispatch layer knows about.
pub mod product_ids {
    /// DualShock 3 / Sixaxis.
    pub const DUALSHOCK3: u16 = 0x0268;
    /// DualShock 4, first revision (CUH-ZCT1).
    pub const DUALSHOCK4_V1: u16 = 0x05C4;
    /// DualShock 4, second revision (CUH-ZCT2).
    pub const DUALSHOCK4_V2: u16 = 0x09CC;
}

/// Report IDs.
pub mod report_ids {
    /// Input report delivered on the interrupt IN endpoint.
    pub const INPUT: u8 = 0x01;
    /// Output report ID used by the host-facing (spoofed) HID descriptor.
    pub const HOST_OUTPUT: u8 = 0x01;
    /// Feature report that switches the controller into streaming mode.
    pub const ENABLE_FEATURE: u8 = 0xF4;
    /// Native output report carrying rumble and LED state.
    pub const NATIVE_OUTPUT: u8 = 0x01;
}

/// HID class request codes (HID 1.11, 7.2).
pub mod requests {
    pub const SET_REPORT: u8 = 0x09;
}

/// HID report types, placed in the high byte of `wValue`.
pub mod report_types {
    pub const OUTPUT: u8 = 0x02;
    pub const FEATURE: u8 = 0x03;
}

/// Interface number targeted by class requests.
pub const HID_INTERFACE: u16 = 0;

/// Payload of the "enable streaming" feature report.
pub const ENABLE_PAYLOAD: [u8; 4] = [0x42, 0x0C, 0x00, 0x00];

/// Compose a `SET_REPORT` `wValue` from report type and ID.
pub const fn report_value(report_type: u8, report_id: u8) -> u16 {
    ((report_type as u16) << 8) | report_id as u16
}

/// `wValue` of the enable command (`0x03F4`).
pub const ENABLE_REPORT_VALUE: u16 = report_value(report_types::FEATURE, report_ids::ENABLE_FEATURE);

/// `wValue` of the output-report command (`0x0201`).
pub const OUTPUT_REPORT_VALUE: u16 = report_value(report_types::OUTPUT, report_ids::NATIVE_OUTPUT);

/// Return `true` if the USB identity is a DualShock 3.
pub fn is_dualshock3(vendor_id: u16, product_id: u16) -> bool {
    vendor_id == SONY_VENDOR_ID && product_id == product_ids::DUALSHOCK3
}

/// Return `true` if the USB identity is any DualShock 4 revision.
pub fn is_dualshock4(vendor_id: u16, product_id: u16) -> bool {
    vendor_id == SONY_VENDOR_ID
        && matches!(
            product_id,
            product_ids::DUALSHOCK4_V1 | product_ids::DUALSHOCK4_V2
        )
}
