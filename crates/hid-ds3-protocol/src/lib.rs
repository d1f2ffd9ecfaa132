//! DualShock 3 USB protocol: input translation, output layout, and the canned
//! descriptors presented to the host.
//!
//! This crate is intentionally I/O-free and allocation-free. It provides pure
//! functions and types that can be tested and fuzzed without hardware, a USB
//! stack, or a virtual-controller bus.
//!
//! ## Data path
//!
//! - **Input**: [`translate_input_report`] turns the controller's raw 49-byte
//!   interrupt report into the 20-byte canonical layout described by
//!   [`HID_REPORT_DESCRIPTOR`], and derives the XUSB button mask for the
//!   virtual controller.
//! - **Output**: [`NativeOutputReport`] holds the 48-byte buffer sent with
//!   `SET_REPORT(Output, 0x01)`; [`NativeOutputReport::apply_host_report`]
//!   copies the rumble block of a host output report into it.
//! - **Enable**: the controller only starts streaming after
//!   `SET_REPORT(Feature, 0xF4)` with [`ENABLE_PAYLOAD`].

#![deny(static_mut_refs)]

pub mod descriptors;
pub mod error;
pub mod ids;
pub mod input;
pub mod output;
pub mod types;

pub use descriptors::{
    CONFIGURATION_DESCRIPTOR, CONFIGURATION_DESCRIPTOR_LEN, CONFIGURATION_HEADER_LEN,
    HID_REPORT_DESCRIPTOR, HID_REPORT_DESCRIPTOR_LEN, SPOOFED_DS3_IDENTITY, UsbIdentity,
    configuration_header,
};
pub use error::Ds3ProtocolError;
pub use ids::{
    ENABLE_PAYLOAD, ENABLE_REPORT_VALUE, HID_INTERFACE, OUTPUT_REPORT_VALUE, SONY_VENDOR_ID,
    is_dualshock3, is_dualshock4, product_ids, report_ids, report_types, requests,
};
pub use input::{
    CANONICAL_PAYLOAD_LEN, CANONICAL_REPORT_LEN, CanonicalGamepadState, InputTranslation,
    MIN_INPUT_REPORT_LEN, RAW_INPUT_REPORT_LEN, translate_input_report,
};
pub use output::{
    HOST_OUTPUT_REPORT_MIN_LEN, NATIVE_OUTPUT_REPORT_LEN, NATIVE_OUTPUT_TEMPLATE,
    NativeOutputReport, Rumble, leds, player_led_mask,
};
pub use types::{HatDirection, XUSB_BUTTON_MAP, buttons};
