//! Canonical button bits and d-pad hat encoding.

#![deny(static_mut_refs)]

use dsbridge_xusb::buttons as xusb;

/// Canonical button bits, as stored in [`crate::CanonicalGamepadState::buttons`].
///
/// The low nibble of the 16-bit field holds the hat code, not buttons. The
/// value is the little-endian reading of canonical report bytes 5 and 6.
pub mod buttons {
    pub const TRIANGLE: u16 = 0x0010;
    pub const CIRCLE: u16 = 0x0020;
    pub const CROSS: u16 = 0x0040;
    pub const SQUARE: u16 = 0x0080;
    pub const SELECT: u16 = 0x0100;
    pub const LEFT_THUMB: u16 = 0x0200;
    pub const RIGHT_THUMB: u16 = 0x0400;
    pub const START: u16 = 0x0800;
    pub const LEFT_TRIGGER: u16 = 0x1000;
    pub const RIGHT_TRIGGER: u16 = 0x2000;
    pub const LEFT_SHOULDER: u16 = 0x4000;
    pub const RIGHT_SHOULDER: u16 = 0x8000;

    /// Hat code bits.
    pub const HAT_MASK: u16 = 0x000F;
}

/// Canonical-to-XUSB button mapping.
///
/// Triggers are analog on XUSB and have no button bit; the PS button is not
/// forwarded.
pub const XUSB_BUTTON_MAP: [(u16, u16); 10] = [
    (buttons::SELECT, xusb::BACK),
    (buttons::LEFT_THUMB, xusb::LEFT_THUMB),
    (buttons::RIGHT_THUMB, xusb::RIGHT_THUMB),
    (buttons::START, xusb::START),
    (buttons::LEFT_SHOULDER, xusb::LEFT_SHOULDER),
    (buttons::RIGHT_SHOULDER, xusb::RIGHT_SHOULDER),
    (buttons::TRIANGLE, xusb::Y),
    (buttons::CIRCLE, xusb::B),
    (buttons::CROSS, xusb::A),
    (buttons::SQUARE, xusb::X),
];

/// D-pad bits in the upper nibble of raw status byte 2.
pub mod dpad_bits {
    pub const UP: u8 = 0x10;
    pub const RIGHT: u8 = 0x20;
    pub const DOWN: u8 = 0x40;
    pub const LEFT: u8 = 0x80;
}

/// Hat switch direction.
///
/// Discriminants are the 4-bit hat codes of the canonical report; `8` is the
/// HID null state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HatDirection {
    North = 0,
    NorthEast = 1,
    East = 2,
    SouthEast = 3,
    South = 4,
    SouthWest = 5,
    West = 6,
    NorthWest = 7,
    Released = 8,
}

impl HatDirection {
    /// All nine states, in hat-code order.
    pub const ALL: [HatDirection; 9] = [
        HatDirection::North,
        HatDirection::NorthEast,
        HatDirection::East,
        HatDirection::SouthEast,
        HatDirection::South,
        HatDirection::SouthWest,
        HatDirection::West,
        HatDirection::NorthWest,
        HatDirection::Released,
    ];

    /// Decode the d-pad from a raw status byte.
    ///
    /// Only the upper nibble is inspected. Combinations that are not one of
    /// the eight compass directions (nothing pressed, opposite directions,
    /// three bits) decode as [`HatDirection::Released`].
    pub fn from_dpad_bits(status: u8) -> Self {
        match status & 0xF0 {
            0x10 => HatDirection::North,
            0x30 => HatDirection::NorthEast,
            0x20 => HatDirection::East,
            0x60 => HatDirection::SouthEast,
            0x40 => HatDirection::South,
            0xC0 => HatDirection::SouthWest,
            0x80 => HatDirection::West,
            0x90 => HatDirection::NorthWest,
            _ => HatDirection::Released,
        }
    }

    /// Decode a canonical hat code. Codes above 8 decode as released.
    pub fn from_code(code: u8) -> Self {
        Self::ALL
            .get(usize::from(code))
            .copied()
            .unwrap_or(HatDirection::Released)
    }

    /// 4-bit canonical hat code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Raw d-pad bits that encode this direction (0 for released).
    pub fn dpad_bits(self) -> u8 {
        use self::dpad_bits::{DOWN, LEFT, RIGHT, UP};
        match self {
            HatDirection::North => UP,
            HatDirection::NorthEast => UP | RIGHT,
            HatDirection::East => RIGHT,
            HatDirection::SouthEast => DOWN | RIGHT,
            HatDirection::South => DOWN,
            HatDirection::SouthWest => DOWN | LEFT,
            HatDirection::West => LEFT,
            HatDirection::NorthWest => UP | LEFT,
            HatDirection::Released => 0,
        }
    }

    /// XUSB d-pad flags for this direction. Diagonals set two flags.
    pub fn xusb_dpad(self) -> u16 {
        match self {
            HatDirection::North => xusb::DPAD_UP,
            HatDirection::NorthEast => xusb::DPAD_UP | xusb::DPAD_RIGHT,
            HatDirection::East => xusb::DPAD_RIGHT,
            HatDirection::SouthEast => xusb::DPAD_DOWN | xusb::DPAD_RIGHT,
            HatDirection::South => xusb::DPAD_DOWN,
            HatDirection::SouthWest => xusb::DPAD_DOWN | xusb::DPAD_LEFT,
            HatDirection::West => xusb::DPAD_LEFT,
            HatDirection::NorthWest => xusb::DPAD_UP | xusb::DPAD_LEFT,
            HatDirection::Released => 0,
        }
    }
}
