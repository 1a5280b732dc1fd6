// Hbtn Hardware Status
// Decoding of the integer returned by the HINF query

use crate::action::Action;

/// Bits 1-3 of the status carry the button scancode.
pub const SCANCODE_MASK: u64 = 0xE;

/// Bit 0 carries the button state. A cleared bit means pressed.
pub const STATE_BIT: u64 = 0x1;

/// A decoded hardware status value.
///
/// Only lives for the duration of one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareStatus {
    /// Raw value as returned by the firmware
    pub raw: u64,
    /// `raw & 0xE`
    pub scancode: u64,
    /// `(raw & 0x1) == 0`
    pub pressed: bool,
}

impl HardwareStatus {
    /// Decode a raw status value.
    ///
    /// The firmware reports the state bit inverted: 0 is pressed and 1 is
    /// released. Consumers rely on that polarity, so it is kept as is.
    pub fn decode(raw: u64) -> Self {
        Self {
            raw,
            scancode: raw & SCANCODE_MASK,
            pressed: raw & STATE_BIT == 0,
        }
    }

    /// The key action implied by the state bit
    pub fn action(&self) -> Action {
        Action::from_pressed(self.pressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_press() {
        let status = HardwareStatus::decode(0x4);
        assert_eq!(status.scancode, 0x4);
        assert!(status.pressed);
        assert_eq!(status.action(), Action::Press);
    }

    #[test]
    fn test_decode_release() {
        let status = HardwareStatus::decode(0x9);
        assert_eq!(status.scancode, 0x8);
        assert!(!status.pressed);
        assert_eq!(status.action(), Action::Release);
    }

    #[test]
    fn test_decode_ignores_high_bits() {
        let status = HardwareStatus::decode(0xFFFF_FFF4);
        assert_eq!(status.scancode, 0x4);
        assert!(status.pressed);
        assert_eq!(status.raw, 0xFFFF_FFF4);
    }

    #[test]
    fn test_decode_properties_hold_for_range() {
        let samples = (0u64..0x200).chain([u64::MAX, u64::MAX - 1, 1 << 63]);
        for raw in samples {
            let status = HardwareStatus::decode(raw);
            assert_eq!(status.pressed, raw & 1 == 0, "raw={:#x}", raw);
            assert_eq!(status.scancode, raw & 0xE, "raw={:#x}", raw);
        }
    }
}
