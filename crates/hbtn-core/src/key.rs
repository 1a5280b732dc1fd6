// Hbtn Key Type
// Represents a single key code from Linux input-event-codes.h

use std::fmt;
use std::str::FromStr;

include!(concat!(env!("OUT_DIR"), "/key_codes.rs"));

/// Name/code pairs accepted in configuration files.
///
/// Aliases resolve to the same code; the first entry for a code is the
/// display name.
const KEY_NAMES: &[(&str, u16)] = &[
    ("RESERVED", 0),
    ("ESC", 1),
    ("ESCAPE", 1),
    ("BACKSPACE", 14),
    ("TAB", 15),
    ("ENTER", 28),
    ("SPACE", 57),
    ("F1", 59),
    ("F2", 60),
    ("F3", 61),
    ("F4", 62),
    ("F5", 63),
    ("F6", 64),
    ("F7", 65),
    ("F8", 66),
    ("F9", 67),
    ("F10", 68),
    ("F11", 87),
    ("F12", 88),
    ("HOME", 102),
    ("UP", 103),
    ("PAGE_UP", 104),
    ("LEFT", 105),
    ("RIGHT", 106),
    ("END", 107),
    ("DOWN", 108),
    ("PAGE_DOWN", 109),
    ("MUTE", 113),
    ("VOLUMEDOWN", 114),
    ("VOLUMEUP", 115),
    ("POWER", 116),
    ("MENU", 139),
    ("SLEEP", 142),
    ("SCREENLOCK", 152),
    ("COFFEE", 152),
    ("DIRECTION", 153),
    ("ROTATE_DISPLAY", 153),
    ("BRIGHTNESSDOWN", 224),
    ("BRIGHTNESSUP", 225),
    ("SWITCHVIDEOMODE", 227),
    ("KEYBOARD", 0x176),
    ("PROG1", 148),
    ("PROG2", 149),
    ("PROG3", 202),
    ("PROG4", 203),
];

/// Display name for a key code
pub fn key_name(code: u16) -> &'static str {
    KEY_NAMES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(name, _)| *name)
        .unwrap_or("UNKNOWN")
}

/// Try to parse a key name to a key code.
///
/// Accepts an optional `KEY_` prefix and is case-insensitive.
pub fn key_from_name(name: &str) -> Option<Key> {
    let name_upper = name.trim().to_uppercase();
    let bare = name_upper.strip_prefix("KEY_").unwrap_or(&name_upper);
    KEY_NAMES
        .iter()
        .find(|(n, _)| *n == bare)
        .map(|(_, code)| Key::from(*code))
}
