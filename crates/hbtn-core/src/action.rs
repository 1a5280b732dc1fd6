use std::fmt;

/// Represents the state change reported for a key.
///
/// The discriminants are the evdev values written to the input endpoint:
///   0 == 'released'
///   1 == 'pressed'
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Action {
    Release = 0,
    Press = 1,
}

impl Action {
    /// Build an Action from a pressed flag
    pub fn from_pressed(pressed: bool) -> Self {
        if pressed {
            Action::Press
        } else {
            Action::Release
        }
    }

    /// Convert Action to its i32 representation
    pub fn to_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Release => write!(f, "release"),
            Action::Press => write!(f, "press"),
        }
    }
}
