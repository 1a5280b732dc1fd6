// Hbtn Output Layer
// Input endpoint backends for reporting translated key events

mod recorder;

#[cfg(feature = "pure-rust")]
mod uinput;

pub use recorder::{RecordedEvent, RecordingBackend};

#[cfg(feature = "pure-rust")]
pub use uinput::{UInputBackend, UInputEndpoint};
