// Hbtn Core Library
// Tablet button notification to key event translation

pub mod acpi;
pub mod action;
pub mod driver;
pub mod key;
pub mod keymap;
pub mod output;
pub mod platform;
pub mod status;

#[cfg(feature = "pure-rust")]
pub mod settings;

pub use acpi::{AcpiCallQuery, AcpiEvent, AcpiEventError};
pub use action::Action;
pub use driver::{
    AcpiDevice, AcpiDriverOps, AttachError, DeviceContext, DeviceIdentity, DriverError,
    NotifyOutcome, TabletButtonDriver, HBTN_NOTIFY,
};
pub use key::Key;
pub use keymap::{KeyEntry, KeymapError, KeymapTable, PANASONIC_KEYMAP};
pub use output::{RecordedEvent, RecordingBackend};
pub use platform::{
    EndpointError, HardwareHandle, InputBackend, InputDeviceConfig, InputEndpoint, LogBroadcaster,
    QueryError, StatusBroadcaster, StatusQuery,
};
pub use status::HardwareStatus;

#[cfg(feature = "pure-rust")]
pub use output::UInputBackend;
#[cfg(feature = "pure-rust")]
pub use settings::{Settings, SettingsError};
