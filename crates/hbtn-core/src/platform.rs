// Hbtn Platform Collaborators
//
// Interfaces the host platform provides to the translator: the hardware
// status query, the input endpoint backend and the status broadcast sink.

use crate::driver::{ACPI_PCC_DRIVER_NAME, ACPI_PCC_INPUT_PHYS};
use crate::key::Key;
use crate::keymap::KeymapTable;

/// Opaque handle for the physical device, used to query its status.
///
/// For ACPI this is the device's namespace path (e.g. `\_SB_.HBTN`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HardwareHandle(pub String);

impl HardwareHandle {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &str {
        &self.0
    }
}

/// Error returned when the hardware status cannot be read
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Firmware method failed: {0}")]
    Method(String),

    #[error("Unparsable status reply: {0:?}")]
    BadReply(String),
}

/// Error reported by an input endpoint
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("Failed to create input endpoint: {0}")]
    Creation(String),

    #[error("Failed to write event: {0}")]
    Write(String),
}

/// Synchronous hardware status query
pub trait StatusQuery {
    fn query_status(&self, handle: &HardwareHandle) -> Result<u64, QueryError>;
}

/// Registration parameters for a virtual input endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDeviceConfig {
    pub name: String,
    pub phys: String,
    pub bus_type: u16,
    pub vendor: u16,
    pub product: u16,
    pub version: u16,
}

/// BUS_HOST from linux/input.h
pub const BUS_HOST: u16 = 0x19;

impl Default for InputDeviceConfig {
    fn default() -> Self {
        Self {
            name: ACPI_PCC_DRIVER_NAME.to_string(),
            phys: ACPI_PCC_INPUT_PHYS.to_string(),
            bus_type: BUS_HOST,
            vendor: 0x0001,
            product: 0x0001,
            version: 0x0100,
        }
    }
}

/// A registered input endpoint.
///
/// Dropping the endpoint unregisters it.
pub trait InputEndpoint {
    /// Queue a key state change
    fn report_key(&mut self, key: Key, pressed: bool) -> Result<(), EndpointError>;

    /// Flush queued events so consumers observe them
    fn sync(&mut self) -> Result<(), EndpointError>;
}

/// Creates input endpoints
pub trait InputBackend {
    fn register(
        &self,
        config: &InputDeviceConfig,
        keymap: &KeymapTable,
    ) -> Result<Box<dyn InputEndpoint>, EndpointError>;
}

/// Generic status broadcast side channel
pub trait StatusBroadcaster {
    fn broadcast_status(&self, device_class: &str, device_id: &str, notify_code: u32, payload: u64);
}

/// Broadcaster that writes each status to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogBroadcaster;

impl StatusBroadcaster for LogBroadcaster {
    fn broadcast_status(
        &self,
        device_class: &str,
        device_id: &str,
        notify_code: u32,
        payload: u64,
    ) {
        log::info!(
            "{} {} {:08x} {:08x}",
            device_class,
            device_id,
            notify_code,
            payload
        );
    }
}
