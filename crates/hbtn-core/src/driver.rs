// Hbtn Tablet Button Driver
// Attach/detach lifecycle and notification translation

use crate::action::Action;
use crate::key::Key;
use crate::keymap::KeymapTable;
use crate::platform::{
    EndpointError, HardwareHandle, InputBackend, InputDeviceConfig, InputEndpoint, LogBroadcaster,
    StatusBroadcaster, StatusQuery,
};
use crate::status::HardwareStatus;

/// Notify value the firmware sends when a button changes state
pub const HBTN_NOTIFY: u32 = 0x80;

/// Firmware method that returns the button status
pub const METHOD_HBTN_QUERY: &str = "HINF";

pub const ACPI_PCC_DRIVER_NAME: &str = "Panasonic Tablet Button Support";
pub const ACPI_PCC_DEVICE_NAME: &str = "TabletButton";
pub const ACPI_PCC_CLASS: &str = "pcc";
pub const ACPI_PCC_INPUT_PHYS: &str = "panasonic/hbtn0";

/// Name and class stamped onto every attached device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub class: String,
    pub name: String,
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self {
            class: ACPI_PCC_CLASS.to_string(),
            name: ACPI_PCC_DEVICE_NAME.to_string(),
        }
    }
}

/// A physical device handed over by the bus layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcpiDevice {
    /// Namespace handle used for status queries
    pub handle: HardwareHandle,
    /// Bus instance name (e.g. `MAT0020:00`)
    pub bus_id: String,
}

impl AcpiDevice {
    pub fn new(handle: HardwareHandle, bus_id: impl Into<String>) -> Self {
        Self {
            handle,
            bus_id: bus_id.into(),
        }
    }
}

/// Per-device state.
///
/// Owns the registered input endpoint. The endpoint is released on
/// detach, or when the context is dropped while still attached.
pub struct DeviceContext {
    device: AcpiDevice,
    identity: DeviceIdentity,
    input: Option<Box<dyn InputEndpoint>>,
}

impl DeviceContext {
    pub fn device(&self) -> &AcpiDevice {
        &self.device
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub fn is_attached(&self) -> bool {
        self.input.is_some()
    }
}

impl std::fmt::Debug for DeviceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceContext")
            .field("device", &self.device)
            .field("identity", &self.identity)
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl Drop for DeviceContext {
    fn drop(&mut self) {
        if self.input.take().is_some() {
            log::debug!("Releasing input endpoint for {}", self.device.bus_id);
        }
    }
}

/// Errors that abort an attach attempt
#[derive(Debug, thiserror::Error)]
pub enum AttachError {
    #[error("Couldn't allocate input device for hbtn: {0}")]
    Alloc(#[from] EndpointError),
}

/// Errors surfaced by the driver callbacks
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("Invalid usage: {0}")]
    InvalidUsage(&'static str),

    #[error(transparent)]
    Attach(#[from] AttachError),
}

/// What happened to a single notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// Event code not handled by this driver
    Ignored,
    /// Context has already been detached
    Detached,
    /// Status query failed; event dropped
    QueryFailed,
    /// Decoded scancode has no keymap entry
    UnknownScancode(u64),
    /// Key event written and synced
    Reported { key: Key, action: Action },
    /// Endpoint rejected the write
    ReportFailed,
}

/// Callback interface the platform's device layer drives
pub trait AcpiDriverOps {
    type Context;

    /// Called when a matching device appears
    fn add(&self, device: Option<AcpiDevice>) -> Result<Self::Context, DriverError>;

    /// Called when the device goes away
    fn remove(&self, context: &mut Self::Context) -> Result<(), DriverError>;

    /// Called for every firmware notification on the device
    fn notify(&self, context: &mut Self::Context, event: u32);
}

/// Translates tablet button notifications into key events
pub struct TabletButtonDriver {
    query: Box<dyn StatusQuery>,
    backend: Box<dyn InputBackend>,
    broadcaster: Box<dyn StatusBroadcaster>,
    keymap: KeymapTable,
    input_config: InputDeviceConfig,
    identity: DeviceIdentity,
    notify_code: u32,
}

impl TabletButtonDriver {
    /// Create a driver with the stock keymap and identity
    pub fn new(query: Box<dyn StatusQuery>, backend: Box<dyn InputBackend>) -> Self {
        Self {
            query,
            backend,
            broadcaster: Box::new(LogBroadcaster),
            keymap: KeymapTable::panasonic(),
            input_config: InputDeviceConfig::default(),
            identity: DeviceIdentity::default(),
            notify_code: HBTN_NOTIFY,
        }
    }

    pub fn with_broadcaster(mut self, broadcaster: Box<dyn StatusBroadcaster>) -> Self {
        self.broadcaster = broadcaster;
        self
    }

    pub fn with_keymap(mut self, keymap: KeymapTable) -> Self {
        self.keymap = keymap;
        self
    }

    pub fn with_input_config(mut self, config: InputDeviceConfig) -> Self {
        self.input_config = config;
        self
    }

    pub fn with_identity(mut self, identity: DeviceIdentity) -> Self {
        self.identity = identity;
        self
    }

    pub fn with_notify_code(mut self, code: u32) -> Self {
        self.notify_code = code;
        self
    }

    pub fn keymap(&self) -> &KeymapTable {
        &self.keymap
    }

    pub fn notify_code(&self) -> u32 {
        self.notify_code
    }

    /// Register an input endpoint for the device and build its context.
    ///
    /// Nothing stays registered if this fails.
    pub fn attach(&self, device: AcpiDevice) -> Result<DeviceContext, AttachError> {
        let input = self
            .backend
            .register(&self.input_config, &self.keymap)
            .map_err(|e| {
                log::error!("Error installing keyinput handler: {}", e);
                AttachError::Alloc(e)
            })?;

        log::debug!(
            "Attached {} ({}) with {} keymap entries",
            device.bus_id,
            device.handle.path(),
            self.keymap.len()
        );

        Ok(DeviceContext {
            device,
            identity: self.identity.clone(),
            input: Some(input),
        })
    }

    /// Unregister the device's input endpoint.
    ///
    /// Detaching twice is a usage error and leaves the context untouched.
    pub fn detach(&self, context: &mut DeviceContext) -> Result<(), DriverError> {
        match context.input.take() {
            Some(input) => {
                drop(input);
                log::debug!("Detached {}", context.device.bus_id);
                Ok(())
            }
            None => {
                log::warn!("Detach called on detached device {}", context.device.bus_id);
                Err(DriverError::InvalidUsage("device is not attached"))
            }
        }
    }

    /// Handle one firmware notification.
    ///
    /// Never fails: every per-event problem is logged and reflected in the
    /// returned outcome only.
    pub fn handle_notify(&self, context: &mut DeviceContext, event: u32) -> NotifyOutcome {
        if event != self.notify_code {
            return NotifyOutcome::Ignored;
        }

        let Some(input) = context.input.as_mut() else {
            log::warn!("Notify {:#x} on detached device {}", event, context.device.bus_id);
            return NotifyOutcome::Detached;
        };

        let raw = match self.query.query_status(&context.device.handle) {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("error getting hbtn status: {}", e);
                return NotifyOutcome::QueryFailed;
            }
        };

        self.broadcaster.broadcast_status(
            &context.identity.class,
            &context.device.bus_id,
            event,
            raw,
        );

        let status = HardwareStatus::decode(raw);
        let Some(entry) = self.keymap.lookup(status.scancode) else {
            log::warn!("Unknown hbtn event: {}", raw);
            return NotifyOutcome::UnknownScancode(status.scancode);
        };

        let action = status.action();
        let written = input
            .report_key(entry.key, status.pressed)
            .and_then(|_| input.sync());
        if let Err(e) = written {
            log::error!("Failed to report {} {}: {}", entry.key, action, e);
            return NotifyOutcome::ReportFailed;
        }

        log::debug!("hbtn status {:#x} -> {} {}", raw, entry.key, action);
        NotifyOutcome::Reported {
            key: entry.key,
            action,
        }
    }
}

impl AcpiDriverOps for TabletButtonDriver {
    type Context = DeviceContext;

    fn add(&self, device: Option<AcpiDevice>) -> Result<DeviceContext, DriverError> {
        let device = device.ok_or(DriverError::InvalidUsage("no device"))?;
        Ok(self.attach(device)?)
    }

    fn remove(&self, context: &mut DeviceContext) -> Result<(), DriverError> {
        self.detach(context)
    }

    fn notify(&self, context: &mut DeviceContext, event: u32) {
        self.handle_notify(context, event);
    }
}
