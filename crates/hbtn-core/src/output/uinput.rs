// Hbtn Pure Rust uinput Output Layer
// Virtual device creation and key event emission

use crate::action::Action;
use crate::key::Key;
use crate::keymap::KeymapTable;
use crate::platform::{EndpointError, InputBackend, InputDeviceConfig, InputEndpoint};
use evdev::{EventType, InputEvent};

/// Creates uinput virtual devices through /dev/uinput
#[derive(Debug, Default, Clone, Copy)]
pub struct UInputBackend;

impl UInputBackend {
    pub fn new() -> Self {
        Self
    }
}

impl InputBackend for UInputBackend {
    fn register(
        &self,
        config: &InputDeviceConfig,
        keymap: &KeymapTable,
    ) -> Result<Box<dyn InputEndpoint>, EndpointError> {
        Ok(Box::new(UInputEndpoint::new(config, keymap)?))
    }
}

/// Virtual uinput device advertising the keymap's keys
pub struct UInputEndpoint {
    device: evdev::uinput::VirtualDevice,
    pending: Vec<InputEvent>,
}

impl UInputEndpoint {
    /// Create a new virtual uinput device
    pub fn new(config: &InputDeviceConfig, keymap: &KeymapTable) -> Result<Self, EndpointError> {
        use evdev::uinput::VirtualDeviceBuilder;
        use evdev::{AttributeSet, BusType, InputId};

        let mut keys = AttributeSet::new();
        for key in keymap.keys() {
            keys.insert(evdev::Key::new(key.code()));
        }

        let id = InputId::new(
            BusType(config.bus_type),
            config.vendor,
            config.product,
            config.version,
        );

        let device = VirtualDeviceBuilder::new()
            .map_err(|e: std::io::Error| EndpointError::Creation(e.to_string()))?
            .name(&config.name)
            .input_id(id)
            .with_keys(&keys)
            .map_err(|e: std::io::Error| EndpointError::Creation(e.to_string()))?
            .build()
            .map_err(|e: std::io::Error| EndpointError::Creation(e.to_string()))?;

        // uinput assigns its own phys path
        log::debug!("Created uinput device '{}' for {}", config.name, config.phys);

        Ok(Self {
            device,
            pending: Vec::new(),
        })
    }
}

/// EV_KEY event for a key state change
fn key_event(key: Key, action: Action) -> InputEvent {
    InputEvent::new(EventType::KEY, key.code(), action.to_i32())
}

impl InputEndpoint for UInputEndpoint {
    fn report_key(&mut self, key: Key, pressed: bool) -> Result<(), EndpointError> {
        self.pending.push(key_event(key, Action::from_pressed(pressed)));
        Ok(())
    }

    fn sync(&mut self) -> Result<(), EndpointError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        // emit() terminates the batch with SYN_REPORT
        let result = self
            .device
            .emit(&self.pending)
            .map_err(|e: std::io::Error| EndpointError::Write(e.to_string()));
        self.pending.clear();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_virtual_device_creation() {
        // This test requires actual uinput access
        // It may fail in containerized environments
        let backend = UInputBackend::new();
        match backend.register(&InputDeviceConfig::default(), &KeymapTable::panasonic()) {
            Ok(mut endpoint) => {
                assert!(endpoint.sync().is_ok());
            }
            Err(e) => {
                assert!(matches!(e, EndpointError::Creation(_)));
            }
        }
    }

    #[test]
    fn test_key_event_values() {
        let press = key_event(Key::SCREENLOCK, Action::Press);
        assert_eq!(press.event_type(), EventType::KEY);
        assert_eq!(press.code(), 152);
        assert_eq!(press.value(), 1);

        let release = key_event(Key::ENTER, Action::Release);
        assert_eq!(release.event_type(), EventType::KEY);
        assert_eq!(release.code(), 28);
        assert_eq!(release.value(), 0);
    }

    #[test]
    fn test_key_event_is_not_a_sync_frame() {
        let event = key_event(Key::KEYBOARD, Action::Press);
        assert_ne!(event.event_type(), EventType::SYNCHRONIZATION);
    }
}
