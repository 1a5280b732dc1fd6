// Hbtn Recording Output
// In-memory input backend for dry runs and tests

use crate::action::Action;
use crate::key::Key;
use crate::keymap::KeymapTable;
use crate::platform::{EndpointError, InputBackend, InputDeviceConfig, InputEndpoint};
use parking_lot::Mutex;
use std::sync::Arc;

/// A key event as observed after a sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedEvent {
    pub key: Key,
    pub action: Action,
}

#[derive(Debug, Default)]
struct RecorderState {
    registered: usize,
    events: Vec<RecordedEvent>,
    syncs: usize,
    last_config: Option<InputDeviceConfig>,
    advertised: Vec<Key>,
}

/// Backend that records synced key events instead of writing them anywhere.
///
/// Clones share the same log, so a clone kept aside can inspect what an
/// endpoint handed to the driver has emitted.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    state: Arc<Mutex<RecorderState>>,
    fail_register: bool,
    fail_writes: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose registrations always fail
    pub fn failing() -> Self {
        Self {
            fail_register: true,
            ..Self::default()
        }
    }

    /// A backend whose endpoints reject every write
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Number of endpoints currently registered
    pub fn registered_count(&self) -> usize {
        self.state.lock().registered
    }

    /// Synced events in emission order
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.state.lock().events.clone()
    }

    /// Remove and return all synced events
    pub fn drain(&self) -> Vec<RecordedEvent> {
        std::mem::take(&mut self.state.lock().events)
    }

    pub fn sync_count(&self) -> usize {
        self.state.lock().syncs
    }

    /// Config passed to the most recent registration
    pub fn last_config(&self) -> Option<InputDeviceConfig> {
        self.state.lock().last_config.clone()
    }

    /// Keys advertised by the most recent registration
    pub fn advertised_keys(&self) -> Vec<Key> {
        self.state.lock().advertised.clone()
    }
}

impl InputBackend for RecordingBackend {
    fn register(
        &self,
        config: &InputDeviceConfig,
        keymap: &KeymapTable,
    ) -> Result<Box<dyn InputEndpoint>, EndpointError> {
        if self.fail_register {
            return Err(EndpointError::Creation("registration refused".to_string()));
        }

        let mut state = self.state.lock();
        state.registered += 1;
        state.last_config = Some(config.clone());
        state.advertised = keymap.keys().collect();
        drop(state);

        Ok(Box::new(RecordingEndpoint {
            state: Arc::clone(&self.state),
            pending: Vec::new(),
            fail_writes: self.fail_writes,
        }))
    }
}

struct RecordingEndpoint {
    state: Arc<Mutex<RecorderState>>,
    pending: Vec<RecordedEvent>,
    fail_writes: bool,
}

impl InputEndpoint for RecordingEndpoint {
    fn report_key(&mut self, key: Key, pressed: bool) -> Result<(), EndpointError> {
        if self.fail_writes {
            return Err(EndpointError::Write("write refused".to_string()));
        }
        // The input core never delivers KEY_RESERVED
        if key.is_reserved() {
            return Ok(());
        }
        self.pending.push(RecordedEvent {
            key,
            action: Action::from_pressed(pressed),
        });
        Ok(())
    }

    fn sync(&mut self) -> Result<(), EndpointError> {
        let mut state = self.state.lock();
        state.syncs += 1;
        state.events.append(&mut self.pending);
        Ok(())
    }
}

impl Drop for RecordingEndpoint {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.registered = state.registered.saturating_sub(1);
    }
}
