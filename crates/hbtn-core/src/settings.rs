// Hbtn Settings Module
// Loads the driver harness configuration from TOML

#![cfg(feature = "pure-rust")]

use crate::acpi::{DEFAULT_CALL_PATH, DEFAULT_EVENT_SOCKET};
use crate::driver::{AcpiDevice, DeviceIdentity, HBTN_NOTIFY, METHOD_HBTN_QUERY};
use crate::key::key_from_name;
use crate::keymap::{KeyEntry, KeymapError, KeymapTable};
use crate::platform::{HardwareHandle, InputDeviceConfig};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default namespace path of the tablet button device
pub const DEFAULT_DEVICE_HANDLE: &str = "\\_SB_.HBTN";

/// Default bus instance name of the tablet button device
pub const DEFAULT_BUS_ID: &str = "MAT0020:00";

/// Settings for the tablet button harness
///
/// Loaded from a TOML file (default: ~/.config/pcc-hbtn/settings.toml):
///
/// ```toml
/// [device]
/// handle = "\\_SB_.HBTN"
/// bus_id = "MAT0020:00"
///
/// [acpi]
/// notify_code = 0x80
///
/// [keymap]
/// "0xC" = "POWER"
/// ```
#[derive(Debug, Clone)]
pub struct Settings {
    identity: DeviceIdentity,
    device: AcpiDevice,
    input: InputDeviceConfig,
    method: String,
    call_path: PathBuf,
    socket: PathBuf,
    notify_code: u32,
    keymap: KeymapTable,

    /// Path to the settings file (for reload)
    source_path: Option<PathBuf>,
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid setting value: {0}")]
    InvalidValue(String),

    #[error("Invalid keymap: {0}")]
    Keymap(#[from] KeymapError),
}

/// TOML representation for deserializing settings
#[derive(Debug, Clone, serde::Deserialize, Default)]
struct SettingsToml {
    #[serde(default)]
    device: Option<DeviceSettings>,

    #[serde(default)]
    input: Option<InputSettings>,

    #[serde(default)]
    acpi: Option<AcpiSettings>,

    #[serde(default)]
    keymap: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
struct DeviceSettings {
    #[serde(default)]
    class: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    handle: Option<String>,
    #[serde(default)]
    bus_id: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
struct InputSettings {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    phys: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize, Default)]
struct AcpiSettings {
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    call_path: Option<PathBuf>,
    #[serde(default)]
    socket: Option<PathBuf>,
    #[serde(default)]
    notify_code: Option<i64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl Settings {
    /// Create settings with the stock Panasonic values
    pub fn new() -> Self {
        Self {
            identity: DeviceIdentity::default(),
            device: AcpiDevice::new(HardwareHandle::new(DEFAULT_DEVICE_HANDLE), DEFAULT_BUS_ID),
            input: InputDeviceConfig::default(),
            method: METHOD_HBTN_QUERY.to_string(),
            call_path: PathBuf::from(DEFAULT_CALL_PATH),
            socket: PathBuf::from(DEFAULT_EVENT_SOCKET),
            notify_code: HBTN_NOTIFY,
            keymap: KeymapTable::panasonic(),
            source_path: None,
        }
    }

    /// Load settings from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(&path)?;
        let mut settings = Self::from_toml(&content)?;
        settings.source_path = Some(path.as_ref().to_path_buf());
        Ok(settings)
    }

    /// Load settings from TOML string
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let toml_settings: SettingsToml =
            toml::from_str(content).map_err(|e| SettingsError::TomlParse(e.to_string()))?;

        let mut settings = Self::new();

        if let Some(device) = toml_settings.device {
            if let Some(class) = device.class {
                settings.identity.class = class;
            }
            if let Some(name) = device.name {
                settings.identity.name = name;
            }
            if let Some(handle) = device.handle {
                settings.device.handle = HardwareHandle::new(handle);
            }
            if let Some(bus_id) = device.bus_id {
                settings.device.bus_id = bus_id;
            }
        }

        if let Some(input) = toml_settings.input {
            if let Some(name) = input.name {
                settings.input.name = name;
            }
            if let Some(phys) = input.phys {
                settings.input.phys = phys;
            }
        }

        if let Some(acpi) = toml_settings.acpi {
            if let Some(method) = acpi.method {
                settings.method = method;
            }
            if let Some(call_path) = acpi.call_path {
                settings.call_path = call_path;
            }
            if let Some(socket) = acpi.socket {
                settings.socket = socket;
            }
            if let Some(code) = acpi.notify_code {
                settings.notify_code = u32::try_from(code).map_err(|_| {
                    SettingsError::InvalidValue(format!("notify_code out of range: {}", code))
                })?;
            }
        }

        if let Some(keymap) = toml_settings.keymap {
            let overrides = keymap
                .iter()
                .map(|(scancode, key)| parse_keymap_entry(scancode, key))
                .collect::<Result<Vec<_>, _>>()?;
            settings.keymap = settings.keymap.with_overrides(overrides)?;
        }

        Ok(settings)
    }

    /// Get the default settings path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("pcc-hbtn").join("settings.toml"))
    }

    /// Load from default location (~/.config/pcc-hbtn/settings.toml)
    pub fn load_default() -> Result<Self, SettingsError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::from_file(path);
            }
        }
        // Return default settings if file doesn't exist
        Ok(Self::new())
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub fn device(&self) -> &AcpiDevice {
        &self.device
    }

    pub fn input(&self) -> &InputDeviceConfig {
        &self.input
    }

    /// Status method evaluated under the device handle
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn call_path(&self) -> &Path {
        &self.call_path
    }

    pub fn socket(&self) -> &Path {
        &self.socket
    }

    pub fn notify_code(&self) -> u32 {
        self.notify_code
    }

    pub fn keymap(&self) -> &KeymapTable {
        &self.keymap
    }

    /// Override the acpi_call control file
    pub fn set_call_path(&mut self, path: PathBuf) {
        self.call_path = path;
    }

    /// Override the acpid socket path
    pub fn set_socket(&mut self, path: PathBuf) {
        self.socket = path;
    }

    /// Override the status method
    pub fn set_method(&mut self, method: String) {
        self.method = method;
    }

    /// Get the source path (if loaded from file)
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Reload settings from the source file
    pub fn reload(&mut self) -> Result<(), SettingsError> {
        if let Some(path) = self.source_path.clone() {
            *self = Self::from_file(path)?;
        }
        Ok(())
    }
}

fn parse_keymap_entry(scancode: &str, key: &str) -> Result<KeyEntry, SettingsError> {
    let trimmed = scancode.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => trimmed.parse::<u64>(),
    }
    .map_err(|_| SettingsError::InvalidValue(format!("Invalid scancode: {}", scancode)))?;

    let key = key_from_name(key)
        .ok_or_else(|| SettingsError::InvalidValue(format!("Unknown key: {}", key)))?;

    Ok(KeyEntry::new(parsed, key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;

    #[test]
    fn test_default_settings() {
        let settings = Settings::new();
        assert_eq!(settings.identity().class, "pcc");
        assert_eq!(settings.identity().name, "TabletButton");
        assert_eq!(settings.device().bus_id, "MAT0020:00");
        assert_eq!(settings.method(), "HINF");
        assert_eq!(settings.call_path(), Path::new("/proc/acpi/call"));
        assert_eq!(settings.socket(), Path::new("/var/run/acpid.socket"));
        assert_eq!(settings.notify_code(), 0x80);
        assert_eq!(settings.keymap(), &KeymapTable::panasonic());
    }

    #[test]
    fn test_parse_full_settings() {
        let toml = r#"
            [device]
            class = "pcc"
            name = "TabletButton"
            handle = "\\_SB_.PCI0.LPCB.HBTN"
            bus_id = "MAT001F:00"

            [input]
            name = "CF-19 Tablet Buttons"
            phys = "panasonic/hbtn1"

            [acpi]
            method = "HIN2"
            call_path = "/tmp/acpi_call"
            socket = "/tmp/acpid.socket"
            notify_code = 0x81
        "#;

        let settings = Settings::from_toml(toml).unwrap();
        assert_eq!(settings.device().handle.path(), "\\_SB_.PCI0.LPCB.HBTN");
        assert_eq!(settings.device().bus_id, "MAT001F:00");
        assert_eq!(settings.input().name, "CF-19 Tablet Buttons");
        assert_eq!(settings.input().phys, "panasonic/hbtn1");
        assert_eq!(settings.input().vendor, 0x0001);
        assert_eq!(settings.method(), "HIN2");
        assert_eq!(settings.call_path(), Path::new("/tmp/acpi_call"));
        assert_eq!(settings.socket(), Path::new("/tmp/acpid.socket"));
        assert_eq!(settings.notify_code(), 0x81);
    }

    #[test]
    fn test_keymap_overrides() {
        let toml = r#"
            [keymap]
            "0x8" = "SPACE"
            "0xC" = "KEY_POWER"
            "14" = "menu"
        "#;

        let settings = Settings::from_toml(toml).unwrap();
        let keymap = settings.keymap();
        assert_eq!(keymap.lookup(0x8).map(|e| e.key), Some(Key::from(57)));
        assert_eq!(keymap.lookup(0xC).map(|e| e.key), Some(Key::from(116)));
        assert_eq!(keymap.lookup(0xE).map(|e| e.key), Some(Key::from(139)));
        assert_eq!(keymap.lookup(0x4).map(|e| e.key), Some(Key::SCREENLOCK));
        assert_eq!(keymap.len(), 7);
    }

    #[test]
    fn test_keymap_rejects_unknown_key() {
        let err = Settings::from_toml("[keymap]\n\"0xC\" = \"NOT_A_KEY\"\n").unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue(_)));
    }

    #[test]
    fn test_keymap_rejects_bad_scancode() {
        let err = Settings::from_toml("[keymap]\n\"zz\" = \"ENTER\"\n").unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue(_)));

        let err = Settings::from_toml("[keymap]\n\"0x5\" = \"ENTER\"\n").unwrap_err();
        assert!(matches!(
            err,
            SettingsError::Keymap(KeymapError::ScancodeOutOfRange(0x5))
        ));
    }

    #[test]
    fn test_notify_code_out_of_range() {
        let err = Settings::from_toml("[acpi]\nnotify_code = -1\n").unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue(_)));
    }

    #[test]
    fn test_invalid_toml() {
        let err = Settings::from_toml("[device\n").unwrap_err();
        assert!(matches!(err, SettingsError::TomlParse(_)));
    }

    #[test]
    fn test_from_file_records_source() {
        let dir = std::env::temp_dir().join(format!("hbtn-settings-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        std::fs::write(&path, "[acpi]\nnotify_code = 0x82\n").unwrap();

        let mut settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.notify_code(), 0x82);
        assert_eq!(settings.source_path(), Some(path.as_path()));

        std::fs::write(&path, "[acpi]\nnotify_code = 0x83\n").unwrap();
        settings.reload().unwrap();
        assert_eq!(settings.notify_code(), 0x83);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
