// Hbtn ACPI Event Parsing
// acpid socket lines: "<class> <bus_id> <type:hex8> <data:hex8>"

use std::fmt;
use std::str::FromStr;

/// Where acpid publishes events
pub const DEFAULT_EVENT_SOCKET: &str = "/var/run/acpid.socket";

/// A single notification as published by acpid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcpiEvent {
    pub device_class: String,
    pub bus_id: String,
    pub event_type: u32,
    pub data: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcpiEventError {
    #[error("Expected 4 fields in ACPI event, got {0}")]
    FieldCount(usize),

    #[error("Invalid hex field {0:?} in ACPI event")]
    BadHex(String),
}

impl AcpiEvent {
    /// True if this event was raised by the given bus instance
    pub fn is_for(&self, bus_id: &str) -> bool {
        self.bus_id == bus_id
    }
}

impl FromStr for AcpiEvent {
    type Err = AcpiEventError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 4 {
            return Err(AcpiEventError::FieldCount(fields.len()));
        }

        Ok(Self {
            device_class: fields[0].to_string(),
            bus_id: fields[1].to_string(),
            event_type: parse_hex(fields[2])?,
            data: parse_hex(fields[3])?,
        })
    }
}

impl fmt::Display for AcpiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {:08x} {:08x}",
            self.device_class, self.bus_id, self.event_type, self.data
        )
    }
}

fn parse_hex(field: &str) -> Result<u32, AcpiEventError> {
    let digits = field
        .strip_prefix("0x")
        .or_else(|| field.strip_prefix("0X"))
        .unwrap_or(field);
    u32::from_str_radix(digits, 16).map_err(|_| AcpiEventError::BadHex(field.to_string()))
}
