// Hbtn ACPI Adapters
// Userspace access to firmware notifications and status queries

mod call;
mod event;

pub use call::{parse_call_reply, AcpiCallQuery, DEFAULT_CALL_PATH};
pub use event::{AcpiEvent, AcpiEventError, DEFAULT_EVENT_SOCKET};
