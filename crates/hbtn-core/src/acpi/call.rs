// Hbtn acpi_call Status Query
// Evaluates the status method through the acpi_call kernel module

use crate::driver::METHOD_HBTN_QUERY;
use crate::platform::{HardwareHandle, QueryError, StatusQuery};
use std::path::{Path, PathBuf};

/// Control file exposed by the acpi_call module
pub const DEFAULT_CALL_PATH: &str = "/proc/acpi/call";

/// Queries the button status by evaluating `<handle>.HINF`
#[derive(Debug, Clone)]
pub struct AcpiCallQuery {
    call_path: PathBuf,
    method: String,
}

impl Default for AcpiCallQuery {
    fn default() -> Self {
        Self::new(DEFAULT_CALL_PATH)
    }
}

impl AcpiCallQuery {
    pub fn new<P: AsRef<Path>>(call_path: P) -> Self {
        Self {
            call_path: call_path.as_ref().to_path_buf(),
            method: METHOD_HBTN_QUERY.to_string(),
        }
    }

    /// Override the method name evaluated under the device handle
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Full namespace path of the evaluated method
    pub fn method_path(&self, handle: &HardwareHandle) -> String {
        format!("{}.{}", handle.path(), self.method)
    }
}

impl StatusQuery for AcpiCallQuery {
    fn query_status(&self, handle: &HardwareHandle) -> Result<u64, QueryError> {
        std::fs::write(&self.call_path, self.method_path(handle))?;
        let reply = std::fs::read_to_string(&self.call_path)?;
        parse_call_reply(&reply)
    }
}

/// Parse an acpi_call reply such as `0x5`.
pub fn parse_call_reply(reply: &str) -> Result<u64, QueryError> {
    let reply = reply.trim_end_matches('\0').trim();
    if let Some(msg) = reply.strip_prefix("Error:") {
        return Err(QueryError::Method(msg.trim().to_string()));
    }

    let parsed = match reply.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => reply.parse::<u64>(),
    };
    parsed.map_err(|_| QueryError::BadReply(reply.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_reply() {
        assert_eq!(parse_call_reply("0x5").unwrap(), 5);
        assert_eq!(parse_call_reply("0xa\0\0\0").unwrap(), 0xA);
        assert_eq!(parse_call_reply("0x4\n").unwrap(), 4);
    }

    #[test]
    fn test_parse_decimal_reply() {
        assert_eq!(parse_call_reply("9").unwrap(), 9);
    }

    #[test]
    fn test_parse_error_reply() {
        match parse_call_reply("Error: AE_NOT_FOUND") {
            Err(QueryError::Method(msg)) => assert_eq!(msg, "AE_NOT_FOUND"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_unexpected_reply() {
        assert!(matches!(
            parse_call_reply("not called"),
            Err(QueryError::BadReply(_))
        ));
        assert!(matches!(
            parse_call_reply("{0x01, 0x02}"),
            Err(QueryError::BadReply(_))
        ));
    }

    #[test]
    fn test_method_path() {
        let query = AcpiCallQuery::default();
        let handle = HardwareHandle::new("\\_SB_.HBTN");
        assert_eq!(query.method_path(&handle), "\\_SB_.HBTN.HINF");

        let query = AcpiCallQuery::new("/tmp/call").with_method("HIN2");
        assert_eq!(query.method_path(&handle), "\\_SB_.HBTN.HIN2");
    }

    #[test]
    fn test_query_against_plain_file() {
        // A regular file echoes back what was written, which is not a status
        let dir = std::env::temp_dir().join(format!("hbtn-call-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("call");

        let query = AcpiCallQuery::new(&path);
        let result = query.query_status(&HardwareHandle::new("\\_SB_.HBTN"));
        assert!(matches!(result, Err(QueryError::BadReply(_))));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_query_missing_call_path() {
        let query = AcpiCallQuery::new("/nonexistent/hbtn/acpi/call");
        let result = query.query_status(&HardwareHandle::new("\\_SB_.HBTN"));
        assert!(matches!(result, Err(QueryError::Io(_))));
    }
}
