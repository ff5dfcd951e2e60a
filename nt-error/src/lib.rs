//! Unified error handling for nvtune
//!
//! A single error type shared by the driver adapter and the command line front end.

use std::io;
use std::path::PathBuf;

/// Result type alias using NvTuneError
pub type Result<T> = std::result::Result<T, NvTuneError>;

/// Unified error type for all nvtune operations
#[derive(thiserror::Error, Debug)]
pub enum NvTuneError {
    // ============================================================================
    // I/O and Configuration Errors
    // ============================================================================
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },

    // ============================================================================
    // Driver Errors
    // ============================================================================
    #[error("Load NvAPI library failed: {reason}")]
    LibraryLoad {
        library: String,
        reason: String,
    },

    #[error("NvAPI entry point {name} (0x{id:08X}) could not be resolved")]
    EntryPointMissing {
        name: &'static str,
        id: u32,
    },

    #[error("NvAPI initialization failed: {reason} ({status})")]
    DriverInit {
        status: i32,
        reason: String,
    },

    #[error("NvAPI {operation} failed: {reason} ({status})")]
    DriverCall {
        operation: &'static str,
        status: i32,
        reason: String,
    },

    #[error("NvAPI {operation} did not reach end of enumeration after {iterations} calls")]
    EnumerationStalled {
        operation: &'static str,
        iterations: u32,
    },

    // ============================================================================
    // Lookup Errors
    // ============================================================================
    #[error("Display {index} not found ({count} display(s) enumerated)")]
    DisplayNotFound {
        index: u32,
        count: u32,
    },

    #[error("GPU {index} not found ({count} physical GPU(s) enumerated)")]
    GpuNotFound {
        index: u32,
        count: u32,
    },

    #[error("Cooler {cooler} not addressable on GPU {gpu} (max {max})")]
    CoolerNotFound {
        gpu: u32,
        cooler: u32,
        max: u32,
    },
}

impl NvTuneError {
    /// Create an invalid config error for a named field
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for failures reported by the driver itself (as opposed to local lookups)
    pub fn is_driver_failure(&self) -> bool {
        matches!(
            self,
            Self::LibraryLoad { .. }
                | Self::EntryPointMissing { .. }
                | Self::DriverInit { .. }
                | Self::DriverCall { .. }
                | Self::EnumerationStalled { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_call_message() {
        let err = NvTuneError::DriverCall {
            operation: "display handle enumeration",
            status: -1,
            reason: "NVAPI_ERROR".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "NvAPI display handle enumeration failed: NVAPI_ERROR (-1)"
        );
        assert!(err.is_driver_failure());
    }

    #[test]
    fn test_entry_point_message_uses_hex_id() {
        let err = NvTuneError::EntryPointMissing { name: "Unload", id: 0xD22BDD7E };
        assert!(err.to_string().contains("0xD22BDD7E"));
    }

    #[test]
    fn test_lookup_errors_are_not_driver_failures() {
        assert!(!NvTuneError::GpuNotFound { index: 3, count: 2 }.is_driver_failure());
        assert!(!NvTuneError::invalid_config("log_level", "unknown").is_driver_failure());
    }

    #[test]
    fn test_invalid_config_message() {
        let err = NvTuneError::invalid_config("log_level", "must be one of trace, debug");
        assert_eq!(
            err.to_string(),
            "Invalid configuration value for log_level: must be one of trace, debug"
        );
    }
}
