use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while preparing or running a bundled service script
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The script (or service binary) is missing from the installation bundle.
    /// This is a packaging problem and is never retried.
    #[error("Script not found: {}", .0.display())]
    ScriptNotFound(PathBuf),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Non-zero exit. A declined elevation prompt also ends up here.
    #[error("{message}")]
    ScriptFailed { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors talking to the printer service over HTTP
#[derive(Debug, Error)]
pub enum PrinterError {
    #[error("No device IP found")]
    NoDeviceIp,

    #[error("Invalid service address {0}")]
    InvalidHost(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    HttpStatus(u16),

    #[error("Bad response from server: {0}")]
    BadResponse(String),
}

/// Helper trait for converting errors to Tauri-compatible String errors
pub trait ToTauriError {
    fn to_tauri_error(self) -> String;
}

impl<E: std::error::Error> ToTauriError for E {
    fn to_tauri_error(self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_failed_displays_message_verbatim() {
        let err = ServiceError::ScriptFailed {
            message: "Request dismissed".to_string(),
        };
        assert_eq!(err.to_tauri_error(), "Request dismissed");
    }

    #[test]
    fn test_script_not_found_names_path() {
        let err = ServiceError::ScriptNotFound(PathBuf::from("/bundle/scripts/get_ip.sh"));
        assert_eq!(err.to_string(), "Script not found: /bundle/scripts/get_ip.sh");
    }
}
