use super::error::ServiceError;
use serde::Serialize;

/// Host operating systems the service scripts are shipped for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
}

impl Platform {
    pub fn current() -> Result<Self, ServiceError> {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Result<Self, ServiceError> {
        match os {
            "windows" => Ok(Platform::Windows),
            "linux" => Ok(Platform::Linux),
            "macos" => Ok(Platform::MacOs),
            other => Err(ServiceError::UnsupportedPlatform(other.to_string())),
        }
    }

    pub fn is_windows(self) -> bool {
        self == Platform::Windows
    }

    /// File name of a bundled script for this platform
    pub fn script_file(self, base_name: &str) -> String {
        match self {
            Platform::Windows => format!("{}.ps1", base_name),
            Platform::Linux | Platform::MacOs => format!("{}.sh", base_name),
        }
    }

    /// File name of the bundled printer service executable
    pub fn service_binary(self) -> &'static str {
        match self {
            Platform::Windows => "main.exe",
            Platform::Linux | Platform::MacOs => "main",
        }
    }
}
