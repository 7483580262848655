//! Device configuration.

use serde::{Deserialize, Serialize};

/// Device settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Device name, used in logs.
    pub name: String,

    /// HTTP server port.
    pub http_port: u16,

    /// VFS mount point of the SPIFFS partition.
    pub spiffs_base_path: String,

    /// Maximum number of files open at once.
    pub max_open_files: usize,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: "fsbrowser-esp32".to_string(),
            http_port: 80,
            spiffs_base_path: "/spiffs".to_string(),
            max_open_files: 5,
        }
    }
}

/// WiFi credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WifiConfig {
    /// WiFi network SSID.
    pub ssid: String,

    /// WiFi network password (empty for open networks).
    pub password: String,
}

impl WifiConfig {
    /// Credentials baked in at compile time from `WIFI_SSID` and `WIFI_PASS`.
    pub fn from_build_env() -> Self {
        Self {
            ssid: option_env!("WIFI_SSID").unwrap_or_default().to_string(),
            password: option_env!("WIFI_PASS").unwrap_or_default().to_string(),
        }
    }
}
