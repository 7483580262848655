//! ESP32-specific components for the file browser.
//!
//! This crate provides reusable components for ESP32-based file browser
//! builds:
//! - WiFi connection management
//! - SPIFFS mounting
//! - Device readings (heap, ADC, GPIO)
//! - HTTP handler registration on the ESP-IDF server
//!
//! # Example
//!
//! ```ignore
//! use fsbrowser_esp32::{http::start_server, spiffs::Spiffs, wifi::connect_wifi};
//!
//! let (_wifi, ip) = connect_wifi("ssid", "password", peripherals.modem, sysloop)?;
//! let spiffs = Spiffs::mount("/spiffs", 5)?;
//! let service = FileService::new(HostFs::new(spiffs.base_path()).with_parent_dirs(false));
//! let _server = start_server(service, 80)?;
//! ```

pub mod config;
pub mod http;
pub mod probe;
pub mod spiffs;
pub mod wifi;
