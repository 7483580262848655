//! SPIFFS partition mounted into the ESP-IDF VFS.
//!
//! Once mounted, the partition is reachable through `std::fs` under the
//! base path, so the file browser serves it with a plain `HostFs`.

use std::ffi::CString;
use std::path::Path;

use anyhow::Result;
use esp_idf_svc::sys::{esp, esp_spiffs_info, esp_vfs_spiffs_conf_t, esp_vfs_spiffs_register};
use log::info;

/// A mounted SPIFFS partition (the default one).
pub struct Spiffs {
    base_path: CString,
}

impl Spiffs {
    /// Mount the default SPIFFS partition at `base_path`, formatting it if
    /// mounting fails.
    pub fn mount(base_path: &str, max_files: usize) -> Result<Self> {
        let base_path = CString::new(base_path)?;
        let conf = esp_vfs_spiffs_conf_t {
            base_path: base_path.as_ptr(),
            partition_label: std::ptr::null(),
            max_files,
            format_if_mount_failed: true,
        };
        esp!(unsafe { esp_vfs_spiffs_register(&conf) })?;

        let spiffs = Self { base_path };
        if let Ok((total, used)) = spiffs.usage() {
            info!(
                "SPIFFS mounted at {}: {} of {} bytes used",
                spiffs.base_path().display(),
                used,
                total
            );
        }
        Ok(spiffs)
    }

    /// The mount point.
    pub fn base_path(&self) -> &Path {
        Path::new(self.base_path.to_str().unwrap_or("/"))
    }

    /// `(total, used)` bytes.
    pub fn usage(&self) -> Result<(usize, usize)> {
        let mut total = 0;
        let mut used = 0;
        esp!(unsafe { esp_spiffs_info(std::ptr::null(), &mut total, &mut used) })?;
        Ok((total, used))
    }
}
