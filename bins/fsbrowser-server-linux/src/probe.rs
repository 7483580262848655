//! Host readings for `/all`.

use fsbrowser_core::{DeviceProbe, DeviceStatus};

const MEMINFO: &str = "/proc/meminfo";

/// Reports available memory as `heap`. There is no analog input or GPIO on
/// a desktop host, so those read zero.
#[derive(Debug, Default)]
pub struct HostProbe;

impl DeviceProbe for HostProbe {
    fn status(&self) -> DeviceStatus {
        let heap = std::fs::read_to_string(MEMINFO)
            .ok()
            .and_then(|meminfo| mem_available(&meminfo))
            .unwrap_or(0);
        DeviceStatus {
            heap,
            analog: 0,
            gpio: 0,
        }
    }
}

/// `MemAvailable` in bytes, saturated to `u32`.
fn mem_available(meminfo: &str) -> Option<u32> {
    let line = meminfo.lines().find(|l| l.starts_with("MemAvailable:"))?;
    let kib: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(u32::try_from(kib.saturating_mul(1024)).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mem_available() {
        let meminfo = "MemTotal:       16318480 kB\nMemFree:          512 kB\nMemAvailable:       40 kB\n";
        assert_eq!(mem_available(meminfo), Some(40 * 1024));
        assert_eq!(mem_available("MemTotal: 1 kB\n"), None);
        assert_eq!(mem_available("MemAvailable: 99999999 kB\n"), Some(u32::MAX));
    }
}
