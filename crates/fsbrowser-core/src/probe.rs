//! Device readings for the diagnostics endpoint.

use crate::model::DeviceStatus;

/// Source of live device readings.
///
/// Implemented per platform: the ESP32 crate reads heap, ADC and GPIO
/// registers; the Linux binary reports available memory.
pub trait DeviceProbe: Send + Sync {
    /// Take a reading now.
    fn status(&self) -> DeviceStatus;
}

/// Probe that always reports zeros.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProbe;

impl DeviceProbe for NullProbe {
    fn status(&self) -> DeviceStatus {
        DeviceStatus::default()
    }
}

impl<F> DeviceProbe for F
where
    F: Fn() -> DeviceStatus + Send + Sync,
{
    fn status(&self) -> DeviceStatus {
        self()
    }
}
