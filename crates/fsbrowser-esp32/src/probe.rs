//! Live device readings for `/all`.

use std::sync::Mutex;

use esp_idf_svc::sys::{esp_get_free_heap_size, gpio_get_level};
use fsbrowser_core::{DeviceProbe, DeviceStatus};

/// Reads free heap, one analog input and the levels of GPIO 0-31.
pub struct EspProbe {
    analog: Mutex<Box<dyn FnMut() -> Option<u16> + Send>>,
}

impl EspProbe {
    /// `analog` takes one ADC reading; `None` reports as 0.
    pub fn new(analog: impl FnMut() -> Option<u16> + Send + 'static) -> Self {
        Self {
            analog: Mutex::new(Box::new(analog)),
        }
    }
}

impl DeviceProbe for EspProbe {
    fn status(&self) -> DeviceStatus {
        let heap = unsafe { esp_get_free_heap_size() };
        let analog = match self.analog.lock() {
            Ok(mut read) => read().map(u32::from).unwrap_or(0),
            Err(_) => 0,
        };
        let gpio = (0..32).fold(0u32, |mask, pin| {
            if unsafe { gpio_get_level(pin) } != 0 {
                mask | (1 << pin)
            } else {
                mask
            }
        });
        DeviceStatus { heap, analog, gpio }
    }
}
