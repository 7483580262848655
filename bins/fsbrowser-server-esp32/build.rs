//! Build script for the ESP32 file browser.
//!
//! Exports the ESP-IDF environment needed by esp-idf-svc.

fn main() {
    embuild::espidf::sysenv::output();
}
