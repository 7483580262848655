//! File browser for ESP32.
//!
//! This binary requires the ESP32 Rust toolchain. It mounts the SPIFFS
//! partition, joins the WiFi network given at build time (`WIFI_SSID`,
//! `WIFI_PASS`) and serves the file browser on port 80.

use std::time::Duration;

use esp_idf_hal::adc::attenuation::DB_11;
use esp_idf_hal::adc::oneshot::config::AdcChannelConfig;
use esp_idf_hal::adc::oneshot::{AdcChannelDriver, AdcDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use fsbrowser_core::{fs::log_inventory, FileService, HostFs};
use fsbrowser_esp32::{
    config::{DeviceConfig, WifiConfig},
    http::start_server,
    probe::EspProbe,
    spiffs::Spiffs,
    wifi::connect_wifi,
};
use log::info;

fn main() -> anyhow::Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    let device = DeviceConfig::default();
    info!("{} starting...", device.name);

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;

    let spiffs = Spiffs::mount(&device.spiffs_base_path, device.max_open_files)?;
    let fs = HostFs::new(spiffs.base_path()).with_parent_dirs(false);
    log_inventory(&fs)?;

    let wifi = WifiConfig::from_build_env();
    let (_wifi, ip) = connect_wifi(&wifi.ssid, &wifi.password, peripherals.modem, sysloop)?;

    let adc = AdcDriver::new(peripherals.adc1)?;
    let mut channel = AdcChannelDriver::new(
        adc,
        peripherals.pins.gpio34,
        &AdcChannelConfig {
            attenuation: DB_11,
            ..Default::default()
        },
    )?;
    let probe = EspProbe::new(move || channel.read().ok());

    let service = FileService::new(fs).with_probe(probe);
    let _server = start_server(service, device.http_port)?;

    info!("Open http://{}/edit to browse the filesystem", ip);

    loop {
        std::thread::sleep(Duration::from_secs(1));
    }
}
