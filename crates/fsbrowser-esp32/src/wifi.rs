//! WiFi station bring-up.

use anyhow::{anyhow, bail, Result};
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::peripheral,
    wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi},
};
use log::info;

/// Connect to a WiFi network and wait for an address.
///
/// Scans first so the channel is known, then connects and waits for the
/// DHCP lease. Returns the driver, which must be kept alive for the
/// connection to stay up, and the assigned IP address.
pub fn connect_wifi(
    ssid: &str,
    password: &str,
    modem: impl peripheral::Peripheral<P = esp_idf_svc::hal::modem::Modem> + 'static,
    sysloop: EspSystemEventLoop,
) -> Result<(Box<EspWifi<'static>>, String)> {
    if ssid.is_empty() {
        bail!("WiFi SSID cannot be empty (set WIFI_SSID at build time)");
    }

    let auth_method = if password.is_empty() {
        info!("WiFi password is empty, using open network");
        AuthMethod::None
    } else {
        AuthMethod::WPA2Personal
    };

    let mut esp_wifi = EspWifi::new(modem, sysloop.clone(), None)?;
    let mut wifi = BlockingWifi::wrap(&mut esp_wifi, sysloop)?;

    wifi.set_configuration(&Configuration::Client(ClientConfiguration::default()))?;
    wifi.start()?;

    info!("Scanning for WiFi networks...");
    let channel = wifi
        .scan()?
        .into_iter()
        .find(|ap| ap.ssid == ssid)
        .map(|ap| {
            info!("Found '{}' on channel {}", ssid, ap.channel);
            ap.channel
        });
    if channel.is_none() {
        info!("Network '{}' not found in scan, will try anyway", ssid);
    }

    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: ssid
            .try_into()
            .map_err(|_| anyhow!("SSID too long (max 32 chars)"))?,
        password: password
            .try_into()
            .map_err(|_| anyhow!("Password too long (max 64 chars)"))?,
        channel,
        auth_method,
        ..Default::default()
    }))?;

    info!("Connecting to '{}'...", ssid);
    wifi.connect()?;

    info!("Waiting for DHCP lease...");
    wifi.wait_netif_up()?;

    let ip_info = wifi.wifi().sta_netif().get_ip_info()?;
    info!("WiFi connected, IP address: {}", ip_info.ip);

    Ok((Box::new(esp_wifi), ip_info.ip.to_string()))
}
