//! WebUSB vendor channel for browser hosts.
//!
//! The device advertises a landing page through the WebUSB BOS capability
//! and binds WinUSB to the vendor interface through an MS OS 2.0 descriptor,
//! so a page can claim the interface without a driver install. The page
//! sends vendor request `0x22` with a non-zero value to connect and zero to
//! disconnect, mirroring the CDC line state. Commands and responses then
//! travel over the interface's bulk endpoints.

use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_usb::class::web_usb::{Config, State, Url, WebUsb};
use embassy_usb::driver::{Endpoint, EndpointIn, EndpointOut};
use embassy_usb::msos::{self, windows_version};
use embassy_usb::Builder;
use portable_atomic::{AtomicBool, Ordering};
use trade_core::{CommandError, CommandSource, StatusError, StatusSink};

use crate::usb_cdc::{map_read_error, map_write_error};

/// Page the browser offers to open when the device is plugged in.
pub const LANDING_URL: &str = "https://tetris.gblink.io";

/// Vendor request code the host uses to fetch the landing page URL.
pub const WEBUSB_VENDOR_CODE: u8 = 1;

/// Vendor request that connects (non-zero value) or disconnects the page.
pub const REQUEST_SET_LINE_STATE: u8 = 0x22;

/// Bulk packet size of the vendor interface.
pub const WEB_PACKET_SIZE: u16 = 64;

const DEVICE_INTERFACE_GUIDS: &[&str] = &["{5C1A8B36-9E43-4F0B-A7D2-3B6E2C41F9A0}"];

type EndpointTx<'d> = <Driver<'d, USB> as embassy_usb::driver::Driver<'d>>::EndpointIn;
type EndpointRx<'d> = <Driver<'d, USB> as embassy_usb::driver::Driver<'d>>::EndpointOut;

/// Connection state set by the `0x22` vendor request.
pub struct WebSerialState {
    connected: AtomicBool,
    changed: Signal<CriticalSectionRawMutex, bool>,
}

impl WebSerialState {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            connected: AtomicBool::new(false),
            changed: Signal::new(),
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Relaxed);
        self.changed.signal(connected);
    }

    async fn wait_connected(&self) {
        while !self.is_connected() {
            self.changed.wait().await;
        }
    }
}

impl Default for WebSerialState {
    fn default() -> Self {
        Self::new()
    }
}

/// WebUSB class configuration with the landing page.
#[must_use]
pub fn web_usb_config() -> Config<'static> {
    Config {
        max_packet_size: WEB_PACKET_SIZE,
        vendor_code: WEBUSB_VENDOR_CODE,
        landing_url: Some(Url::new(LANDING_URL)),
    }
}

/// Add the WebUSB capability, the MS OS 2.0 descriptor set and the vendor
/// interface to the USB builder.
///
/// Returns the command source and status sink of the vendor interface.
pub fn configure_web_usb<'d>(
    builder: &mut Builder<'d, Driver<'d, USB>>,
    state: &'d mut State<'d>,
    config: &'d Config<'d>,
    serial: &'d WebSerialState,
) -> (WebCommands<'d>, WebStatus<'d>) {
    builder.msos_descriptor(windows_version::WIN8_1, 0);
    WebUsb::configure(builder, state, config);

    let mut func = builder.function(0xFF, 0x00, 0x00);
    func.msos_feature(msos::CompatibleIdFeatureDescriptor::new("WINUSB", ""));
    func.msos_feature(msos::RegistryPropertyFeatureDescriptor::new(
        "DeviceInterfaceGUIDs",
        msos::PropertyData::RegMultiSz(DEVICE_INTERFACE_GUIDS),
    ));

    let mut iface = func.interface();
    let mut alt = iface.alt_setting(0xFF, 0x00, 0x00, None);
    let tx = alt.endpoint_bulk_in(None, config.max_packet_size);
    let rx = alt.endpoint_bulk_out(None, config.max_packet_size);

    (WebCommands { rx, serial }, WebStatus { tx, serial })
}

/// Host commands read from the vendor OUT endpoint.
pub struct WebCommands<'d> {
    rx: EndpointRx<'d>,
    serial: &'d WebSerialState,
}

impl CommandSource for WebCommands<'_> {
    async fn receive(&mut self, buf: &mut [u8]) -> Result<usize, CommandError> {
        // Packets stay queued in the endpoint until the page connects
        self.serial.wait_connected().await;
        self.rx.wait_enabled().await;
        self.rx.read(buf).await.map_err(map_read_error)
    }

    fn is_connected(&self) -> bool {
        self.serial.is_connected()
    }
}

/// Response text written to the vendor IN endpoint.
pub struct WebStatus<'d> {
    tx: EndpointTx<'d>,
    serial: &'d WebSerialState,
}

impl StatusSink for WebStatus<'_> {
    async fn send(&mut self, text: &str) -> Result<(), StatusError> {
        if !self.serial.is_connected() {
            return Err(StatusError::NotReady);
        }

        let max = usize::from(WEB_PACKET_SIZE);
        let bytes = text.as_bytes();

        for chunk in bytes.chunks(max) {
            self.tx.write(chunk).await.map_err(map_write_error)?;
        }

        if !bytes.is_empty() && bytes.len() % max == 0 {
            self.tx.write(&[]).await.map_err(map_write_error)?;
        }
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.serial.is_connected()
    }
}
