//! Host side of the bridge: CDC and WebUSB merged into one command source
//! and one status sink, plus the USB device handler.
//!
//! A command may arrive on either channel. Its response goes back on the
//! channel the command came from.

use defmt::Format;
use embassy_futures::select::{select, Either};
use embassy_futures::yield_now;
use embassy_usb::control::{OutResponse, Request, RequestType};
use embassy_usb::Handler;
use portable_atomic::{AtomicU8, Ordering};
use trade_core::{CommandError, CommandSource, StatusError, StatusSink, MAX_PACKET_SIZE};

use crate::led::{LedMode, LedStatus};
use crate::usb_cdc::{CdcCommands, CdcStatus};
use crate::web_usb::{WebCommands, WebSerialState, WebStatus, REQUEST_SET_LINE_STATE};

/// Channel a host command arrived on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Format)]
#[repr(u8)]
pub enum HostChannel {
    Cdc = 0,
    Web = 1,
}

/// Channel of the last host command.
pub struct HostRoute {
    last: AtomicU8,
}

impl HostRoute {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last: AtomicU8::new(HostChannel::Cdc as u8),
        }
    }

    pub fn set(&self, channel: HostChannel) {
        self.last.store(channel as u8, Ordering::Relaxed);
    }

    #[must_use]
    pub fn get(&self) -> HostChannel {
        match self.last.load(Ordering::Relaxed) {
            1 => HostChannel::Web,
            _ => HostChannel::Cdc,
        }
    }
}

impl Default for HostRoute {
    fn default() -> Self {
        Self::new()
    }
}

/// Pair the command and status halves of both channels.
pub fn host_channels<'d>(
    (cdc_commands, cdc_status): (CdcCommands<'d>, CdcStatus<'d>),
    (web_commands, web_status): (WebCommands<'d>, WebStatus<'d>),
    route: &'d HostRoute,
    led: &'d LedStatus,
) -> (HostCommands<'d>, HostStatus<'d>) {
    (
        HostCommands {
            cdc: cdc_commands,
            web: web_commands,
            route,
            web_buf: [0; MAX_PACKET_SIZE],
        },
        HostStatus {
            cdc: cdc_status,
            web: web_status,
            route,
            led,
        },
    )
}

/// Commands from whichever channel delivers first.
pub struct HostCommands<'d> {
    cdc: CdcCommands<'d>,
    web: WebCommands<'d>,
    route: &'d HostRoute,
    web_buf: [u8; MAX_PACKET_SIZE],
}

impl CommandSource for HostCommands<'_> {
    async fn receive(&mut self, buf: &mut [u8]) -> Result<usize, CommandError> {
        let winner = select(self.cdc.receive(buf), self.web.receive(&mut self.web_buf)).await;

        match winner {
            Either::First(result) => {
                self.route.set(HostChannel::Cdc);
                result
            }
            Either::Second(result) => {
                self.route.set(HostChannel::Web);
                let len = result?.min(buf.len());
                buf[..len].copy_from_slice(&self.web_buf[..len]);
                Ok(len)
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.cdc.is_connected() || self.web.is_connected()
    }
}

/// Responses to the channel of the last command.
pub struct HostStatus<'d> {
    cdc: CdcStatus<'d>,
    web: WebStatus<'d>,
    route: &'d HostRoute,
    led: &'d LedStatus,
}

impl StatusSink for HostStatus<'_> {
    async fn send(&mut self, text: &str) -> Result<(), StatusError> {
        match self.route.get() {
            HostChannel::Cdc => self.cdc.send(text).await,
            HostChannel::Web => self.web.send(text).await,
        }
    }

    fn is_ready(&self) -> bool {
        match self.route.get() {
            HostChannel::Cdc => self.cdc.is_ready(),
            HostChannel::Web => self.web.is_ready(),
        }
    }

    async fn trade_started(&mut self) {
        self.led.set_trading(true);
        // Let the LED task switch to solid before the trade blocks this executor
        yield_now().await;
    }
}

/// Tracks bus state and the web serial connection for the status LED.
pub struct UsbStatusHandler {
    led: &'static LedStatus,
    web: &'static WebSerialState,
    configured: bool,
}

impl UsbStatusHandler {
    pub const fn new(led: &'static LedStatus, web: &'static WebSerialState) -> Self {
        Self {
            led,
            web,
            configured: false,
        }
    }

    fn set_web_serial(&self, connected: bool) {
        self.web.set_connected(connected);
        self.led.set_web_serial(connected);
    }
}

impl Handler for UsbStatusHandler {
    fn enabled(&mut self, enabled: bool) {
        if !enabled {
            self.configured = false;
            self.set_web_serial(false);
            self.led.set_usb(LedMode::NotMounted);
        }
    }

    fn reset(&mut self) {
        self.configured = false;
        self.set_web_serial(false);
        self.led.set_usb(LedMode::NotMounted);
    }

    fn configured(&mut self, configured: bool) {
        self.configured = configured;
        defmt::info!("USB configured: {}", configured);
        self.led.set_usb(if configured {
            LedMode::Mounted
        } else {
            LedMode::NotMounted
        });
    }

    fn suspended(&mut self, suspended: bool) {
        let mode = match (suspended, self.configured) {
            (true, _) => LedMode::Suspended,
            (false, true) => LedMode::Mounted,
            (false, false) => LedMode::NotMounted,
        };
        self.led.set_usb(mode);
    }

    fn control_out(&mut self, req: Request, _data: &[u8]) -> Option<OutResponse> {
        if req.request_type != RequestType::Vendor || req.request != REQUEST_SET_LINE_STATE {
            return None;
        }

        let connected = req.value != 0;
        defmt::info!("Web serial connected: {}", connected);
        self.set_web_serial(connected);
        Some(OutResponse::Accepted)
    }
}
