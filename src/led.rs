//! Status LED modes shared between the USB handler, the host task and the
//! LED task.

use defmt::Format;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Duration;
use portable_atomic::{AtomicBool, AtomicU8, Ordering};

/// What the LED currently shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Format)]
#[repr(u8)]
pub enum LedMode {
    /// USB not enumerated: fast blink.
    NotMounted = 0,
    /// USB configured: slow blink.
    Mounted = 1,
    /// Bus suspended: very slow blink.
    Suspended = 2,
    /// Trade running: solid on.
    Trading = 3,
    /// Web serial page connected: solid on.
    WebSerial = 4,
}

impl LedMode {
    /// Time between LED toggles, or `None` for solid on.
    #[must_use]
    pub const fn blink_interval(self) -> Option<Duration> {
        match self {
            Self::NotMounted => Some(Duration::from_millis(250)),
            Self::Mounted => Some(Duration::from_millis(1000)),
            Self::Suspended => Some(Duration::from_millis(2500)),
            Self::Trading | Self::WebSerial => None,
        }
    }

    const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Mounted,
            2 => Self::Suspended,
            3 => Self::Trading,
            4 => Self::WebSerial,
            _ => Self::NotMounted,
        }
    }
}

/// Latest LED mode. A running trade takes precedence over a connected web
/// serial page, which takes precedence over USB state.
pub struct LedStatus {
    signal: Signal<CriticalSectionRawMutex, LedMode>,
    usb: AtomicU8,
    web_serial: AtomicBool,
    trading: AtomicBool,
}

impl LedStatus {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            signal: Signal::new(),
            usb: AtomicU8::new(LedMode::NotMounted as u8),
            web_serial: AtomicBool::new(false),
            trading: AtomicBool::new(false),
        }
    }

    /// Record a USB state change.
    pub fn set_usb(&self, mode: LedMode) {
        self.usb.store(mode as u8, Ordering::Relaxed);
        self.signal.signal(self.current());
    }

    /// Record a web serial connect or disconnect.
    pub fn set_web_serial(&self, connected: bool) {
        self.web_serial.store(connected, Ordering::Relaxed);
        self.signal.signal(self.current());
    }

    pub fn set_trading(&self, trading: bool) {
        self.trading.store(trading, Ordering::Relaxed);
        self.signal.signal(self.current());
    }

    #[must_use]
    pub fn is_trading(&self) -> bool {
        self.trading.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn current(&self) -> LedMode {
        if self.is_trading() {
            LedMode::Trading
        } else if self.web_serial.load(Ordering::Relaxed) {
            LedMode::WebSerial
        } else {
            LedMode::from_raw(self.usb.load(Ordering::Relaxed))
        }
    }

    /// Wait for the next mode change.
    pub async fn wait(&self) -> LedMode {
        self.signal.wait().await
    }
}

impl Default for LedStatus {
    fn default() -> Self {
        Self::new()
    }
}
