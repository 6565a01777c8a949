//! Link transport trait, configuration and error types.
//!
//! The engine only ever asks the transport to swap one byte with the peer.
//! Clock generation, pin handling and bit timing belong to the implementation.

use core::time::Duration;

/// Which side of the link drives the serial clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkRole {
    /// Drives the clock (Game Boy internal clock).
    #[default]
    Master,
    /// Follows the peer's clock.
    Slave,
}

/// Transport configuration handed to [`LinkTransport::configure`].
///
/// Pin numbers are opaque to the engine; the transport decides what they mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    pub role: LinkRole,
    pub clock_pin: u8,
    pub data_out_pin: u8,
    pub data_in_pin: u8,
    /// Bits per second while acting as master.
    pub bit_rate: u32,
}

impl LinkConfig {
    /// Game Boy internal clock rate (8192 Hz).
    pub const GAME_BOY_BIT_RATE: u32 = 8192;

    /// Duration of one full byte at the configured bit rate.
    ///
    /// Returns `None` for a zero bit rate.
    #[must_use]
    pub fn byte_period(&self) -> Option<Duration> {
        if self.bit_rate == 0 {
            return None;
        }
        Some(Duration::from_nanos(8_000_000_000 / u64::from(self.bit_rate)))
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            role: LinkRole::Master,
            clock_pin: 0,
            data_out_pin: 1,
            data_in_pin: 2,
            bit_rate: Self::GAME_BOY_BIT_RATE,
        }
    }
}

/// Error type for transport operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// The byte period did not complete before the timeout.
    Timeout,
    /// The link went away.
    Disconnected,
    /// The transport cannot honour the requested configuration.
    Config,
}

impl core::fmt::Display for TransportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Timeout => write!(f, "link timeout"),
            Self::Disconnected => write!(f, "link disconnected"),
            Self::Config => write!(f, "invalid link configuration"),
        }
    }
}

/// Synchronous byte-exchange primitive over a clocked serial link.
///
/// Every call sends exactly one byte and receives exactly one byte, the way a
/// shift register swaps contents with its peer.
pub trait LinkTransport {
    /// Apply role, pins and bit rate. Called before every trade attempt.
    fn configure(&mut self, config: &LinkConfig) -> Result<(), TransportError>;

    /// Send `tx` while receiving the peer's byte.
    ///
    /// Blocks until one full byte period completes, or fails with
    /// [`TransportError::Timeout`] once `timeout` has elapsed.
    fn exchange_byte(&mut self, tx: u8, timeout: Duration) -> Result<u8, TransportError>;
}

impl<T: LinkTransport + ?Sized> LinkTransport for &mut T {
    fn configure(&mut self, config: &LinkConfig) -> Result<(), TransportError> {
        (**self).configure(config)
    }

    fn exchange_byte(&mut self, tx: u8, timeout: Duration) -> Result<u8, TransportError> {
        (**self).exchange_byte(tx, timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LinkConfig::default();
        assert_eq!(config.role, LinkRole::Master);
        assert_eq!(
            (config.clock_pin, config.data_out_pin, config.data_in_pin),
            (0, 1, 2)
        );
        assert_eq!(config.bit_rate, 8192);
    }

    #[test]
    fn test_byte_period() {
        let config = LinkConfig::default();
        // 8 bits at 8192 Hz
        assert_eq!(config.byte_period(), Some(Duration::from_nanos(976_562)));

        let stopped = LinkConfig {
            bit_rate: 0,
            ..LinkConfig::default()
        };
        assert_eq!(stopped.byte_period(), None);
    }
}
