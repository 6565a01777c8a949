//! Bit-banged Game Boy link port.
//!
//! # Signalling
//!
//! - The clock idles high.
//! - Data is shifted MSB first.
//! - Each side changes its output on the falling clock edge.
//! - Each side samples its input on the rising edge.
//! - The master generates eight clock pulses per byte.
//! - The slave follows the master's pulses.
//!
//! The Game Boy runs at 5 V. The three signals must go through level
//! shifters before reaching the RP2040.
//!
//! # Pins
//!
//! | Signal   | GPIO | Direction |
//! |----------|------|-----------|
//! | Clock    | 0    | out (master) / in (slave) |
//! | Data out | 1    | RP2040 to Game Boy (SO) |
//! | Data in  | 2    | Game Boy to RP2040 (SI) |

use core::time::Duration as CoreDuration;

use embassy_rp::gpio::{Flex, Input, Level, Output, Pin, Pull};
use embassy_rp::Peri;
use embassy_time::{Delay, Duration, Instant};
use embedded_hal::delay::DelayNs;
use trade_core::{LinkConfig, LinkRole, LinkTransport, TransportError};

/// Link transport over three GPIO pins.
pub struct GpioLink<'d> {
    clock: Flex<'d>,
    data_out: Output<'d>,
    data_in: Input<'d>,
    pins: [u8; 3],
    role: LinkRole,
    half_period_ns: u32,
    delay: Delay,
}

impl<'d> GpioLink<'d> {
    /// Create a link on the given pins. The clock starts as an idle-high
    /// master output until [`LinkTransport::configure`] says otherwise.
    pub fn new(
        clock: Peri<'d, impl Pin>,
        data_out: Peri<'d, impl Pin>,
        data_in: Peri<'d, impl Pin>,
    ) -> Self {
        let pins = [clock.pin(), data_out.pin(), data_in.pin()];

        let mut clock = Flex::new(clock);
        clock.set_high();
        clock.set_as_output();

        Self {
            clock,
            data_out: Output::new(data_out, Level::High),
            data_in: Input::new(data_in, Pull::Up),
            pins,
            role: LinkRole::Master,
            half_period_ns: half_period_ns(LinkConfig::GAME_BOY_BIT_RATE),
            delay: Delay,
        }
    }

    fn out_level(byte: u8, bit: u8) -> Level {
        if byte & (1 << bit) != 0 {
            Level::High
        } else {
            Level::Low
        }
    }

    fn exchange_master(&mut self, tx: u8) -> u8 {
        let mut rx = 0u8;
        for bit in (0..8).rev() {
            self.clock.set_low();
            self.data_out.set_level(Self::out_level(tx, bit));
            self.delay.delay_ns(self.half_period_ns);

            self.clock.set_high();
            rx = (rx << 1) | u8::from(self.data_in.is_high());
            self.delay.delay_ns(self.half_period_ns);
        }
        rx
    }

    fn exchange_slave(&mut self, tx: u8, deadline: Instant) -> Result<u8, TransportError> {
        let mut rx = 0u8;
        for bit in (0..8).rev() {
            self.wait_clock(Level::Low, deadline)?;
            self.data_out.set_level(Self::out_level(tx, bit));

            self.wait_clock(Level::High, deadline)?;
            rx = (rx << 1) | u8::from(self.data_in.is_high());
        }
        Ok(rx)
    }

    fn wait_clock(&self, level: Level, deadline: Instant) -> Result<(), TransportError> {
        while self.clock.get_level() != level {
            if Instant::now() >= deadline {
                return Err(TransportError::Timeout);
            }
        }
        Ok(())
    }
}

impl LinkTransport for GpioLink<'_> {
    fn configure(&mut self, config: &LinkConfig) -> Result<(), TransportError> {
        if [config.clock_pin, config.data_out_pin, config.data_in_pin] != self.pins
            || config.bit_rate == 0
        {
            defmt::error!("Link config {:?} does not match pins {:?}", config, self.pins);
            return Err(TransportError::Config);
        }

        self.half_period_ns = half_period_ns(config.bit_rate);
        self.role = config.role;
        self.data_out.set_high();

        match config.role {
            LinkRole::Master => {
                self.clock.set_high();
                self.clock.set_as_output();
            }
            LinkRole::Slave => {
                self.clock.set_pull(Pull::Up);
                self.clock.set_as_input();
            }
        }

        defmt::debug!("Link configured as {:?} at {} bit/s", config.role, config.bit_rate);
        Ok(())
    }

    fn exchange_byte(&mut self, tx: u8, timeout: CoreDuration) -> Result<u8, TransportError> {
        let rx = match self.role {
            LinkRole::Master => self.exchange_master(tx),
            LinkRole::Slave => {
                let deadline =
                    Instant::now() + Duration::from_micros(timeout.as_micros() as u64);
                self.exchange_slave(tx, deadline)?
            }
        };

        // Leave the data line high between bytes
        self.data_out.set_high();
        Ok(rx)
    }
}

fn half_period_ns(bit_rate: u32) -> u32 {
    500_000_000 / bit_rate.max(1)
}
