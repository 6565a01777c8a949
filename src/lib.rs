//! Game Boy link cable trade bridge for RP2040.
//!
//! This crate provides the embedded side of a Generation-I trade bridge: a
//! USB serial host sends single-byte commands, and the firmware runs one side
//! of a trade over the Game Boy link port.
//!
//! # Overview
//!
//! The firmware runs on a Raspberry Pi Pico (RP2040) and:
//! 1. Enumerates as a composite USB device: CDC-ACM serial plus a WebUSB
//!    vendor interface for browser hosts
//! 2. Reads host commands (`t` = start trade, `h` = help) from either channel
//! 3. Runs the trade protocol over the bit-banged link port
//! 4. Writes the received Pokémon back to the host as text
//!
//! # Hardware Configuration
//!
//! | Function  | GPIO | Description |
//! |-----------|------|-------------|
//! | Link SC   | 0    | Serial clock |
//! | Link SO   | 1    | Data out to Game Boy |
//! | Link SI   | 2    | Data in from Game Boy |
//! | LED       | 25   | On-board LED (status) |
//!
//! # Architecture
//!
//! The firmware uses the Embassy async runtime with three tasks:
//!
//! - **USB Task**: Manages the USB device stack
//! - **Host Task**: [`HostBridge`] loop over [`HostCommands`] and
//!   [`HostStatus`]. A trade runs synchronously and holds the executor until
//!   it ends, like a single control loop would
//! - **LED Task**: Blinks according to [`LedStatus`], solid while trading or
//!   while a web serial page is connected
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)
//! - **`species-pikachu`**: Offer Pikachu instead of Magikarp
//!
//! # Re-exports
//!
//! This crate re-exports the public items of [`trade_core`] that the
//! firmware binary needs, so consumers only need to depend on this crate.

#![no_std]

pub use gen1_proto::{SpeciesTemplate, MAGIKARP, PIKACHU};
pub use trade_core::{
    BridgeError, CommandDispatcher, EngineConfig, HostBridge, LinkConfig, LinkRole, Response,
    TradeEngine, TradeError, TradeOutcome, TrainerProfile,
};

pub mod host;
pub mod led;
pub mod link;
pub mod usb_cdc;
pub mod web_usb;

pub use host::{host_channels, HostChannel, HostCommands, HostRoute, HostStatus, UsbStatusHandler};
pub use led::{LedMode, LedStatus};
pub use link::GpioLink;
pub use usb_cdc::{cdc_host, configure_usb_cdc, CdcCommands, CdcStatus, UsbDriver};
pub use web_usb::{configure_web_usb, web_usb_config, WebCommands, WebSerialState, WebStatus};
