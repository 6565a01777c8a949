//! Game Boy link cable trade engine.
//!
//! This crate runs one side of a Generation-I trade centre session over an
//! abstract byte-exchange transport, with no platform dependencies. It can be
//! used both in embedded `no_std` firmware and on host for testing.
//!
//! # Overview
//!
//! - [`transport`]: Byte-exchange trait ([`LinkTransport`]) and [`LinkConfig`]
//! - [`protocol`]: Wire constants and handshake stages
//! - [`engine`]: The trade state machine ([`TradeEngine`])
//! - [`slot`]: Zero-initialised storage for the received record ([`ReceivedSlot`])
//! - [`dispatcher`]: Host command bytes to engine runs ([`CommandDispatcher`])
//! - [`report`]: Text rendering of responses ([`write_response`])
//! - [`command`] / [`status`]: Host channel traits
//! - [`bridge`]: Host channel to dispatcher loop ([`HostBridge`])
//!
//! # Session
//!
//! ```text
//! Handshake        mode 0xD4, role 0x01/0x02, version; each code followed by ACK 0x60 / NAK 0xFE, sent twice
//! EntropyExchange  6 x 0xFD, then random bytes 0x00..=0xFC
//! MetadataExchange trainer name (11), party size (1), species list (7), OT name (7), nickname (11)
//! Selection        0x60 + index, 0x6F cancels
//! RecordExchange   44-byte core block
//! Confirm          ACCEPT 0x62 / DECLINE 0x61
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Log through defmt (for embedded logging)
//! - **`log`**: Log through the `log` facade
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(any(test, feature = "std"))]
extern crate std;

// This mod MUST go first, so that the others see its macros.
mod fmt;

pub mod bridge;
pub mod command;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod report;
pub mod slot;
pub mod status;
pub mod transport;

// Re-export main types at crate root
pub use bridge::{BridgeError, HostBridge, MAX_PACKET_SIZE, MAX_RESPONSE_LEN};
pub use command::{CommandError, CommandSource};
pub use dispatcher::{CommandDispatcher, Response, TrainerProfile, CMD_HELP, CMD_TRADE};
pub use engine::{EngineConfig, PeerInfo, TradeEngine, TradeOutcome, TradeState};
pub use error::TradeError;
pub use protocol::HandshakeStage;
pub use report::write_response;
pub use slot::ReceivedSlot;
pub use status::{StatusError, StatusSink};
pub use transport::{LinkConfig, LinkRole, LinkTransport, TransportError};

pub use gen1_proto;
