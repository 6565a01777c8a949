//! Wire constants for the Gen-I trade centre exchange.

use crate::transport::LinkRole;

/// Link mode code for the trade centre.
pub const MODE_TRADE_CENTRE: u8 = 0xD4;

/// Role code sent by the clock master.
pub const ROLE_MASTER: u8 = 0x01;

/// Role code sent by the clock slave.
pub const ROLE_SLAVE: u8 = 0x02;

/// Version byte both sides send unless configured otherwise.
pub const DEFAULT_VERSION: u8 = 0xFD;

/// Handshake verdict: the received code was the expected one.
pub const ACK: u8 = 0x60;

/// Handshake verdict: the received code was wrong.
pub const NAK: u8 = 0xFE;

/// Times each handshake verdict is sent.
pub const VERDICT_COPIES: usize = 2;

/// Byte repeated in the entropy preamble.
pub const PREAMBLE_BYTE: u8 = 0xFD;

/// Number of preamble bytes before the random bytes.
pub const PREAMBLE_LEN: usize = 6;

/// Largest value a random byte may take. Keeps random bytes distinct from
/// the preamble and NAK codes.
pub const ENTROPY_MAX: u8 = 0xFC;

/// Default number of random bytes after the preamble.
pub const DEFAULT_ENTROPY_LEN: u8 = 10;

/// Upper bound for the configured number of random bytes.
pub const MAX_ENTROPY_LEN: usize = 16;

/// Trainer name field length in the metadata phase.
pub const TRAINER_NAME_LENGTH: usize = 11;

/// Species list length: one entry per party slot plus the terminator.
pub const SPECIES_LIST_LENGTH: usize = 7;

/// Fills and terminates the species list.
pub const SPECIES_LIST_END: u8 = 0xFF;

/// Party size this side always announces.
pub const LOCAL_PARTY_SIZE: u8 = 1;

/// Selection byte for party index 0. Index `n` is sent as `SELECT_BASE + n`.
pub const SELECT_BASE: u8 = 0x60;

/// Selection byte meaning the peer backed out.
pub const SELECT_CANCEL: u8 = 0x6F;

/// Final confirmation: keep the trade.
pub const ACCEPT: u8 = 0x62;

/// Final confirmation: abort the trade.
pub const DECLINE: u8 = 0x61;

/// The three handshake steps, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandshakeStage {
    /// Both sides announce trade centre mode.
    Mode,
    /// Master and slave announce complementary roles.
    Role,
    /// Both sides announce the same version byte.
    Version,
}

impl HandshakeStage {
    pub const ALL: [HandshakeStage; 3] = [Self::Mode, Self::Role, Self::Version];

    /// Code this side sends and code it expects back, for `role` and
    /// `version`.
    #[must_use]
    pub const fn codes(self, role: LinkRole, version: u8) -> (u8, u8) {
        match self {
            Self::Mode => (MODE_TRADE_CENTRE, MODE_TRADE_CENTRE),
            Self::Role => match role {
                LinkRole::Master => (ROLE_MASTER, ROLE_SLAVE),
                LinkRole::Slave => (ROLE_SLAVE, ROLE_MASTER),
            },
            Self::Version => (version, version),
        }
    }
}

impl core::fmt::Display for HandshakeStage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Mode => write!(f, "mode"),
            Self::Role => write!(f, "role"),
            Self::Version => write!(f, "version"),
        }
    }
}

/// Species list announcing a single party member.
#[must_use]
pub const fn species_list(species: u8) -> [u8; SPECIES_LIST_LENGTH] {
    let mut list = [SPECIES_LIST_END; SPECIES_LIST_LENGTH];
    list[0] = species;
    list
}
