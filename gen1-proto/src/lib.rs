//! Generation-I party Pokémon record: types, codec and builder.
//!
//! This crate provides everything needed to work with the record a
//! first-generation cartridge exchanges over the link cable:
//!
//! - **Types**: [`PartyRecord`] and its packed fields
//!   - [`MovePp`] - current PP and PP Ups in one byte
//!   - [`IvData`] - four IV nibbles, HP IV derived
//!   - [`Experience`] - 24-bit experience total
//!   - [`StatusCondition`] / [`PokemonType`] - raw code wrappers
//!
//! - **Codec**: bit-exact wire encoding
//!   - [`encode_core_block()`] / [`decode_core_block()`] - 44-byte battle data
//!   - [`encode_trailer()`] / [`decode_trailer()`] - nickname + OT name
//!
//! - **Building**: records from species templates
//!   - [`build_level1_record()`] - the record offered in a trade
//!   - [`RecordBuilder`] - fluent builder for other levels/IVs
//!
//! - **Text**: Gen-I charset and sentinel-padded name fields ([`text`])
//!
//! - **Validation**: optional post-decode legality check ([`check_record()`])
//!
//! # Wire Layout
//!
//! ```text
//! 0x00 species   0x01 hp(2)    0x03 box level  0x04 status  0x05 type1
//! 0x06 type2     0x07 item     0x08 moves(4)   0x0C ot id(2) 0x0E exp(3)
//! 0x11 stat exp(5x2)           0x1B iv(2)      0x1D pp(4)    0x21 level
//! 0x22 max hp(2) 0x24 atk(2)   0x26 def(2)     0x28 spd(2)   0x2A spc(2)
//! 0x2C nickname(11)            0x37 ot name(7)
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod builder;
pub mod codec;
pub mod species;
pub mod text;
pub mod types;
pub mod validate;

// Re-export types at crate root for convenience
pub use builder::{build_level1_record, RecordBuilder, MAX_LEVEL, MIN_LEVEL};
pub use codec::{
    decode_core_block, decode_party_record, decode_trailer, encode_core_block,
    encode_party_record, encode_trailer, CoreBlock, Trailer, CORE_BLOCK_SIZE, PARTY_RECORD_SIZE,
    TRAILER_SIZE,
};
pub use species::{calc_hp, calc_stat, LearnedMove, SpeciesTemplate, MAGIKARP, PIKACHU};
pub use text::{decode_name, encode_name, TERMINATOR};
pub use types::{
    Experience, IvData, MovePp, PartyRecord, PokemonType, Stats, StatusCondition,
    NICKNAME_LENGTH, OT_NAME_LENGTH,
};
pub use validate::{check_record, RecordError};
