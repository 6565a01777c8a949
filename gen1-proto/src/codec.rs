//! Wire codec for the party record.
//!
//! The record is 62 bytes on the wire: a 44-byte core block followed by an
//! 18-byte trailer (nickname, then original trainer name). All multi-byte
//! fields are little-endian. There is no checksum and decoding never fails.
//!
//! ```
//! use gen1_proto::{build_level1_record, decode_core_block, encode_core_block, MAGIKARP};
//!
//! let record = build_level1_record(&MAGIKARP, "RP2040", 0x1234);
//! let block = encode_core_block(&record);
//! assert_eq!(block[0], 0x81);
//! assert_eq!(decode_core_block(&block).species, 0x81);
//! ```

use crate::types::{
    Experience, IvData, MovePp, PartyRecord, PokemonType, Stats, StatusCondition,
    NICKNAME_LENGTH, OT_NAME_LENGTH,
};

/// Size of the core battle data block exchanged during a trade.
pub const CORE_BLOCK_SIZE: usize = 44;

/// Size of the nickname + OT name trailer.
pub const TRAILER_SIZE: usize = NICKNAME_LENGTH + OT_NAME_LENGTH;

/// Size of a full party slot on the wire.
pub const PARTY_RECORD_SIZE: usize = CORE_BLOCK_SIZE + TRAILER_SIZE;

/// Core block.
pub type CoreBlock = [u8; CORE_BLOCK_SIZE];

/// Nickname + OT name trailer.
pub type Trailer = [u8; TRAILER_SIZE];

/// Byte offsets of each field inside the core block.
pub mod offsets {
    pub const SPECIES: usize = 0x00;
    pub const CURRENT_HP: usize = 0x01;
    pub const LEVEL_IN_BOX: usize = 0x03;
    pub const STATUS: usize = 0x04;
    pub const TYPE1: usize = 0x05;
    pub const TYPE2: usize = 0x06;
    pub const HELD_ITEM: usize = 0x07;
    pub const MOVES: usize = 0x08;
    pub const OT_ID: usize = 0x0C;
    pub const EXP: usize = 0x0E;
    pub const HP_EXP: usize = 0x11;
    pub const ATTACK_EXP: usize = 0x13;
    pub const DEFENSE_EXP: usize = 0x15;
    pub const SPEED_EXP: usize = 0x17;
    pub const SPECIAL_EXP: usize = 0x19;
    pub const IV_DATA: usize = 0x1B;
    pub const PP: usize = 0x1D;
    pub const LEVEL: usize = 0x21;
    pub const MAX_HP: usize = 0x22;
    pub const ATTACK: usize = 0x24;
    pub const DEFENSE: usize = 0x26;
    pub const SPEED: usize = 0x28;
    pub const SPECIAL: usize = 0x2A;

    /// Nickname offset within the full party slot.
    pub const NICKNAME: usize = super::CORE_BLOCK_SIZE;
    /// OT name offset within the full party slot.
    pub const OT_NAME: usize = NICKNAME + super::NICKNAME_LENGTH;
}

/// Cursor that writes little-endian fields into a fixed buffer.
struct BlockWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> BlockWriter<'a> {
    #[inline]
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    fn u8(&mut self, value: u8) {
        self.buf[self.pos] = value;
        self.pos += 1;
    }

    #[inline]
    fn u16(&mut self, value: u16) {
        self.bytes(&value.to_le_bytes());
    }

    #[inline]
    fn bytes(&mut self, bytes: &[u8]) {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    #[inline]
    fn stats(&mut self, stats: &Stats) {
        self.u16(stats.hp);
        self.u16(stats.attack);
        self.u16(stats.defense);
        self.u16(stats.speed);
        self.u16(stats.special);
    }

    /// Number of bytes written.
    #[inline]
    fn finish(self) -> usize {
        self.pos
    }
}

/// Cursor that reads little-endian fields from a fixed buffer.
struct BlockReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> BlockReader<'a> {
    #[inline]
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    fn u8(&mut self) -> u8 {
        let value = self.buf[self.pos];
        self.pos += 1;
        value
    }

    #[inline]
    fn u16(&mut self) -> u16 {
        u16::from_le_bytes(self.array())
    }

    #[inline]
    fn array<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    #[inline]
    fn stats(&mut self) -> Stats {
        Stats {
            hp: self.u16(),
            attack: self.u16(),
            defense: self.u16(),
            speed: self.u16(),
            special: self.u16(),
        }
    }
}

/// Encode the 44-byte core block of a record.
#[must_use]
pub fn encode_core_block(record: &PartyRecord) -> CoreBlock {
    let mut block = [0u8; CORE_BLOCK_SIZE];
    let mut w = BlockWriter::new(&mut block);

    w.u8(record.species);
    w.u16(record.current_hp);
    w.u8(record.level_in_box);
    w.u8(record.status.raw());
    w.u8(record.type1.raw());
    w.u8(record.type2.raw());
    w.u8(record.held_item);
    w.bytes(&record.moves);
    w.u16(record.ot_id);
    w.bytes(&record.exp.to_le_bytes());
    w.stats(&record.stat_exp);
    w.u16(record.iv.raw());
    for pp in &record.pp {
        w.u8(pp.raw());
    }
    w.u8(record.level);
    w.stats(&record.stats);

    debug_assert_eq!(w.finish(), CORE_BLOCK_SIZE);
    block
}

/// Decode a 44-byte core block.
///
/// Every input maps to some record; values are not range-checked. The
/// nickname and OT name of the result are zeroed.
#[must_use]
pub fn decode_core_block(block: &CoreBlock) -> PartyRecord {
    let mut r = BlockReader::new(block);

    let species = r.u8();
    let current_hp = r.u16();
    let level_in_box = r.u8();
    let status = StatusCondition(r.u8());
    let type1 = PokemonType(r.u8());
    let type2 = PokemonType(r.u8());
    let held_item = r.u8();
    let moves = r.array::<4>();
    let ot_id = r.u16();
    let exp = Experience::from_le_bytes(r.array::<3>());
    let stat_exp = r.stats();
    let iv = IvData(r.u16());
    let pp = r.array::<4>().map(MovePp);
    let level = r.u8();
    let stats = r.stats();

    PartyRecord {
        species,
        current_hp,
        level_in_box,
        status,
        type1,
        type2,
        held_item,
        moves,
        ot_id,
        exp,
        stat_exp,
        iv,
        pp,
        level,
        stats,
        ..PartyRecord::zeroed()
    }
}

/// Encode the nickname + OT name trailer.
#[must_use]
pub fn encode_trailer(record: &PartyRecord) -> Trailer {
    let mut trailer = [0u8; TRAILER_SIZE];
    let mut w = BlockWriter::new(&mut trailer);
    w.bytes(&record.nickname);
    w.bytes(&record.ot_name);
    debug_assert_eq!(w.finish(), TRAILER_SIZE);
    trailer
}

/// Decode the trailer into `(nickname, ot_name)`.
#[must_use]
pub fn decode_trailer(trailer: &Trailer) -> ([u8; NICKNAME_LENGTH], [u8; OT_NAME_LENGTH]) {
    let mut r = BlockReader::new(trailer);
    let nickname = r.array::<NICKNAME_LENGTH>();
    let ot_name = r.array::<OT_NAME_LENGTH>();
    (nickname, ot_name)
}

/// Encode a full 62-byte party slot.
#[must_use]
pub fn encode_party_record(record: &PartyRecord) -> [u8; PARTY_RECORD_SIZE] {
    let mut out = [0u8; PARTY_RECORD_SIZE];
    out[..CORE_BLOCK_SIZE].copy_from_slice(&encode_core_block(record));
    out[CORE_BLOCK_SIZE..].copy_from_slice(&encode_trailer(record));
    out
}

/// Decode a full 62-byte party slot.
#[must_use]
pub fn decode_party_record(bytes: &[u8; PARTY_RECORD_SIZE]) -> PartyRecord {
    let mut core = [0u8; CORE_BLOCK_SIZE];
    core.copy_from_slice(&bytes[..CORE_BLOCK_SIZE]);
    let mut trailer = [0u8; TRAILER_SIZE];
    trailer.copy_from_slice(&bytes[CORE_BLOCK_SIZE..]);

    let mut record = decode_core_block(&core);
    record.apply_trailer(&trailer);
    record
}

impl PartyRecord {
    /// Overwrite the nickname and OT name from an encoded trailer.
    pub fn apply_trailer(&mut self, trailer: &Trailer) {
        let (nickname, ot_name) = decode_trailer(trailer);
        self.nickname = nickname;
        self.ot_name = ot_name;
    }
}
