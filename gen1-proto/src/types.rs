//! Party record types: PartyRecord and its bit-packed fields.

use core::ops::{BitAnd, BitOr, BitOrAssign};

/// Length of the nickname field, sentinel included.
pub const NICKNAME_LENGTH: usize = 11;

/// Length of the original trainer name field, sentinel included.
pub const OT_NAME_LENGTH: usize = 7;

/// Gen-I type code.
///
/// Any byte decodes into a `PokemonType`; use [`PokemonType::is_known`] to
/// check whether it is one of the codes the games define.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PokemonType(pub u8);

impl PokemonType {
    pub const NORMAL: Self = Self(0x00);
    pub const FIGHTING: Self = Self(0x01);
    pub const FLYING: Self = Self(0x02);
    pub const POISON: Self = Self(0x03);
    pub const GROUND: Self = Self(0x04);
    pub const ROCK: Self = Self(0x05);
    pub const BIRD: Self = Self(0x06); // Unused
    pub const BUG: Self = Self(0x07);
    pub const GHOST: Self = Self(0x08);
    pub const FIRE: Self = Self(0x14);
    pub const WATER: Self = Self(0x15);
    pub const GRASS: Self = Self(0x16);
    pub const ELECTRIC: Self = Self(0x17);
    pub const PSYCHIC: Self = Self(0x18);
    pub const ICE: Self = Self(0x19);
    pub const DRAGON: Self = Self(0x1A);

    /// Get the raw type code.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Check whether this is a type code defined by the games.
    #[must_use]
    pub const fn is_known(self) -> bool {
        matches!(self.0, 0x00..=0x08 | 0x14..=0x1A)
    }

    /// Upper-case display name, or `None` for unknown codes.
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        Some(match self.0 {
            0x00 => "NORMAL",
            0x01 => "FIGHTING",
            0x02 => "FLYING",
            0x03 => "POISON",
            0x04 => "GROUND",
            0x05 => "ROCK",
            0x06 => "BIRD",
            0x07 => "BUG",
            0x08 => "GHOST",
            0x14 => "FIRE",
            0x15 => "WATER",
            0x16 => "GRASS",
            0x17 => "ELECTRIC",
            0x18 => "PSYCHIC",
            0x19 => "ICE",
            0x1A => "DRAGON",
            _ => return None,
        })
    }
}

/// Status condition bitfield.
///
/// Bits 0-2 hold the remaining sleep turns, the upper bits flag the other
/// conditions. A value of zero means healthy.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusCondition(pub u8);

impl StatusCondition {
    pub const SLEEP_MASK: Self = Self(0b0000_0111);
    pub const POISON: Self = Self(1 << 3);
    pub const BURN: Self = Self(1 << 4);
    pub const FREEZE: Self = Self(1 << 5);
    pub const PARALYSIS: Self = Self(1 << 6);

    /// No status ailment.
    pub const HEALTHY: Self = Self(0);

    /// Check if the given condition flag(s) are set.
    #[inline]
    #[must_use]
    pub const fn contains(self, flag: StatusCondition) -> bool {
        (self.0 & flag.0) == flag.0
    }

    /// Remaining sleep turns (0 when awake).
    #[inline]
    #[must_use]
    pub const fn sleep_turns(self) -> u8 {
        self.0 & Self::SLEEP_MASK.0
    }

    #[inline]
    #[must_use]
    pub const fn is_healthy(self) -> bool {
        self.0 == 0
    }

    /// Get the raw status byte.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl BitOr for StatusCondition {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for StatusCondition {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for StatusCondition {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

/// PP byte of a move slot.
///
/// Low 6 bits are the current PP, high 2 bits count the PP Ups applied.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MovePp(pub u8);

impl MovePp {
    const CURRENT_MASK: u8 = 0x3F;

    /// Pack a current PP value (masked to 6 bits) and a PP Up count
    /// (masked to 2 bits).
    #[inline]
    #[must_use]
    pub const fn new(current: u8, pp_ups: u8) -> Self {
        Self(((pp_ups & 0x03) << 6) | (current & Self::CURRENT_MASK))
    }

    #[inline]
    #[must_use]
    pub const fn current(self) -> u8 {
        self.0 & Self::CURRENT_MASK
    }

    #[inline]
    #[must_use]
    pub const fn pp_ups(self) -> u8 {
        self.0 >> 6
    }

    /// Replace the current PP, keeping the PP Up count.
    #[inline]
    #[must_use]
    pub const fn with_current(self, current: u8) -> Self {
        Self::new(current, self.pp_ups())
    }

    /// Replace the PP Up count, keeping the current PP.
    #[inline]
    #[must_use]
    pub const fn with_pp_ups(self, pp_ups: u8) -> Self {
        Self::new(self.current(), pp_ups)
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

/// Packed individual values.
///
/// Attack occupies bits 12-15, Defense 8-11, Speed 4-7 and Special 0-3.
/// The HP IV is not stored; see [`IvData::hp`].
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IvData(pub u16);

impl IvData {
    /// Pack four 4-bit IVs. Each value is masked to 4 bits.
    #[must_use]
    pub const fn from_parts(attack: u8, defense: u8, speed: u8, special: u8) -> Self {
        Self(
            ((attack as u16 & 0xF) << 12)
                | ((defense as u16 & 0xF) << 8)
                | ((speed as u16 & 0xF) << 4)
                | (special as u16 & 0xF),
        )
    }

    #[inline]
    #[must_use]
    pub const fn attack(self) -> u8 {
        ((self.0 >> 12) & 0xF) as u8
    }

    #[inline]
    #[must_use]
    pub const fn defense(self) -> u8 {
        ((self.0 >> 8) & 0xF) as u8
    }

    #[inline]
    #[must_use]
    pub const fn speed(self) -> u8 {
        ((self.0 >> 4) & 0xF) as u8
    }

    #[inline]
    #[must_use]
    pub const fn special(self) -> u8 {
        (self.0 & 0xF) as u8
    }

    /// Derived HP IV: the low bit of Attack, Defense, Speed and Special
    /// IVs, from most to least significant.
    #[must_use]
    pub const fn hp(self) -> u8 {
        ((self.attack() & 1) << 3)
            | ((self.defense() & 1) << 2)
            | ((self.speed() & 1) << 1)
            | (self.special() & 1)
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

/// 24-bit experience total.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Experience(u32);

impl Experience {
    /// Largest value that fits the 3-byte field.
    pub const MAX: u32 = 0x00FF_FFFF;

    pub const ZERO: Self = Self(0);

    /// Create an experience value, saturating at [`Experience::MAX`].
    #[inline]
    #[must_use]
    pub const fn new(points: u32) -> Self {
        if points > Self::MAX {
            Self(Self::MAX)
        } else {
            Self(points)
        }
    }

    #[inline]
    #[must_use]
    pub const fn points(self) -> u32 {
        self.0
    }

    /// Split into the 3-byte little-endian wire triplet.
    #[must_use]
    pub const fn to_le_bytes(self) -> [u8; 3] {
        [
            (self.0 & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            ((self.0 >> 16) & 0xFF) as u8,
        ]
    }

    /// Assemble from the 3-byte little-endian wire triplet.
    #[must_use]
    pub const fn from_le_bytes(bytes: [u8; 3]) -> Self {
        Self(bytes[0] as u32 | (bytes[1] as u32) << 8 | (bytes[2] as u32) << 16)
    }
}

/// One 16-bit value per stat, in the order the record stores them.
///
/// Used both for the computed party stats and for stat experience.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Stats {
    pub hp: u16,
    pub attack: u16,
    pub defense: u16,
    pub speed: u16,
    pub special: u16,
}

impl Stats {
    pub const ZERO: Self = Self::new(0, 0, 0, 0, 0);

    #[must_use]
    pub const fn new(hp: u16, attack: u16, defense: u16, speed: u16, special: u16) -> Self {
        Self {
            hp,
            attack,
            defense,
            speed,
            special,
        }
    }
}

/// A Pokémon as held in a trade party slot.
///
/// Field order follows the wire layout; see [`crate::codec`] for offsets.
/// Names hold raw Gen-I charset bytes (see [`crate::text`]).
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PartyRecord {
    /// Species index number (internal index, not Pokédex number).
    pub species: u8,
    pub current_hp: u16,
    /// Level as stored for the PC box. Mirrors `level`.
    pub level_in_box: u8,
    pub status: StatusCondition,
    pub type1: PokemonType,
    /// Equal to `type1` for single-type species.
    pub type2: PokemonType,
    /// Catch rate byte, read as the held item when traded forward.
    pub held_item: u8,
    pub moves: [u8; 4],
    pub ot_id: u16,
    pub exp: Experience,
    pub stat_exp: Stats,
    pub iv: IvData,
    pub pp: [MovePp; 4],
    /// Level used in battle.
    pub level: u8,
    /// Computed stats; `stats.hp` is the maximum HP.
    pub stats: Stats,
    pub nickname: [u8; NICKNAME_LENGTH],
    pub ot_name: [u8; OT_NAME_LENGTH],
}

impl PartyRecord {
    /// An all-zero record, names included.
    #[must_use]
    pub const fn zeroed() -> Self {
        Self {
            species: 0,
            current_hp: 0,
            level_in_box: 0,
            status: StatusCondition::HEALTHY,
            type1: PokemonType(0),
            type2: PokemonType(0),
            held_item: 0,
            moves: [0; 4],
            ot_id: 0,
            exp: Experience::ZERO,
            stat_exp: Stats::ZERO,
            iv: IvData(0),
            pp: [MovePp(0); 4],
            level: 0,
            stats: Stats::ZERO,
            nickname: [0; NICKNAME_LENGTH],
            ot_name: [0; OT_NAME_LENGTH],
        }
    }

    /// Maximum HP (the first computed stat).
    #[inline]
    #[must_use]
    pub const fn max_hp(&self) -> u16 {
        self.stats.hp
    }

    /// Check if the species has a single type.
    #[inline]
    #[must_use]
    pub fn is_single_type(&self) -> bool {
        self.type1 == self.type2
    }

    /// Number of occupied move slots (leading non-zero move ids).
    #[must_use]
    pub fn move_count(&self) -> usize {
        self.moves.iter().take_while(|&&m| m != 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_pp_packing() {
        let pp = MovePp::new(40, 3);
        assert_eq!(pp.current(), 40);
        assert_eq!(pp.pp_ups(), 3);
        assert_eq!(pp.raw(), 0b1110_1000);

        let pp = pp.with_current(63).with_pp_ups(1);
        assert_eq!(pp.current(), 63);
        assert_eq!(pp.pp_ups(), 1);
    }

    #[test]
    fn test_move_pp_masks_out_of_range() {
        let pp = MovePp::new(0xFF, 0xFF);
        assert_eq!(pp.current(), 0x3F);
        assert_eq!(pp.pp_ups(), 3);
    }

    #[test]
    fn test_iv_nibbles() {
        let iv = IvData::from_parts(0xA, 0xB, 0xC, 0xD);
        assert_eq!(iv.raw(), 0xABCD);
        assert_eq!(iv.attack(), 0xA);
        assert_eq!(iv.defense(), 0xB);
        assert_eq!(iv.speed(), 0xC);
        assert_eq!(iv.special(), 0xD);
    }

    #[test]
    fn test_hp_iv_derived_from_low_bits() {
        // Attack odd, Defense even, Speed even, Special odd -> 0b1001
        let iv = IvData::from_parts(15, 14, 2, 1);
        assert_eq!(iv.hp(), 0b1001);
        assert_eq!(IvData(0).hp(), 0);
        assert_eq!(IvData(0xFFFF).hp(), 15);
    }

    #[test]
    fn test_experience_triplet() {
        let exp = Experience::new(0x0012_3456);
        assert_eq!(exp.to_le_bytes(), [0x56, 0x34, 0x12]);
        assert_eq!(Experience::from_le_bytes([0x56, 0x34, 0x12]), exp);
    }

    #[test]
    fn test_experience_saturates() {
        assert_eq!(Experience::new(u32::MAX).points(), Experience::MAX);
        assert_eq!(Experience::new(u32::MAX).to_le_bytes(), [0xFF; 3]);
    }

    #[test]
    fn test_status_flags() {
        let status = StatusCondition::POISON | StatusCondition::PARALYSIS;
        assert!(status.contains(StatusCondition::POISON));
        assert!(!status.contains(StatusCondition::BURN));
        assert!(!status.is_healthy());
        assert_eq!(StatusCondition(0b101).sleep_turns(), 5);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(PokemonType::WATER.name(), Some("WATER"));
        assert!(PokemonType::DRAGON.is_known());
        assert!(!PokemonType(0x09).is_known());
        assert_eq!(PokemonType(0x13).name(), None);
    }

    #[test]
    fn test_zeroed_record() {
        let record = PartyRecord::zeroed();
        assert_eq!(record, PartyRecord::default());
        assert_eq!(record.nickname, [0; NICKNAME_LENGTH]);
        assert_eq!(record.move_count(), 0);
    }
}
