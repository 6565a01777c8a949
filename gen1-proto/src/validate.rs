//! Optional legality checks for decoded records.
//!
//! The codec accepts any bytes. Callers that want to reject records a real
//! cartridge would never produce run [`check_record`] after decoding.

use crate::builder::{MAX_LEVEL, MIN_LEVEL};
use crate::types::PartyRecord;

/// Why a record failed [`check_record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordError {
    /// Species index is zero.
    NoSpecies,
    /// Level outside `1..=100`.
    LevelOutOfRange(u8),
    /// `level` and `level_in_box` disagree.
    LevelMismatch { level: u8, level_in_box: u8 },
    /// Current HP exceeds maximum HP.
    HpAboveMax,
    /// A type byte is not a known type code.
    UnknownType(u8),
    /// A move id follows an empty move slot.
    MoveGap(u8),
}

impl core::fmt::Display for RecordError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoSpecies => write!(f, "no species"),
            Self::LevelOutOfRange(level) => write!(f, "level {} out of range", level),
            Self::LevelMismatch {
                level,
                level_in_box,
            } => write!(f, "level {} does not match box level {}", level, level_in_box),
            Self::HpAboveMax => write!(f, "current HP above maximum"),
            Self::UnknownType(code) => write!(f, "unknown type 0x{:02X}", code),
            Self::MoveGap(slot) => write!(f, "move in slot {} follows an empty slot", slot + 1),
        }
    }
}

/// Check a record for values the games never produce.
///
/// # Errors
///
/// Returns the first [`RecordError`] found.
pub fn check_record(record: &PartyRecord) -> Result<(), RecordError> {
    if record.species == 0 {
        return Err(RecordError::NoSpecies);
    }

    if !(MIN_LEVEL..=MAX_LEVEL).contains(&record.level) {
        return Err(RecordError::LevelOutOfRange(record.level));
    }

    if record.level != record.level_in_box {
        return Err(RecordError::LevelMismatch {
            level: record.level,
            level_in_box: record.level_in_box,
        });
    }

    if record.current_hp > record.max_hp() {
        return Err(RecordError::HpAboveMax);
    }

    for ty in [record.type1, record.type2] {
        if !ty.is_known() {
            return Err(RecordError::UnknownType(ty.raw()));
        }
    }

    let occupied = record.move_count();
    if let Some(slot) = record.moves[occupied..].iter().position(|&m| m != 0) {
        return Err(RecordError::MoveGap((occupied + slot) as u8));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_level1_record;
    use crate::species::{MAGIKARP, PIKACHU};
    use crate::types::PokemonType;

    #[test]
    fn test_built_records_are_legal() {
        assert_eq!(check_record(&build_level1_record(&MAGIKARP, "RP2040", 1)), Ok(()));
        assert_eq!(check_record(&build_level1_record(&PIKACHU, "RP2040", 1)), Ok(()));
    }

    #[test]
    fn test_zeroed_record_rejected() {
        assert_eq!(check_record(&PartyRecord::zeroed()), Err(RecordError::NoSpecies));
    }

    #[test]
    fn test_level_mismatch() {
        let mut pkm = build_level1_record(&MAGIKARP, "RP2040", 1);
        pkm.level_in_box = 2;
        assert_eq!(
            check_record(&pkm),
            Err(RecordError::LevelMismatch {
                level: 1,
                level_in_box: 2
            })
        );
    }

    #[test]
    fn test_level_out_of_range() {
        let mut pkm = build_level1_record(&MAGIKARP, "RP2040", 1);
        pkm.level = 101;
        pkm.level_in_box = 101;
        assert_eq!(check_record(&pkm), Err(RecordError::LevelOutOfRange(101)));
    }

    #[test]
    fn test_hp_above_max() {
        let mut pkm = build_level1_record(&MAGIKARP, "RP2040", 1);
        pkm.current_hp = pkm.max_hp() + 1;
        assert_eq!(check_record(&pkm), Err(RecordError::HpAboveMax));
    }

    #[test]
    fn test_unknown_type() {
        let mut pkm = build_level1_record(&MAGIKARP, "RP2040", 1);
        pkm.type2 = PokemonType(0x10);
        assert_eq!(check_record(&pkm), Err(RecordError::UnknownType(0x10)));
    }

    #[test]
    fn test_move_gap() {
        let mut pkm = build_level1_record(&MAGIKARP, "RP2040", 1);
        pkm.moves[2] = 0x21;
        assert_eq!(check_record(&pkm), Err(RecordError::MoveGap(2)));
    }
}
