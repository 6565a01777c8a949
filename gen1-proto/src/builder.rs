//! Builder API for constructing party records from species templates.
//!
//! # Example
//!
//! ```
//! use gen1_proto::{IvData, RecordBuilder, MAGIKARP};
//!
//! let record = RecordBuilder::new(&MAGIKARP)
//!     .trainer("RED", 0x0001)
//!     .ivs(IvData::from_parts(15, 15, 15, 15))
//!     .level(5)
//!     .build();
//!
//! assert_eq!(record.level, 5);
//! assert_eq!(record.level_in_box, 5);
//! assert_eq!(record.current_hp, record.stats.hp);
//! ```

use crate::species::{calc_hp, calc_stat, SpeciesTemplate};
use crate::text::encode_name;
use crate::types::{Experience, IvData, MovePp, PartyRecord, StatusCondition, Stats};

/// Lowest level a record can be built at.
pub const MIN_LEVEL: u8 = 1;

/// Highest level a record can be built at.
pub const MAX_LEVEL: u8 = 100;

/// Build a level-1 record with zero IVs and zero stat experience.
///
/// The nickname is the species name. Only `trainer_name` and `trainer_id`
/// vary between calls for the same template.
#[must_use]
pub fn build_level1_record(
    template: &SpeciesTemplate,
    trainer_name: &str,
    trainer_id: u16,
) -> PartyRecord {
    RecordBuilder::new(template)
        .trainer(trainer_name, trainer_id)
        .build()
}

/// Fluent builder for [`PartyRecord`].
///
/// Starts from level 1, zero IVs, zero stat experience, healthy, the species
/// name as nickname and an empty trainer.
#[derive(Debug, Clone)]
#[must_use]
pub struct RecordBuilder<'a> {
    template: &'a SpeciesTemplate,
    level: u8,
    iv: IvData,
    stat_exp: Stats,
    exp: Experience,
    trainer_name: &'a str,
    trainer_id: u16,
    nickname: Option<&'a str>,
}

impl<'a> RecordBuilder<'a> {
    /// Start building a record for `template`.
    pub fn new(template: &'a SpeciesTemplate) -> Self {
        Self {
            template,
            level: MIN_LEVEL,
            iv: IvData(0),
            stat_exp: Stats::ZERO,
            exp: Experience::ZERO,
            trainer_name: "",
            trainer_id: 0,
            nickname: None,
        }
    }

    /// Set the level, clamped to `1..=100`.
    pub fn level(mut self, level: u8) -> Self {
        self.level = level.clamp(MIN_LEVEL, MAX_LEVEL);
        self
    }

    /// Set the original trainer name (ASCII) and id.
    pub fn trainer(mut self, name: &'a str, id: u16) -> Self {
        self.trainer_name = name;
        self.trainer_id = id;
        self
    }

    /// Override the nickname (ASCII). Defaults to the species name.
    pub fn nickname(mut self, nickname: &'a str) -> Self {
        self.nickname = Some(nickname);
        self
    }

    pub fn ivs(mut self, iv: IvData) -> Self {
        self.iv = iv;
        self
    }

    pub fn stat_exp(mut self, stat_exp: Stats) -> Self {
        self.stat_exp = stat_exp;
        self
    }

    /// Set the experience total. The builder does not derive it from the
    /// level.
    pub fn experience(mut self, exp: Experience) -> Self {
        self.exp = exp;
        self
    }

    /// Compute stats and assemble the record.
    #[must_use]
    pub fn build(self) -> PartyRecord {
        let t = self.template;
        let (iv, ev, level) = (self.iv, self.stat_exp, self.level);

        let stats = Stats {
            hp: calc_hp(t.base.hp, iv.hp(), ev.hp, level),
            attack: calc_stat(t.base.attack, iv.attack(), ev.attack, level),
            defense: calc_stat(t.base.defense, iv.defense(), ev.defense, level),
            speed: calc_stat(t.base.speed, iv.speed(), ev.speed, level),
            special: calc_stat(t.base.special, iv.special(), ev.special, level),
        };

        PartyRecord {
            species: t.species,
            current_hp: stats.hp,
            level_in_box: level,
            status: StatusCondition::HEALTHY,
            type1: t.type1,
            type2: t.type2,
            held_item: t.held_item,
            moves: t.moves.map(|m| m.id),
            ot_id: self.trainer_id,
            exp: self.exp,
            stat_exp: ev,
            iv,
            pp: t.moves.map(|m| MovePp::new(m.pp, 0)),
            level,
            stats,
            nickname: encode_name(self.nickname.unwrap_or(t.name)),
            ot_name: encode_name(self.trainer_name),
        }
    }
}
