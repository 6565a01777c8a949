//! Species templates and stat formulas.

use crate::types::{PokemonType, Stats};

/// Move index numbers used by the bundled templates.
pub mod moves {
    pub const GROWL: u8 = 0x2D;
    pub const THUNDERSHOCK: u8 = 0x54;
    pub const SPLASH: u8 = 0x96;
}

/// A move in a template's starting loadout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LearnedMove {
    pub id: u8,
    /// Base PP, without PP Ups.
    pub pp: u8,
}

impl LearnedMove {
    /// Empty move slot.
    pub const NONE: Self = Self { id: 0, pp: 0 };

    #[must_use]
    pub const fn new(id: u8, pp: u8) -> Self {
        Self { id, pp }
    }
}

/// Everything the record builder needs to know about a species.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpeciesTemplate {
    /// Internal species index (not the Pokédex number).
    pub species: u8,
    /// Upper-case species name, used as the default nickname.
    pub name: &'static str,
    pub type1: PokemonType,
    pub type2: PokemonType,
    pub base: Stats,
    /// Value of the catch rate / held item byte for traded records.
    pub held_item: u8,
    pub moves: [LearnedMove; 4],
}

pub const MAGIKARP: SpeciesTemplate = SpeciesTemplate {
    species: 0x81,
    name: "MAGIKARP",
    type1: PokemonType::WATER,
    type2: PokemonType::WATER,
    base: Stats::new(20, 10, 55, 80, 20),
    held_item: 0,
    moves: [
        LearnedMove::new(moves::SPLASH, 40),
        LearnedMove::NONE,
        LearnedMove::NONE,
        LearnedMove::NONE,
    ],
};

pub const PIKACHU: SpeciesTemplate = SpeciesTemplate {
    species: 0x54,
    name: "PIKACHU",
    type1: PokemonType::ELECTRIC,
    type2: PokemonType::ELECTRIC,
    base: Stats::new(35, 55, 30, 90, 50),
    held_item: 0,
    moves: [
        LearnedMove::new(moves::THUNDERSHOCK, 30),
        LearnedMove::new(moves::GROWL, 40),
        LearnedMove::NONE,
        LearnedMove::NONE,
    ],
};

/// Smallest integer whose square is at least `n`.
fn ceil_sqrt(n: u32) -> u32 {
    let mut root = 0;
    while root * root < n {
        root += 1;
    }
    root
}

/// Shared part of the stat formula, before the per-stat constant.
fn stat_term(base: u16, iv: u8, stat_exp: u16, level: u8) -> u32 {
    let exp_bonus = ceil_sqrt(u32::from(stat_exp)) / 4;
    ((u32::from(base) + u32::from(iv)) * 2 + exp_bonus) * u32::from(level) / 100
}

/// Non-HP stat at `level`.
#[must_use]
pub fn calc_stat(base: u16, iv: u8, stat_exp: u16, level: u8) -> u16 {
    (stat_term(base, iv, stat_exp, level) + 5) as u16
}

/// Maximum HP at `level`.
#[must_use]
pub fn calc_hp(base: u16, iv: u8, stat_exp: u16, level: u8) -> u16 {
    (stat_term(base, iv, stat_exp, level) + u32::from(level) + 10) as u16
}
