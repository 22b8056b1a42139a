//! Runeopt Core - rune data model and loadout scoring
//!
//! This crate provides everything needed to value a loadout:
//! - Rune records, effects and synergy data (`Rune`, `Effect`, `Synergy`)
//! - Effect weight tables with longest-substring lookup
//! - Uptime functions for periodic, decaying and awakening effects
//! - The score model turning a rune plus character context into a number
//! - The synergy resolver for cross-slot bonuses of a complete loadout
//!
//! ## Scoring a loadout
//!
//! Per-slot scores come from [`ScoreModel::score_rune`] (or the cached
//! [`ScoredRune`] profiles built by [`ScoreModel::profile`]); cross-slot
//! bonuses come from [`SynergyResolver`]. The total of a [`Combination`] is
//! their sum, see [`Combination::evaluate`].

mod class;
mod combination;
mod context;
mod error;
mod rune;
pub mod score;
pub mod synergy;
pub mod uptime;
pub mod weights;

pub use class::{ClassProfile, ClassTable, PrimaryStat};
pub use combination::{
    Combination, LoadoutIds, LoadoutScore, ACCESSORY_SLOTS, ARMOR_SLOTS, TOTAL_SLOTS,
};
pub use context::{BaseStats, BonusTotals, CharacterContext, CombatStats, Role};
pub use error::{Error, Result};
pub use rune::{
    Amplify, AmplifyScope, Awakening, Category, Demerit, DotType, Effect, EffectKind,
    EnhanceEffects, Grade, Rune, RuneId, Synergy,
};
pub use score::{
    AwakeningProfile, BreakdownLine, RuneScore, ScoreConfig, ScoreModel, ScoreSource, ScoredRune,
};
pub use synergy::{SynergyDetail, SynergyKind, SynergyReport, SynergyResolver};
pub use weights::{StatClass, WeightTable};
