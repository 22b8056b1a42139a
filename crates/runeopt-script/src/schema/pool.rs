//! Rune pool schema

use runeopt_core::Rune;
use serde::{Deserialize, Serialize};

/// The runes a player owns
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunePool {
    #[serde(default)]
    pub runes: Vec<Rune>,
}
