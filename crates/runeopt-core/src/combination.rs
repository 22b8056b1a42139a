//! Complete loadouts

use crate::context::CharacterContext;
use crate::error::{Error, Result};
use crate::rune::{Category, Rune, RuneId};
use crate::score::{ScoreModel, ScoredRune};
use crate::synergy::{SynergyReport, SynergyResolver};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Number of armor slots in a loadout
pub const ARMOR_SLOTS: usize = 5;

/// Number of accessory slots in a loadout
pub const ACCESSORY_SLOTS: usize = 3;

/// Total number of slots in a loadout
pub const TOTAL_SLOTS: usize = 1 + ARMOR_SLOTS + 1 + ACCESSORY_SLOTS;

/// One rune per slot
#[derive(Debug, Clone)]
pub struct Combination {
    pub weapon: Arc<Rune>,
    pub armors: [Arc<Rune>; ARMOR_SLOTS],
    pub emblem: Arc<Rune>,
    pub accessories: [Arc<Rune>; ACCESSORY_SLOTS],
}

/// Rune ids of a loadout, in slot order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadoutIds {
    pub weapon: RuneId,
    pub armors: [RuneId; ARMOR_SLOTS],
    pub emblem: RuneId,
    pub accessories: [RuneId; ACCESSORY_SLOTS],
}

/// Score of a complete loadout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadoutScore {
    /// Sum of the per-slot scores
    pub base: f64,
    pub synergy: SynergyReport,
    pub total: f64,
}

impl Combination {
    pub fn new(
        weapon: Arc<Rune>,
        armors: [Arc<Rune>; ARMOR_SLOTS],
        emblem: Arc<Rune>,
        accessories: [Arc<Rune>; ACCESSORY_SLOTS],
    ) -> Self {
        Self {
            weapon,
            armors,
            emblem,
            accessories,
        }
    }

    /// Every slot in order: weapon, armors, emblem, accessories
    pub fn slots(&self) -> impl Iterator<Item = &Arc<Rune>> {
        std::iter::once(&self.weapon)
            .chain(self.armors.iter())
            .chain(std::iter::once(&self.emblem))
            .chain(self.accessories.iter())
    }

    pub fn contains(&self, id: RuneId) -> bool {
        self.slots().any(|r| r.id == id)
    }

    pub fn ids(&self) -> LoadoutIds {
        LoadoutIds {
            weapon: self.weapon.id,
            armors: std::array::from_fn(|i| self.armors[i].id),
            emblem: self.emblem.id,
            accessories: std::array::from_fn(|i| self.accessories[i].id),
        }
    }

    /// Check that every slot holds a rune of its category and that armor and
    /// accessory ids are distinct within their group
    pub fn validate(&self) -> Result<()> {
        check_category(&self.weapon, Category::Weapon)?;
        check_category(&self.emblem, Category::Emblem)?;
        for armor in &self.armors {
            check_category(armor, Category::Armor)?;
        }
        for accessory in &self.accessories {
            check_category(accessory, Category::Accessory)?;
        }
        check_distinct(&self.armors, Category::Armor)?;
        check_distinct(&self.accessories, Category::Accessory)?;
        Ok(())
    }

    /// Score the loadout: per-slot scores plus synergies
    pub fn evaluate(&self, model: &ScoreModel, ctx: &CharacterContext, enhance_level: u8) -> LoadoutScore {
        let profiles: Vec<ScoredRune> = self
            .slots()
            .map(|rune| model.profile(Arc::clone(rune), ctx, enhance_level))
            .collect();
        let slots: Vec<&ScoredRune> = profiles.iter().collect();

        let base = profiles.iter().map(|p| p.base_score).sum();
        let synergy = SynergyResolver::new(model.config()).resolve(&slots);
        LoadoutScore {
            base,
            total: base + synergy.total_bonus,
            synergy,
        }
    }
}

fn check_category(rune: &Rune, expected: Category) -> Result<()> {
    if rune.category != expected {
        return Err(Error::InvalidCombination(format!(
            "{} ({}) in a {} slot",
            rune.id, rune.category, expected
        )));
    }
    Ok(())
}

fn check_distinct(group: &[Arc<Rune>], category: Category) -> Result<()> {
    for (i, rune) in group.iter().enumerate() {
        if group[..i].iter().any(|other| other.id == rune.id) {
            return Err(Error::InvalidCombination(format!(
                "{} appears twice in the {} slots",
                rune.id, category
            )));
        }
    }
    Ok(())
}
