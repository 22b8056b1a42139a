//! Character context captured at search start

use serde::{Deserialize, Serialize};

/// Party role the loadout is tuned for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Dealer,
    Tank,
    Healer,
    Balanced,
}

/// The five base stats
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BaseStats {
    #[serde(default)]
    pub str: f64,
    #[serde(default)]
    pub dex: f64,
    #[serde(default)]
    pub int: f64,
    #[serde(default)]
    pub wil: f64,
    #[serde(default)]
    pub luk: f64,
}

/// Derived combat stats as shown on the character sheet
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CombatStats {
    #[serde(default)]
    pub attack: f64,
    #[serde(default)]
    pub defense: f64,
    /// Critical rating
    #[serde(default)]
    pub critical: f64,
    #[serde(default)]
    pub additional_hit: f64,
    #[serde(default)]
    pub heavy_hit: f64,
    #[serde(default)]
    pub combo_hit: f64,
    #[serde(default)]
    pub skill_power: f64,
}

/// Percentage bonuses already accumulated from other sources
///
/// Only used for the diminishing-return and attack/damage balance corrections.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BonusTotals {
    #[serde(default)]
    pub attack_bonus: f64,
    #[serde(default)]
    pub damage_bonus: f64,
    #[serde(default)]
    pub crit_rate_bonus: f64,
}

/// Everything the score model needs to know about the character
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CharacterContext {
    #[serde(default)]
    pub base: BaseStats,
    #[serde(default)]
    pub combat: CombatStats,
    #[serde(default)]
    pub bonuses: BonusTotals,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub class_code: String,
}

impl CharacterContext {
    /// Create a context for the given class with zeroed stats
    pub fn new(class_code: impl Into<String>, role: Role) -> Self {
        Self {
            class_code: class_code.into(),
            role,
            ..Default::default()
        }
    }

    pub fn with_combat(mut self, combat: CombatStats) -> Self {
        self.combat = combat;
        self
    }

    pub fn with_bonuses(mut self, bonuses: BonusTotals) -> Self {
        self.bonuses = bonuses;
        self
    }

    /// Current critical hit rate as a fraction in `[0, 1]`
    ///
    /// `rating_per_percent` converts the critical rating into percentage points.
    pub fn crit_rate(&self, rating_per_percent: f64) -> f64 {
        let from_rating = if rating_per_percent > 0.0 {
            self.combat.critical / rating_per_percent
        } else {
            0.0
        };
        ((from_rating + self.bonuses.crit_rate_bonus) / 100.0).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crit_rate() {
        let ctx = CharacterContext::new("rogue", Role::Dealer)
            .with_combat(CombatStats {
                critical: 600.0,
                ..Default::default()
            })
            .with_bonuses(BonusTotals {
                crit_rate_bonus: 10.0,
                ..Default::default()
            });

        // 600 / 30 = 20%, plus 10%
        assert!((ctx.crit_rate(30.0) - 0.30).abs() < 1e-9);
    }

    #[test]
    fn test_crit_rate_clamped() {
        let ctx = CharacterContext::new("rogue", Role::Dealer).with_bonuses(BonusTotals {
            crit_rate_bonus: 250.0,
            ..Default::default()
        });
        assert_eq!(ctx.crit_rate(30.0), 1.0);
    }

    #[test]
    fn test_context_ron_defaults() {
        let ctx: CharacterContext = ron::from_str(r#"(class_code: "mage")"#).unwrap();
        assert_eq!(ctx.role, Role::Dealer);
        assert_eq!(ctx.combat.attack, 0.0);
    }
}
