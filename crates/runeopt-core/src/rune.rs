//! Rune records and their effects
//!
//! Runes arrive fully structured from an upstream extraction step and are
//! treated as immutable for the duration of a search.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a rune
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuneId(pub u32);

impl RuneId {
    /// Create a new rune ID
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for RuneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rune:{}", self.0)
    }
}

/// Equipment category a rune can be slotted into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Weapon,
    Armor,
    Emblem,
    Accessory,
}

impl Category {
    /// All categories in slot order
    pub const ALL: [Category; 4] = [
        Category::Weapon,
        Category::Armor,
        Category::Emblem,
        Category::Accessory,
    ];

    /// Number of slots of this category in a loadout
    pub fn slot_count(self) -> usize {
        match self {
            Category::Weapon => 1,
            Category::Armor => 5,
            Category::Emblem => 1,
            Category::Accessory => 3,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Weapon => "weapon",
            Category::Armor => "armor",
            Category::Emblem => "emblem",
            Category::Accessory => "accessory",
        };
        f.write_str(name)
    }
}

/// Rarity tier, ordered from most common to rarest
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Grade {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Grade {
    /// Ordinal priority (0 for `Common`)
    pub fn ordinal(self) -> u8 {
        self as u8
    }
}

/// How an effect is activated during combat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Always active
    Permanent,
    /// Builds up stacks; scored at maximum stacks
    Stacking,
    /// Fires on a combat condition described by `Effect::trigger`
    Trigger,
    /// Active while the character is in some state
    State,
    /// Active for `duration` seconds every `duration + cooldown` seconds
    Duration,
    /// Starts at full value and fades over time
    Decay,
}

/// Damage-over-time conditions that runes can inflict or depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DotType {
    Bleed,
    Burn,
    Poison,
    Shock,
    Frost,
}

impl DotType {
    /// All DoT types in index order
    pub const ALL: [DotType; 5] = [
        DotType::Bleed,
        DotType::Burn,
        DotType::Poison,
        DotType::Shock,
        DotType::Frost,
    ];

    /// Number of DoT types
    pub const COUNT: usize = 5;

    /// Dense index of this type
    pub fn index(self) -> usize {
        self as usize
    }

    /// Single-bit mask for this type
    pub fn bit(self) -> u8 {
        1 << self.index()
    }

    /// Fold a list of DoT types into a bit mask
    pub fn mask_of(types: &[DotType]) -> u8 {
        types.iter().fold(0, |acc, t| acc | t.bit())
    }
}

fn default_true() -> bool {
    true
}

/// A single positive effect granted by a rune
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    /// Canonical effect name, used for weight lookup
    pub name: String,
    /// Magnitude (for `Decay`, the initial value)
    pub value: f64,
    /// Activation type
    pub kind: EffectKind,
    /// Free-text trigger condition, only used for weight lookup
    #[serde(default)]
    pub trigger: Option<String>,
    /// Active duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    /// Cooldown in seconds
    #[serde(default)]
    pub cooldown: Option<f64>,
    /// Maximum stack count for `Stacking` effects
    #[serde(default)]
    pub max_stacks: Option<u32>,
    /// Value per stack for `Stacking` effects
    #[serde(default)]
    pub value_per_stack: Option<f64>,
    /// Amount lost every `decay_interval` seconds for `Decay` effects
    #[serde(default)]
    pub decay_rate: Option<f64>,
    /// Seconds between decay steps
    #[serde(default)]
    pub decay_interval: Option<f64>,
    /// Effects flagged false (pure survivability etc.) are never scored
    #[serde(default = "default_true")]
    pub dps_relevant: bool,
    /// Dormant unless another equipped rune inflicts this DoT
    #[serde(default)]
    pub requires_dot: Option<DotType>,
}

impl Effect {
    fn base(name: impl Into<String>, value: f64, kind: EffectKind) -> Self {
        Self {
            name: name.into(),
            value,
            kind,
            trigger: None,
            duration: None,
            cooldown: None,
            max_stacks: None,
            value_per_stack: None,
            decay_rate: None,
            decay_interval: None,
            dps_relevant: true,
            requires_dot: None,
        }
    }

    /// An always-active effect
    pub fn permanent(name: impl Into<String>, value: f64) -> Self {
        Self::base(name, value, EffectKind::Permanent)
    }

    /// A stacking effect; `value` is the fully stacked magnitude
    pub fn stacking(name: impl Into<String>, value_per_stack: f64, max_stacks: u32) -> Self {
        let mut effect = Self::base(
            name,
            value_per_stack * max_stacks as f64,
            EffectKind::Stacking,
        );
        effect.value_per_stack = Some(value_per_stack);
        effect.max_stacks = Some(max_stacks);
        effect
    }

    /// An effect that fires on the given condition
    pub fn trigger(name: impl Into<String>, value: f64, trigger: impl Into<String>) -> Self {
        let mut effect = Self::base(name, value, EffectKind::Trigger);
        effect.trigger = Some(trigger.into());
        effect
    }

    /// An effect active while in some character state
    pub fn state(name: impl Into<String>, value: f64) -> Self {
        Self::base(name, value, EffectKind::State)
    }

    /// A periodic effect with the given duration and cooldown
    pub fn duration(name: impl Into<String>, value: f64, duration: f64, cooldown: f64) -> Self {
        let mut effect = Self::base(name, value, EffectKind::Duration);
        effect.duration = Some(duration);
        effect.cooldown = Some(cooldown);
        effect
    }

    /// A burst effect that loses `rate` every `interval` seconds
    pub fn decay(name: impl Into<String>, initial: f64, rate: f64, interval: f64) -> Self {
        let mut effect = Self::base(name, initial, EffectKind::Decay);
        effect.decay_rate = Some(rate);
        effect.decay_interval = Some(interval);
        effect
    }

    /// Mark this effect as irrelevant to damage output
    pub fn not_dps(mut self) -> Self {
        self.dps_relevant = false;
        self
    }

    /// Make this effect dormant until `dot` is applied by another rune
    pub fn requiring(mut self, dot: DotType) -> Self {
        self.requires_dot = Some(dot);
        self
    }

    /// Magnitude used for scoring: stacking effects are taken at max stacks
    pub fn effective_value(&self) -> f64 {
        match (self.kind, self.value_per_stack, self.max_stacks) {
            (EffectKind::Stacking, Some(per_stack), Some(stacks)) => per_stack * stacks as f64,
            _ => self.value,
        }
    }

    fn validate(&self, id: RuneId) -> Result<()> {
        let malformed = |reason: String| Error::MalformedRune { id, reason };

        let numbers = [
            ("value", Some(self.value)),
            ("duration", self.duration),
            ("cooldown", self.cooldown),
            ("value_per_stack", self.value_per_stack),
            ("decay_rate", self.decay_rate),
            ("decay_interval", self.decay_interval),
        ];
        for (field, number) in numbers {
            if let Some(x) = number {
                if !x.is_finite() {
                    return Err(malformed(format!("{} of '{}' is not finite", field, self.name)));
                }
            }
        }
        for (field, number) in [("duration", self.duration), ("cooldown", self.cooldown)] {
            if number.is_some_and(|x| x < 0.0) {
                return Err(malformed(format!("{} of '{}' is negative", field, self.name)));
            }
        }
        if self.max_stacks.is_some() != self.value_per_stack.is_some() {
            return Err(malformed(format!(
                "'{}' sets only one of max_stacks/value_per_stack",
                self.name
            )));
        }
        Ok(())
    }
}

/// A negative effect subtracted from a rune's score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demerit {
    pub name: String,
    pub value: f64,
}

impl Demerit {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Bonus effects unlocked by enhancing a rune
///
/// At level 15 both tiers apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnhanceEffects {
    #[serde(default)]
    pub tier10: Vec<Effect>,
    #[serde(default)]
    pub tier15: Vec<Effect>,
}

impl EnhanceEffects {
    /// Every enhancement effect regardless of level
    pub fn all(&self) -> impl Iterator<Item = &Effect> {
        self.tier10.iter().chain(self.tier15.iter())
    }
}

/// Periodic emblem ability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Awakening {
    /// Active seconds per activation
    pub duration: f64,
    /// Base cooldown in seconds
    pub cooldown: f64,
    #[serde(default)]
    pub effects: Vec<Effect>,
}

/// Which contribution of the target an amplifier multiplies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmplifyScope {
    /// The target's awakening contribution
    Awakening,
    /// The target's stacking effects
    Stacking,
}

/// Multiplies part of another named rune's contribution when both are equipped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amplify {
    /// Name of the rune being amplified
    pub target: String,
    pub scope: AmplifyScope,
    /// Total multiplier, e.g. 2.0 doubles the scoped contribution
    pub factor: f64,
}

/// Cross-rune interaction data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Synergy {
    #[serde(default)]
    pub applies_dot: Vec<DotType>,
    #[serde(default)]
    pub requires_dot: Vec<DotType>,
    #[serde(default)]
    pub removes_demerits: bool,
    /// Seconds shaved off the emblem's awakening cooldown (armor only)
    #[serde(default)]
    pub cooldown_reduction: f64,
    #[serde(default)]
    pub amplify: Option<Amplify>,
}

/// An equippable rune
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rune {
    pub id: RuneId,
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub grade: Grade,
    #[serde(default)]
    pub effects: Vec<Effect>,
    #[serde(default)]
    pub demerits: Vec<Demerit>,
    #[serde(default)]
    pub enhance: EnhanceEffects,
    #[serde(default)]
    pub awakening: Option<Awakening>,
    #[serde(default)]
    pub synergy: Option<Synergy>,
    /// Classes allowed to equip this rune; empty means every class
    #[serde(default)]
    pub classes: Vec<String>,
}

impl Rune {
    /// Create a rune with no effects
    pub fn new(id: u32, name: impl Into<String>, category: Category) -> Self {
        Self {
            id: RuneId(id),
            name: name.into(),
            category,
            grade: Grade::Common,
            effects: Vec::new(),
            demerits: Vec::new(),
            enhance: EnhanceEffects::default(),
            awakening: None,
            synergy: None,
            classes: Vec::new(),
        }
    }

    pub fn with_grade(mut self, grade: Grade) -> Self {
        self.grade = grade;
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_demerit(mut self, name: impl Into<String>, value: f64) -> Self {
        self.demerits.push(Demerit::new(name, value));
        self
    }

    /// Add an enhancement effect unlocked at `tier` (10 or 15)
    pub fn with_enhance(mut self, tier: u8, effect: Effect) -> Self {
        if tier >= 15 {
            self.enhance.tier15.push(effect);
        } else {
            self.enhance.tier10.push(effect);
        }
        self
    }

    pub fn with_awakening(mut self, duration: f64, cooldown: f64, effects: Vec<Effect>) -> Self {
        self.awakening = Some(Awakening {
            duration,
            cooldown,
            effects,
        });
        self
    }

    pub fn with_synergy(mut self, synergy: Synergy) -> Self {
        self.synergy = Some(synergy);
        self
    }

    pub fn with_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes = classes.into_iter().map(Into::into).collect();
        self
    }

    /// Whether a character of `class_code` may equip this rune
    pub fn usable_by(&self, class_code: &str) -> bool {
        self.classes.is_empty() || self.classes.iter().any(|c| c == class_code)
    }

    /// Check that every number is usable by the score model
    pub fn validate(&self) -> Result<()> {
        let malformed = |reason: String| Error::MalformedRune {
            id: self.id,
            reason,
        };

        for effect in self.effects.iter().chain(self.enhance.all()) {
            effect.validate(self.id)?;
        }
        for demerit in &self.demerits {
            if !demerit.value.is_finite() {
                return Err(malformed(format!("demerit '{}' is not finite", demerit.name)));
            }
        }
        if let Some(awakening) = &self.awakening {
            if !(awakening.duration.is_finite() && awakening.duration > 0.0) {
                return Err(malformed("awakening duration must be positive".to_string()));
            }
            if !(awakening.cooldown.is_finite() && awakening.cooldown >= 0.0) {
                return Err(malformed("awakening cooldown must be non-negative".to_string()));
            }
            for effect in &awakening.effects {
                effect.validate(self.id)?;
            }
        }
        if let Some(synergy) = &self.synergy {
            if !(synergy.cooldown_reduction.is_finite() && synergy.cooldown_reduction >= 0.0) {
                return Err(malformed("cooldown reduction must be non-negative".to_string()));
            }
            if let Some(amplify) = &synergy.amplify {
                if !(amplify.factor.is_finite() && amplify.factor >= 0.0) {
                    return Err(malformed(format!(
                        "amplify factor {} is invalid",
                        amplify.factor
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rune_id() {
        let id = RuneId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(format!("{}", id), "rune:42");
    }

    #[test]
    fn test_slot_counts() {
        let total: usize = Category::ALL.iter().map(|c| c.slot_count()).sum();
        assert_eq!(total, 10);
    }

    #[test]
    fn test_grade_order() {
        assert!(Grade::Legendary > Grade::Epic);
        assert_eq!(Grade::Common.ordinal(), 0);
        assert_eq!(Grade::Legendary.ordinal(), 4);
    }

    #[test]
    fn test_dot_mask() {
        let mask = DotType::mask_of(&[DotType::Bleed, DotType::Poison]);
        assert_ne!(mask & DotType::Bleed.bit(), 0);
        assert_ne!(mask & DotType::Poison.bit(), 0);
        assert_eq!(mask & DotType::Burn.bit(), 0);
    }

    #[test]
    fn test_stacking_effective_value() {
        let effect = Effect::stacking("공격력", 2.0, 5);
        assert_eq!(effect.effective_value(), 10.0);
    }

    #[test]
    fn test_enhance_tiers() {
        let rune = Rune::new(1, "검", Category::Weapon)
            .with_enhance(10, Effect::permanent("공격력", 1.0))
            .with_enhance(15, Effect::permanent("피해", 2.0));

        assert_eq!(rune.enhance.tier10[0].name, "공격력");
        assert_eq!(rune.enhance.tier15[0].name, "피해");
        assert_eq!(rune.enhance.all().count(), 2);
    }

    #[test]
    fn test_usable_by() {
        let open = Rune::new(1, "a", Category::Armor);
        let locked = Rune::new(2, "b", Category::Armor).with_classes(["rogue"]);
        assert!(open.usable_by("mage"));
        assert!(locked.usable_by("rogue"));
        assert!(!locked.usable_by("mage"));
    }

    #[test]
    fn test_validate_rejects_nan() {
        let rune = Rune::new(7, "bad", Category::Armor)
            .with_effect(Effect::permanent("피해", f64::NAN));
        match rune.validate() {
            Err(Error::MalformedRune { id, .. }) => assert_eq!(id, RuneId(7)),
            other => panic!("expected malformed rune, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_half_stacking() {
        let mut effect = Effect::permanent("피해", 5.0);
        effect.kind = EffectKind::Stacking;
        effect.max_stacks = Some(3);
        let rune = Rune::new(8, "half", Category::Armor).with_effect(effect);
        assert!(rune.validate().is_err());
    }

    #[test]
    fn test_rune_ron() {
        let ron_str = r#"
        (
            id: 3,
            name: "출혈의 룬",
            category: Armor,
            grade: Epic,
            effects: [
                (name: "피해", value: 5.0, kind: Permanent),
                (name: "출혈 피해", value: 8.0, kind: Permanent, requires_dot: Some(Bleed)),
            ],
            synergy: Some((applies_dot: [Bleed])),
        )
        "#;

        let rune: Rune = ron::from_str(ron_str).unwrap();
        assert_eq!(rune.id, RuneId(3));
        assert_eq!(rune.grade, Grade::Epic);
        assert_eq!(rune.effects.len(), 2);
        assert!(rune.effects[0].dps_relevant);
        assert_eq!(rune.effects[1].requires_dot, Some(DotType::Bleed));
        assert!(rune.validate().is_ok());
    }
}
