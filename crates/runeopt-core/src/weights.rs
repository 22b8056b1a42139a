//! Effect weight tables
//!
//! Maps effect, demerit and trigger names to importance weights. Lookup is
//! global (the same name weighs the same on every category) and proceeds in
//! two steps:
//!
//! 1. Exact match against the table keys
//! 2. Longest registered key contained in the name, so `"강타 피해 증가"`
//!    resolves through a `"강타 피해"` entry
//!
//! Names matching nothing fall back to the table's neutral default.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Upper clamp for any looked-up weight
pub const MAX_WEIGHT: f64 = 1.5;

/// Importance weights keyed by canonical name
///
/// Tables are insertion-ordered so that equally long substring matches
/// resolve to the earliest registered key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightTable {
    #[serde(default)]
    pub effects: IndexMap<String, f64>,
    #[serde(default)]
    pub demerits: IndexMap<String, f64>,
    /// Multipliers for `Trigger` effects keyed by condition text
    #[serde(default)]
    pub triggers: IndexMap<String, f64>,
    #[serde(default = "default_effect_weight")]
    pub default_weight: f64,
    #[serde(default = "default_one")]
    pub default_demerit_weight: f64,
    #[serde(default = "default_one")]
    pub default_trigger_weight: f64,
}

fn default_effect_weight() -> f64 {
    0.75
}

fn default_one() -> f64 {
    1.0
}

const BUILTIN_EFFECTS: &[(&str, f64)] = &[
    ("공격력", 1.0),
    ("피해", 1.0),
    ("치명타 확률", 1.2),
    ("치명타 피해", 1.1),
    ("추가타", 1.1),
    ("강타", 1.0),
    ("강타 피해", 1.05),
    ("연타", 1.0),
    ("연타 피해", 1.05),
    ("스킬 위력", 1.1),
    ("스킬 피해", 1.0),
    ("보스 피해", 1.2),
    ("공격 속도", 0.9),
    ("재사용 대기시간 감소", 0.9),
    ("출혈 피해", 0.9),
    ("화상 피해", 0.9),
    ("중독 피해", 0.9),
    ("감전 피해", 0.9),
    ("냉기 피해", 0.9),
    ("최대 생명력", 0.2),
    ("방어력", 0.2),
    ("받는 피해 감소", 0.1),
    ("회복량", 0.3),
    ("이동 속도", 0.1),
];

const BUILTIN_DEMERITS: &[(&str, f64)] = &[
    ("공격력", 1.0),
    ("피해", 1.0),
    ("치명타 확률", 1.1),
    ("스킬 위력", 1.0),
    ("받는 피해 증가", 0.4),
    ("재사용 대기시간 증가", 0.6),
    ("최대 생명력", 0.2),
    ("방어력", 0.2),
    ("이동 속도", 0.1),
];

const BUILTIN_TRIGGERS: &[(&str, f64)] = &[
    ("공격 시", 1.0),
    ("스킬 사용 시", 1.0),
    ("치명타 시", 0.9),
    ("치명타 발생 시", 0.9),
    ("강타 시", 0.85),
    ("연타 시", 0.85),
    ("추가타 시", 0.85),
    ("처치 시", 0.6),
    ("피격 시", 0.5),
    ("회피 시", 0.5),
    ("보호막", 0.5),
    ("생명력", 0.6),
    ("생명력 50% 이하", 0.4),
    ("전투 시작", 0.3),
];

fn to_map(entries: &[(&str, f64)]) -> IndexMap<String, f64> {
    entries
        .iter()
        .map(|&(name, weight)| (name.to_string(), weight))
        .collect()
}

/// Exact match, then longest key contained in `name`, then `default`
fn lookup(table: &IndexMap<String, f64>, name: &str, default: f64) -> f64 {
    if let Some(&weight) = table.get(name) {
        return weight.clamp(0.0, MAX_WEIGHT);
    }

    let mut best: Option<(usize, f64)> = None;
    for (key, &weight) in table {
        if key.is_empty() || !name.contains(key.as_str()) {
            continue;
        }
        let len = key.chars().count();
        if best.map_or(true, |(best_len, _)| len > best_len) {
            best = Some((len, weight));
        }
    }

    best.map_or(default, |(_, weight)| weight)
        .clamp(0.0, MAX_WEIGHT)
}

impl WeightTable {
    /// An empty table where every name gets the neutral defaults
    pub fn empty() -> Self {
        Self {
            effects: IndexMap::new(),
            demerits: IndexMap::new(),
            triggers: IndexMap::new(),
            default_weight: default_effect_weight(),
            default_demerit_weight: default_one(),
            default_trigger_weight: default_one(),
        }
    }

    /// The built-in table of canonical effect names
    pub fn builtin() -> Self {
        Self {
            effects: to_map(BUILTIN_EFFECTS),
            demerits: to_map(BUILTIN_DEMERITS),
            triggers: to_map(BUILTIN_TRIGGERS),
            ..Self::empty()
        }
    }

    /// Base importance of a positive effect, in `[0, MAX_WEIGHT]`
    pub fn weight_of(&self, name: &str) -> f64 {
        lookup(&self.effects, name, self.default_weight)
    }

    /// Importance of a demerit, in `[0, MAX_WEIGHT]`
    pub fn demerit_weight_of(&self, name: &str) -> f64 {
        lookup(&self.demerits, name, self.default_demerit_weight)
    }

    /// Multiplier for a trigger condition, in `[0, MAX_WEIGHT]`
    pub fn trigger_weight_of(&self, trigger: &str) -> f64 {
        lookup(&self.triggers, trigger, self.default_trigger_weight)
    }

    /// Overlay `other` on top of this table
    ///
    /// Keys present in `other` replace existing weights; new keys are appended.
    /// Defaults are taken from `other`.
    pub fn merge(&mut self, other: WeightTable) {
        self.effects.extend(other.effects);
        self.demerits.extend(other.demerits);
        self.triggers.extend(other.triggers);
        self.default_weight = other.default_weight;
        self.default_demerit_weight = other.default_demerit_weight;
        self.default_trigger_weight = other.default_trigger_weight;
    }
}

impl Default for WeightTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Stat family an effect name belongs to
///
/// Drives the stat-dependent corrections of the score model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatClass {
    Defensive,
    CritRate,
    CritDamage,
    HeavyHit,
    ComboHit,
    AdditionalHit,
    SkillPower,
    Attack,
    Damage,
    Other,
}

// Checked in order; more specific fragments first.
const STAT_CLASSES: &[(&str, StatClass)] = &[
    ("받는 피해", StatClass::Defensive),
    ("방어력", StatClass::Defensive),
    ("생명력", StatClass::Defensive),
    ("회복", StatClass::Defensive),
    ("치명타 확률", StatClass::CritRate),
    ("치명타 피해", StatClass::CritDamage),
    ("강타", StatClass::HeavyHit),
    ("연타", StatClass::ComboHit),
    ("추가타", StatClass::AdditionalHit),
    ("스킬 위력", StatClass::SkillPower),
    ("공격력", StatClass::Attack),
    ("피해", StatClass::Damage),
];

impl StatClass {
    /// Classify an effect name
    pub fn of(name: &str) -> StatClass {
        STAT_CLASSES
            .iter()
            .find(|(fragment, _)| name.contains(fragment))
            .map_or(StatClass::Other, |&(_, class)| class)
    }

    /// Whether effects of this class add to damage output
    pub fn is_offensive(self) -> bool {
        !matches!(self, StatClass::Defensive | StatClass::Other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let table = WeightTable::builtin();
        assert_eq!(table.weight_of("치명타 확률"), 1.2);
    }

    #[test]
    fn test_longest_substring_match() {
        let table = WeightTable::builtin();
        // "강타 피해" (5 chars) beats "강타" and "피해"
        assert_eq!(table.weight_of("강타 피해 증가"), 1.05);
        // "받는 피해 감소" beats "피해"
        assert_eq!(table.weight_of("받는 피해 감소량"), 0.1);
    }

    #[test]
    fn test_default_weight() {
        let table = WeightTable::builtin();
        assert_eq!(table.weight_of("알 수 없는 효과"), 0.75);
        assert_eq!(table.demerit_weight_of("정체불명"), 1.0);
    }

    #[test]
    fn test_equal_length_tie_prefers_first_key() {
        let mut table = WeightTable::empty();
        table.effects.insert("가나".to_string(), 0.3);
        table.effects.insert("다라".to_string(), 0.9);
        assert_eq!(table.weight_of("가나다라"), 0.3);
    }

    #[test]
    fn test_weights_clamped() {
        let mut table = WeightTable::empty();
        table.effects.insert("과함".to_string(), 9.0);
        table.effects.insert("음수".to_string(), -1.0);
        assert_eq!(table.weight_of("과함"), MAX_WEIGHT);
        assert_eq!(table.weight_of("음수 효과"), 0.0);
    }

    #[test]
    fn test_trigger_weights() {
        let table = WeightTable::builtin();
        assert_eq!(table.trigger_weight_of("스킬 사용 시"), 1.0);
        assert_eq!(table.trigger_weight_of("생명력 50% 이하일 때"), 0.4);
        assert_eq!(table.trigger_weight_of("무언가"), 1.0);
    }

    #[test]
    fn test_merge_overrides() {
        let mut table = WeightTable::builtin();
        let mut overlay = WeightTable::empty();
        overlay.effects.insert("공격력".to_string(), 0.5);
        overlay.effects.insert("신규 효과".to_string(), 1.4);
        table.merge(overlay);

        assert_eq!(table.weight_of("공격력"), 0.5);
        assert_eq!(table.weight_of("신규 효과"), 1.4);
        assert_eq!(table.weight_of("치명타 확률"), 1.2);
    }

    #[test]
    fn test_stat_class() {
        assert_eq!(StatClass::of("치명타 확률 증가"), StatClass::CritRate);
        assert_eq!(StatClass::of("강타 피해"), StatClass::HeavyHit);
        assert_eq!(StatClass::of("공격력"), StatClass::Attack);
        assert_eq!(StatClass::of("피해 증가"), StatClass::Damage);
        assert_eq!(StatClass::of("받는 피해 감소"), StatClass::Defensive);
        assert_eq!(StatClass::of("이동 속도"), StatClass::Other);
        assert!(StatClass::Damage.is_offensive());
        assert!(!StatClass::Defensive.is_offensive());
    }
}
