//! Weight override schema
//!
//! Every table is an overlay on the built-in one: listed keys replace or
//! extend the built-in weights, everything else stays as shipped.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use runeopt_core::weights::MAX_WEIGHT;
use runeopt_core::{ClassProfile, ScoreConfig, WeightTable};
use serde::{Deserialize, Serialize};

/// Overrides for the score model's data tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeightOverrides {
    #[serde(default)]
    pub effects: IndexMap<String, f64>,
    #[serde(default)]
    pub demerits: IndexMap<String, f64>,
    #[serde(default)]
    pub triggers: IndexMap<String, f64>,
    /// Replaces the weight of effects matching no key
    #[serde(default)]
    pub default_weight: Option<f64>,
    #[serde(default)]
    pub default_demerit_weight: Option<f64>,
    #[serde(default)]
    pub default_trigger_weight: Option<f64>,
    /// Classes added to (or replacing entries of) the built-in class table
    #[serde(default)]
    pub classes: Vec<ClassProfile>,
    /// Replaces the score knobs wholesale; missing fields keep their defaults
    #[serde(default)]
    pub config: Option<ScoreConfig>,
}

impl WeightOverrides {
    /// Check every weight is finite and within `[0, MAX_WEIGHT]`
    pub fn validate(&self) -> Result<()> {
        let tables = [
            ("effects", &self.effects),
            ("demerits", &self.demerits),
            ("triggers", &self.triggers),
        ];
        for (table, entries) in tables {
            for (key, weight) in entries {
                check_weight(&format!("{}[{:?}]", table, key), *weight)?;
            }
        }
        let defaults = [
            ("default_weight", self.default_weight),
            ("default_demerit_weight", self.default_demerit_weight),
            ("default_trigger_weight", self.default_trigger_weight),
        ];
        for (field, weight) in defaults {
            if let Some(weight) = weight {
                check_weight(field, weight)?;
            }
        }
        for class in &self.classes {
            if class.code.is_empty() {
                return Err(Error::InvalidSchema("class with an empty code".to_string()));
            }
        }
        if let Some(config) = &self.config {
            config.validate()?;
        }
        Ok(())
    }

    /// Overlay the weight tables onto `table`
    pub fn apply_to(&self, table: &mut WeightTable) {
        table.merge(WeightTable {
            effects: self.effects.clone(),
            demerits: self.demerits.clone(),
            triggers: self.triggers.clone(),
            default_weight: self.default_weight.unwrap_or(table.default_weight),
            default_demerit_weight: self
                .default_demerit_weight
                .unwrap_or(table.default_demerit_weight),
            default_trigger_weight: self
                .default_trigger_weight
                .unwrap_or(table.default_trigger_weight),
        });
    }
}

fn check_weight(what: &str, weight: f64) -> Result<()> {
    if !weight.is_finite() || !(0.0..=MAX_WEIGHT).contains(&weight) {
        return Err(Error::InvalidSchema(format!(
            "{} = {} is outside [0, {}]",
            what, weight, MAX_WEIGHT
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_overrides_ron() {
        let ron_str = r#"
        (
            effects: {
                "피해": 1.3,
                "화상 피해": 1.0,
            },
            triggers: {
                "치명타 시": 0.9,
            },
            default_weight: Some(0.5),
            classes: [
                (code: "necromancer", name: "강령술사", primary: Int, priorities: ["저주"]),
            ],
            config: Some((synergy_weight: 1.0)),
        )
        "#;

        let overrides: WeightOverrides = ron::from_str(ron_str).unwrap();
        overrides.validate().unwrap();
        assert_eq!(overrides.effects.len(), 2);
        assert_eq!(overrides.classes[0].code, "necromancer");

        let config = overrides.config.as_ref().unwrap();
        assert_eq!(config.synergy_weight, 1.0);
        assert_eq!(config.combat_window, ScoreConfig::default().combat_window);
    }

    #[test]
    fn test_apply_keeps_builtin() {
        let overrides = WeightOverrides {
            effects: IndexMap::from([("피해".to_string(), 1.3)]),
            ..Default::default()
        };
        let mut table = WeightTable::builtin();
        let attack = table.weight_of("공격력");
        let fallback = table.default_weight;
        overrides.apply_to(&mut table);

        assert_eq!(table.weight_of("피해"), 1.3);
        assert_eq!(table.weight_of("공격력"), attack);
        assert_eq!(table.default_weight, fallback);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let overrides = WeightOverrides {
            demerits: IndexMap::from([("방어력".to_string(), 2.0)]),
            ..Default::default()
        };
        assert!(matches!(overrides.validate(), Err(Error::InvalidSchema(_))));

        let negative = WeightOverrides {
            default_weight: Some(-0.1),
            ..Default::default()
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let overrides: WeightOverrides =
            ron::from_str("(config: Some((synergy_weight: -1.0)))").unwrap();
        let err = overrides.validate().unwrap_err();
        assert!(matches!(err, Error::Core(runeopt_core::Error::InvalidConfig(_))));

        let boosted: WeightOverrides =
            ron::from_str("(config: Some((synergy_weight: 1.5, min_crit_utility: 1.2)))").unwrap();
        boosted.validate().unwrap();
    }
}
