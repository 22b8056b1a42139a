//! Character profile schema

use runeopt_core::CharacterContext;
use runeopt_search::SearchOptions;
use serde::{Deserialize, Serialize};

/// A character plus the options to search with
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub context: CharacterContext,
    #[serde(default)]
    pub options: SearchOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use runeopt_core::{Grade, Role};

    #[test]
    fn test_profile_ron() {
        let ron_str = r#"
        (
            context: (
                class_code: "rogue",
                role: Dealer,
                combat: (attack: 1200.0, critical: 900.0),
                bonuses: (attack_bonus: 20.0, damage_bonus: 35.0),
            ),
            options: (
                min_grade: Rare,
                worker_count: Some(4),
                enhance_level: 15,
                top_n: 12,
            ),
        )
        "#;

        let profile: Profile = ron::from_str(ron_str).unwrap();
        assert_eq!(profile.context.class_code, "rogue");
        assert_eq!(profile.context.role, Role::Dealer);
        assert_eq!(profile.context.combat.critical, 900.0);
        assert_eq!(profile.context.combat.defense, 0.0);
        assert_eq!(profile.options.min_grade, Grade::Rare);
        assert_eq!(profile.options.worker_count, Some(4));
        assert_eq!(profile.options.top_n, 12);
        assert_eq!(profile.options.expand_k, SearchOptions::default().expand_k);
        assert!(profile.options.pruning);
    }

    #[test]
    fn test_profile_defaults() {
        let profile: Profile = ron::from_str("()").unwrap();
        assert_eq!(profile.context, CharacterContext::default());
        assert!(profile.options.two_phase);
    }
}
