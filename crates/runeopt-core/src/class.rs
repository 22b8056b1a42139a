//! Class profiles and their priority effects

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Base stat a class scales with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimaryStat {
    Str,
    Dex,
    Int,
    Wil,
    Luk,
}

/// A playable class and the effect names it favors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassProfile {
    /// Class code used in character contexts and rune restrictions
    pub code: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    pub primary: PrimaryStat,
    /// Name fragments; an effect whose name contains any of them is a priority
    #[serde(default)]
    pub priorities: Vec<String>,
}

impl ClassProfile {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        primary: PrimaryStat,
        priorities: &[&str],
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            primary,
            priorities: priorities.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Whether `effect_name` matches one of this class's priorities
    pub fn prioritizes(&self, effect_name: &str) -> bool {
        self.priorities
            .iter()
            .any(|p| !p.is_empty() && effect_name.contains(p.as_str()))
    }
}

/// Class profiles keyed by code
#[derive(Debug, Clone, PartialEq)]
pub struct ClassTable {
    profiles: IndexMap<String, ClassProfile>,
}

impl ClassTable {
    /// A table with no classes
    pub fn empty() -> Self {
        Self {
            profiles: IndexMap::new(),
        }
    }

    /// The built-in class list
    pub fn builtin() -> Self {
        use PrimaryStat::*;

        let mut table = Self::empty();
        for profile in [
            ClassProfile::new("warrior", "전사", Str, &["강타", "공격력"]),
            ClassProfile::new("greatsword", "대검전사", Str, &["강타", "스킬 위력"]),
            ClassProfile::new("swordsman", "검술사", Dex, &["연타", "추가타"]),
            ClassProfile::new("archer", "궁수", Dex, &["치명타", "추가타"]),
            ClassProfile::new("crossbow", "석궁사수", Dex, &["연타", "치명타"]),
            ClassProfile::new("longbow", "장궁병", Dex, &["강타", "치명타 피해"]),
            ClassProfile::new("mage", "마법사", Int, &["스킬 위력", "치명타 피해"]),
            ClassProfile::new("fire_mage", "화염술사", Int, &["화상", "스킬 위력"]),
            ClassProfile::new("ice_mage", "빙결술사", Int, &["냉기", "스킬 위력"]),
            ClassProfile::new("healer", "힐러", Wil, &["회복", "스킬 위력"]),
            ClassProfile::new("priest", "사제", Wil, &["스킬 위력"]),
            ClassProfile::new("monk", "수도사", Wil, &["연타", "강타"]),
            ClassProfile::new("bard", "음유시인", Wil, &["스킬 위력", "공격 속도"]),
            ClassProfile::new("rogue", "도적", Luk, &["치명타", "추가타"]),
            ClassProfile::new("dual_blade", "듀얼블레이드", Luk, &["치명타", "연타"]),
            ClassProfile::new("fighter", "격투가", Str, &["연타", "추가타"]),
        ] {
            table.insert(profile);
        }
        table
    }

    /// Add or replace a profile
    pub fn insert(&mut self, profile: ClassProfile) {
        self.profiles.insert(profile.code.clone(), profile);
    }

    pub fn get(&self, code: &str) -> Option<&ClassProfile> {
        self.profiles.get(code)
    }

    /// Like [`ClassTable::get`] but an unknown code is an error
    pub fn require(&self, code: &str) -> Result<&ClassProfile> {
        self.get(code)
            .ok_or_else(|| Error::UnknownClass(code.to_string()))
    }

    /// Whether `effect_name` is a priority for the class `code`
    ///
    /// Unknown classes have no priorities.
    pub fn is_priority(&self, code: &str, effect_name: &str) -> bool {
        self.get(code).is_some_and(|p| p.prioritizes(effect_name))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassProfile> {
        self.profiles.values()
    }
}

impl Default for ClassTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luck_class_prioritizes_crit() {
        let table = ClassTable::builtin();
        let rogue = table.require("rogue").unwrap();
        assert_eq!(rogue.primary, PrimaryStat::Luk);
        assert!(table.is_priority("rogue", "치명타 확률"));
        assert!(table.is_priority("rogue", "추가타 피해"));
        assert!(!table.is_priority("rogue", "스킬 위력"));
    }

    #[test]
    fn test_unknown_class() {
        let table = ClassTable::builtin();
        assert!(!table.is_priority("nobody", "치명타 확률"));
        assert!(matches!(table.require("nobody"), Err(Error::UnknownClass(_))));
    }

    #[test]
    fn test_insert_replaces() {
        let mut table = ClassTable::builtin();
        let before = table.len();
        table.insert(ClassProfile::new("rogue", "도적", PrimaryStat::Luk, &["강타"]));
        assert_eq!(table.len(), before);
        assert!(table.is_priority("rogue", "강타"));
        assert!(!table.is_priority("rogue", "치명타 확률"));
    }
}
