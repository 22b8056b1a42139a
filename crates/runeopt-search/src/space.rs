//! Read-only search space shared by every worker of a phase

use crate::candidates::by_max;
use runeopt_core::{
    Combination, LoadoutIds, ScoredRune, SynergyResolver, ACCESSORY_SLOTS, ARMOR_SLOTS,
    TOTAL_SLOTS,
};
use std::sync::Arc;

/// Pool index per slot: weapon, 5 armors, emblem, 3 accessories
pub type SlotIndices = [usize; TOTAL_SLOTS];

pub(crate) const WEAPON_SLOT: usize = 0;
pub(crate) const ARMOR_START: usize = 1;
pub(crate) const EMBLEM_SLOT: usize = ARMOR_START + ARMOR_SLOTS;
pub(crate) const ACCESSORY_START: usize = EMBLEM_SLOT + 1;

/// `n choose k`, saturating at `u64::MAX`
pub fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        result = result * (n - i) as u128 / (i + 1) as u128;
        if result > u64::MAX as u128 {
            return u64::MAX;
        }
    }
    result as u64
}

/// Candidate pools of one phase, ordered for branch-and-bound
///
/// Every pool is sorted by `max_score` descending, so the best possible
/// completion of a partial armor or accessory choice starting at index `i`
/// is simply the next few entries. Prefix sums turn that into a lookup.
#[derive(Debug)]
pub struct SearchSpace {
    pub weapons: Vec<ScoredRune>,
    pub armors: Vec<ScoredRune>,
    pub emblems: Vec<ScoredRune>,
    pub accessories: Vec<ScoredRune>,
    pub resolver: SynergyResolver,
    armor_prefix: Vec<f64>,
    accessory_prefix: Vec<f64>,
}

impl SearchSpace {
    /// Build the space, raising amplifier bounds against the phase's pools
    pub fn new(
        weapons: Vec<ScoredRune>,
        armors: Vec<ScoredRune>,
        emblems: Vec<ScoredRune>,
        accessories: Vec<ScoredRune>,
        resolver: SynergyResolver,
    ) -> Self {
        let mut pools = [weapons, armors, emblems, accessories];

        let extras: Vec<Vec<f64>> = pools
            .iter()
            .map(|pool| {
                pool.iter()
                    .map(|rune| SynergyResolver::amplify_upper_bound(rune, pools.iter().flatten()))
                    .collect()
            })
            .collect();
        for (pool, extras) in pools.iter_mut().zip(extras) {
            for (rune, extra) in pool.iter_mut().zip(extras) {
                rune.raise_max_score(extra);
            }
            pool.sort_by(by_max);
        }

        let [weapons, armors, emblems, accessories] = pools;
        let armor_prefix = prefix_sums(&armors);
        let accessory_prefix = prefix_sums(&accessories);
        Self {
            weapons,
            armors,
            emblems,
            accessories,
            resolver,
            armor_prefix,
            accessory_prefix,
        }
    }

    /// Upper bound of `count` armors chosen from index `start` onwards
    pub fn armor_rest(&self, start: usize, count: usize) -> f64 {
        window(&self.armor_prefix, start, count)
    }

    /// Upper bound of `count` accessories chosen from index `start` onwards
    pub fn accessory_rest(&self, start: usize, count: usize) -> f64 {
        window(&self.accessory_prefix, start, count)
    }

    /// Largest emblem upper bound
    pub fn emblem_best(&self) -> f64 {
        self.emblems.first().map_or(0.0, |e| e.max_score)
    }

    /// Loadouts completing a fixed armor set
    pub fn below_armor(&self) -> u64 {
        (self.emblems.len() as u64).saturating_mul(binomial(self.accessories.len(), ACCESSORY_SLOTS))
    }

    /// Loadouts under one weapon
    pub fn per_weapon(&self) -> u64 {
        binomial(self.armors.len(), ARMOR_SLOTS).saturating_mul(self.below_armor())
    }

    /// Loadouts in the whole space
    pub fn total(&self) -> u64 {
        (self.weapons.len() as u64).saturating_mul(self.per_weapon())
    }

    /// The pool slot `slot` draws from
    pub fn pool(&self, slot: usize) -> &[ScoredRune] {
        match slot {
            WEAPON_SLOT => &self.weapons,
            s if s < EMBLEM_SLOT => &self.armors,
            EMBLEM_SLOT => &self.emblems,
            _ => &self.accessories,
        }
    }

    /// The scored rune in slot `slot` at pool index `index`
    pub fn rune_at(&self, slot: usize, index: usize) -> &ScoredRune {
        &self.pool(slot)[index]
    }

    pub fn slot_refs(&self, slots: &SlotIndices) -> [&ScoredRune; TOTAL_SLOTS] {
        std::array::from_fn(|s| self.rune_at(s, slots[s]))
    }

    pub fn combination(&self, slots: &SlotIndices) -> Combination {
        let rune = |s: usize| Arc::clone(&self.rune_at(s, slots[s]).rune);
        Combination::new(
            rune(WEAPON_SLOT),
            std::array::from_fn(|i| rune(ARMOR_START + i)),
            rune(EMBLEM_SLOT),
            std::array::from_fn(|i| rune(ACCESSORY_START + i)),
        )
    }

    pub fn ids(&self, slots: &SlotIndices) -> LoadoutIds {
        self.combination(slots).ids()
    }
}

fn prefix_sums(pool: &[ScoredRune]) -> Vec<f64> {
    let mut sums = Vec::with_capacity(pool.len() + 1);
    let mut acc = 0.0;
    sums.push(acc);
    for rune in pool {
        acc += rune.max_score;
        sums.push(acc);
    }
    sums
}

fn window(prefix: &[f64], start: usize, count: usize) -> f64 {
    let last = prefix.len() - 1;
    let end = (start + count).min(last);
    let start = start.min(end);
    prefix[end] - prefix[start]
}

#[cfg(test)]
mod tests {
    use super::*;
    use runeopt_core::{
        Amplify, AmplifyScope, Category, CharacterContext, Effect, Role, Rune, ScoreConfig,
        ScoreModel, Synergy,
    };

    fn scored(rune: Rune) -> ScoredRune {
        let ctx = CharacterContext::new("", Role::Dealer);
        ScoreModel::default().profile(Arc::new(rune), &ctx, 0)
    }

    fn plain(id: u32, category: Category, value: f64) -> ScoredRune {
        scored(Rune::new(id, format!("r{}", id), category).with_effect(Effect::permanent("피해", value)))
    }

    fn space() -> SearchSpace {
        SearchSpace::new(
            vec![plain(1, Category::Weapon, 1.0), plain(2, Category::Weapon, 3.0)],
            (0..7).map(|i| plain(10 + i, Category::Armor, i as f64)).collect(),
            vec![plain(20, Category::Emblem, 1.0), plain(21, Category::Emblem, 2.0)],
            (0..5).map(|i| plain(30 + i, Category::Accessory, i as f64)).collect(),
            SynergyResolver::new(&ScoreConfig::default()),
        )
    }

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(7, 5), 21);
        assert_eq!(binomial(5, 3), 10);
        assert_eq!(binomial(5, 5), 1);
        assert_eq!(binomial(3, 5), 0);
        assert_eq!(binomial(0, 0), 1);
        assert_eq!(binomial(100, 5), 75_287_520);
    }

    #[test]
    fn test_totals() {
        let space = space();
        assert_eq!(space.below_armor(), 2 * 10);
        assert_eq!(space.per_weapon(), 21 * 20);
        assert_eq!(space.total(), 2 * 21 * 20);
    }

    #[test]
    fn test_sorted_by_max_and_rest_bounds() {
        let space = space();
        assert_eq!(space.weapons[0].id().raw(), 2);
        assert_eq!(space.emblem_best(), 2.0);
        // armors sorted 6, 5, 4, 3, 2, 1, 0
        assert_eq!(space.armor_rest(0, 5), 6.0 + 5.0 + 4.0 + 3.0 + 2.0);
        assert_eq!(space.armor_rest(3, 2), 3.0 + 2.0);
        assert_eq!(space.armor_rest(6, 3), 0.0);
        assert_eq!(space.accessory_rest(0, 3), 4.0 + 3.0 + 2.0);
    }

    #[test]
    fn test_combination_from_indices() {
        let space = space();
        let slots: SlotIndices = [0, 0, 1, 2, 3, 4, 1, 0, 1, 2];
        let combo = space.combination(&slots);
        assert!(combo.validate().is_ok());
        assert_eq!(combo.weapon.id.raw(), 2);
        assert_eq!(combo.emblem.id.raw(), 20);
        assert_eq!(space.ids(&slots).armors[0].raw(), 16);
    }

    #[test]
    fn test_amplifier_bound_raised() {
        let target = scored(
            Rune::new(20, "각성", Category::Emblem)
                .with_awakening(10.0, 90.0, vec![Effect::permanent("피해", 20.0)]),
        );
        let amplifier = scored(Rune::new(30, "증폭", Category::Accessory).with_synergy(Synergy {
            amplify: Some(Amplify {
                target: "각성".to_string(),
                scope: AmplifyScope::Awakening,
                factor: 2.0,
            }),
            ..Default::default()
        }));
        assert_eq!(amplifier.max_score, 0.0);

        let space = SearchSpace::new(
            vec![plain(1, Category::Weapon, 1.0)],
            (0..5).map(|i| plain(10 + i, Category::Armor, 1.0)).collect(),
            vec![target],
            vec![amplifier, plain(31, Category::Accessory, 1.0), plain(32, Category::Accessory, 1.0)],
            SynergyResolver::new(&ScoreConfig::default()),
        );
        let raised = space.accessories.iter().find(|r| r.id().raw() == 30).unwrap();
        assert_eq!(raised.max_score, 20.0);
    }
}
