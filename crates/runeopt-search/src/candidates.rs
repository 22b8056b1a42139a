//! Candidate pools
//!
//! Turns the raw rune list into per-category pools of scored runes:
//!
//! 1. Filter by category, grade and class restriction
//! 2. Drop malformed runes (logged, never fatal) and duplicate ids
//! 3. Profile every survivor with the score model
//! 4. Fail if a category cannot fill its slots
//!
//! The resulting [`RankedPools`] are sorted by base score and serve as the
//! reference ranking for both the top-N reduction of phase 1 and the ±K
//! expansion of phase 2.

use crate::error::{Error, Result};
use log::{debug, warn};
use runeopt_core::{
    CharacterContext, Category, Grade, Rune, RuneId, ScoreModel, ScoredRune,
};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

/// Scored runes per category, best base score first
#[derive(Debug, Clone, Default)]
pub struct RankedPools {
    pub weapons: Vec<ScoredRune>,
    pub armors: Vec<ScoredRune>,
    pub emblems: Vec<ScoredRune>,
    pub accessories: Vec<ScoredRune>,
}

impl RankedPools {
    pub fn pool(&self, category: Category) -> &[ScoredRune] {
        match category {
            Category::Weapon => &self.weapons,
            Category::Armor => &self.armors,
            Category::Emblem => &self.emblems,
            Category::Accessory => &self.accessories,
        }
    }

    fn pool_mut(&mut self, category: Category) -> &mut Vec<ScoredRune> {
        match category {
            Category::Weapon => &mut self.weapons,
            Category::Armor => &mut self.armors,
            Category::Emblem => &mut self.emblems,
            Category::Accessory => &mut self.accessories,
        }
    }

    /// Check every category can fill its slots
    pub fn check_sufficient(&self) -> Result<()> {
        for category in Category::ALL {
            let available = self.pool(category).len();
            let required = category.slot_count();
            if available == 0 {
                return Err(Error::EmptyPool(category));
            }
            if available < required {
                return Err(Error::InsufficientRunes {
                    category,
                    required,
                    available,
                });
            }
        }
        Ok(())
    }
}

/// Descending by `key`, ties broken by ascending id
fn rank_by(a: &ScoredRune, b: &ScoredRune, key: fn(&ScoredRune) -> f64) -> Ordering {
    key(b)
        .total_cmp(&key(a))
        .then_with(|| a.id().cmp(&b.id()))
}

pub(crate) fn by_base(a: &ScoredRune, b: &ScoredRune) -> Ordering {
    rank_by(a, b, |r| r.base_score)
}

pub(crate) fn by_max(a: &ScoredRune, b: &ScoredRune) -> Ordering {
    rank_by(a, b, |r| r.max_score)
}

/// Filter, validate and score `runes`, then check every category can be filled
///
/// `ctx` must already carry the search's role and class overrides.
pub fn prepare(
    runes: &[Arc<Rune>],
    model: &ScoreModel,
    ctx: &CharacterContext,
    min_grade: Grade,
    enhance_level: u8,
) -> Result<RankedPools> {
    model.config().validate()?;
    if !ctx.class_code.is_empty() {
        model.classes().require(&ctx.class_code)?;
    }

    let mut pools = RankedPools::default();
    let mut seen: HashSet<(Category, RuneId)> = HashSet::new();
    let mut filtered = 0usize;

    for rune in runes {
        if rune.grade < min_grade || !rune.usable_by(&ctx.class_code) {
            filtered += 1;
            continue;
        }
        if let Err(e) = rune.validate() {
            warn!("excluding {}: {}", rune.id, e);
            continue;
        }
        if !seen.insert((rune.category, rune.id)) {
            warn!("excluding duplicate {} in the {} pool", rune.id, rune.category);
            continue;
        }
        let scored = model.profile(Arc::clone(rune), ctx, enhance_level);
        if !scored.is_finite() {
            warn!("excluding {}: score is not finite", rune.id);
            continue;
        }
        pools.pool_mut(rune.category).push(scored);
    }

    for category in Category::ALL {
        pools.pool_mut(category).sort_by(by_base);
    }
    debug!(
        "candidate pools: {} weapons, {} armors, {} emblems, {} accessories ({} filtered out)",
        pools.weapons.len(),
        pools.armors.len(),
        pools.emblems.len(),
        pools.accessories.len(),
        filtered
    );

    pools.check_sufficient()?;
    Ok(pools)
}

/// Union of the top `n` by base score and the top `n` by max score
///
/// Keeps runes competitive either on average or in the best case. The
/// result follows the order of `pool`.
pub fn reduce(pool: &[ScoredRune], n: usize) -> Vec<ScoredRune> {
    if pool.len() <= n {
        return pool.to_vec();
    }

    let mut by_base_rank: Vec<&ScoredRune> = pool.iter().collect();
    by_base_rank.sort_by(|a, b| by_base(a, b));
    let mut by_max_rank: Vec<&ScoredRune> = pool.iter().collect();
    by_max_rank.sort_by(|a, b| by_max(a, b));

    let keep: HashSet<RuneId> = by_base_rank
        .iter()
        .take(n)
        .chain(by_max_rank.iter().take(n))
        .map(|r| r.id())
        .collect();

    pool.iter().filter(|r| keep.contains(&r.id())).cloned().collect()
}

/// `current` plus the `k` neighbors on each side of every pick in `ranked`
///
/// The result follows the order of `ranked`; picks missing from `ranked`
/// contribute nothing.
pub fn expand(
    ranked: &[ScoredRune],
    current: &[ScoredRune],
    picks: &[RuneId],
    k: usize,
) -> Vec<ScoredRune> {
    let mut keep: HashSet<RuneId> = current.iter().map(|r| r.id()).collect();
    for pick in picks {
        if let Some(pos) = ranked.iter().position(|r| r.id() == *pick) {
            let lo = pos.saturating_sub(k);
            let hi = (pos + k).min(ranked.len() - 1);
            keep.extend(ranked[lo..=hi].iter().map(|r| r.id()));
        }
    }
    ranked.iter().filter(|r| keep.contains(&r.id())).cloned().collect()
}
