//! Score model
//!
//! Turns a rune plus character context into a scalar "efficiency score"
//! estimating its damage contribution.
//!
//! # Per-effect contribution
//!
//! ```text
//! value × weight(name) × activation(kind) × stat(name) × role(name) × class(name)
//! ```
//!
//! - `activation` is the constant type weight, except that `Duration` effects
//!   use their uptime and `Decay` effects their time-averaged fraction.
//! - `stat` applies diminishing returns to critical rate and the
//!   attack/damage balance correction.
//! - `class` adds a flat bonus for the class's priority effects.
//!
//! Enhancement effects are scored identically, the awakening ability is
//! scaled by its uptime, demerits are subtracted and the grade adds a small
//! tie-breaking bonus. The final score is floored at zero.
//!
//! # Upper bound
//!
//! [`ScoreModel::max_score`] scores the same rune assuming full uptime, no
//! diminishing returns, every enhancement tier, every dormant effect active
//! and no demerits. Branch-and-bound pruning relies on it never falling
//! below what the rune can contribute inside any combination, so every
//! multiplier the bound treats as "full" is `max(1, knob)` for the
//! corresponding [`ScoreConfig`] knob. [`ScoreConfig::validate`] keeps the
//! knobs in the ranges where that holds.

use crate::class::ClassTable;
use crate::context::{CharacterContext, Role};
use crate::error::{Error, Result};
use crate::rune::{Awakening, DotType, Effect, EffectKind, Rune};
use crate::uptime::{awakening_uptime, decay_average, uptime_of, COMBAT_WINDOW, MIN_AWAKENING_COOLDOWN};
use crate::weights::{StatClass, WeightTable};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Numeric knobs of the score model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    pub permanent_weight: f64,
    pub stacking_weight: f64,
    pub trigger_weight: f64,
    pub state_weight: f64,
    /// Activation weight of a `Duration` effect missing its timings
    pub duration_fallback: f64,
    /// Activation weight of a `Decay` effect missing its decay parameters
    pub decay_fallback: f64,
    /// Reference fight length for decaying effects, in seconds
    pub combat_window: f64,
    /// Floor for reduced awakening cooldowns, in seconds
    pub min_awakening_cooldown: f64,
    /// Critical rating per percentage point of critical rate
    pub crit_rating_per_percent: f64,
    /// Lowest marginal utility of additional critical rate
    pub min_crit_utility: f64,
    /// Strength of the attack/damage balance correction
    pub balance_strength: f64,
    /// Flat bonus for class priority effects
    pub class_priority_bonus: f64,
    /// Flat bonus per grade tier
    pub grade_bonus: f64,
    /// Weight of dormant effects activated by a DoT pairing
    pub synergy_weight: f64,
    /// Multiplier on offensive effects for tanks
    pub tank_offense: f64,
    /// Multiplier on offensive effects other than skill power for healers
    pub healer_offense: f64,
    /// Multiplier on offensive effects for balanced builds
    pub balanced_offense: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            permanent_weight: 1.0,
            stacking_weight: 0.95,
            trigger_weight: 0.8,
            state_weight: 0.7,
            duration_fallback: 0.5,
            decay_fallback: 0.5,
            combat_window: COMBAT_WINDOW,
            min_awakening_cooldown: MIN_AWAKENING_COOLDOWN,
            crit_rating_per_percent: 30.0,
            min_crit_utility: 0.1,
            balance_strength: 0.6,
            class_priority_bonus: 0.25,
            grade_bonus: 0.2,
            synergy_weight: 0.8,
            tank_offense: 0.8,
            healer_offense: 0.7,
            balanced_offense: 0.9,
        }
    }
}

impl ScoreConfig {
    /// Constant weight per activation type
    ///
    /// `Duration` and `Decay` are normally computed from the effect itself;
    /// the value returned here is their fallback.
    pub fn type_weight(&self, kind: EffectKind) -> f64 {
        match kind {
            EffectKind::Permanent => self.permanent_weight,
            EffectKind::Stacking => self.stacking_weight,
            EffectKind::Trigger => self.trigger_weight,
            EffectKind::State => self.state_weight,
            EffectKind::Duration => self.duration_fallback,
            EffectKind::Decay => self.decay_fallback,
        }
    }

    /// Reject knobs that would make scores or the upper bound meaningless
    ///
    /// Every weight and multiplier must be finite and non-negative, the
    /// combat window positive and the balance strength at most 2 so the
    /// balance correction never flips sign.
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("permanent_weight", self.permanent_weight),
            ("stacking_weight", self.stacking_weight),
            ("trigger_weight", self.trigger_weight),
            ("state_weight", self.state_weight),
            ("duration_fallback", self.duration_fallback),
            ("decay_fallback", self.decay_fallback),
            ("min_awakening_cooldown", self.min_awakening_cooldown),
            ("crit_rating_per_percent", self.crit_rating_per_percent),
            ("min_crit_utility", self.min_crit_utility),
            ("class_priority_bonus", self.class_priority_bonus),
            ("synergy_weight", self.synergy_weight),
            ("tank_offense", self.tank_offense),
            ("healer_offense", self.healer_offense),
            ("balanced_offense", self.balanced_offense),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!("{} = {} must be finite and >= 0", name, value)));
            }
        }
        if !self.grade_bonus.is_finite() {
            return Err(Error::InvalidConfig(format!("grade_bonus = {} is not finite", self.grade_bonus)));
        }
        if !(self.combat_window.is_finite() && self.combat_window > 0.0) {
            return Err(Error::InvalidConfig(format!("combat_window = {} must be positive", self.combat_window)));
        }
        if !(0.0..=2.0).contains(&self.balance_strength) {
            return Err(Error::InvalidConfig(format!(
                "balance_strength = {} is outside [0, 2]",
                self.balance_strength
            )));
        }
        Ok(())
    }
}

/// Where a breakdown line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreSource {
    Effect,
    Enhance10,
    Enhance15,
    Awakening,
    Demerit,
    Grade,
}

/// One line of a score explanation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownLine {
    pub source: ScoreSource,
    pub name: String,
    pub raw_value: f64,
    pub weight: f64,
    /// Product of every factor other than the name weight
    pub multiplier: f64,
    pub contribution: f64,
}

/// Score of a single rune with its explanation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuneScore {
    pub score: f64,
    pub breakdown: Vec<BreakdownLine>,
}

/// Awakening data reduced to what the synergy resolver needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AwakeningProfile {
    pub duration: f64,
    pub cooldown: f64,
    /// Sum of `value × weight` over the awakening effects
    pub weighted: f64,
}

impl AwakeningProfile {
    /// Contribution after `cooldown_reduction` seconds of reduction
    pub fn contribution(&self, cooldown_reduction: f64, min_cooldown: f64) -> f64 {
        self.weighted
            * awakening_uptime(self.duration, self.cooldown, cooldown_reduction, min_cooldown)
    }

    /// Contribution at full uptime
    pub fn upper(&self) -> f64 {
        self.weighted.max(0.0)
    }
}

/// A rune with its cached scores and synergy inputs
///
/// Built once per search by [`ScoreModel::profile`] and shared read-only
/// with every worker.
#[derive(Debug, Clone)]
pub struct ScoredRune {
    pub rune: Arc<Rune>,
    /// Score at the search's enhancement level with no cooldown reduction
    pub base_score: f64,
    /// Optimistic upper bound on the rune's contribution in any combination
    pub max_score: f64,
    /// Score regained if this rune's demerits are removed
    pub demerit_restore: f64,
    /// Contribution of dormant effects per required DoT type
    pub dormant: [f64; DotType::COUNT],
    /// Bit mask of DoT types this rune inflicts
    pub applies: u8,
    /// Bit mask of DoT types this rune waits for, declared or implied by dormant effects
    pub requires: u8,
    pub removes_demerits: bool,
    pub cooldown_reduction: f64,
    pub awakening: Option<AwakeningProfile>,
    /// Contribution of stacking effects
    pub stacking: f64,
    /// Stacking contribution under the optimistic assumptions
    pub stacking_upper: f64,
}

impl ScoredRune {
    pub fn id(&self) -> crate::RuneId {
        self.rune.id
    }

    /// Raise the upper bound by `extra`, e.g. for pool-dependent amplifier gains
    pub fn raise_max_score(&mut self, extra: f64) {
        if extra > 0.0 {
            self.max_score += extra;
        }
    }

    /// Whether every cached number is finite
    pub fn is_finite(&self) -> bool {
        self.base_score.is_finite()
            && self.max_score.is_finite()
            && self.demerit_restore.is_finite()
            && self.dormant.iter().all(|x| x.is_finite())
            && self.stacking.is_finite()
            && self.awakening.map_or(true, |a| a.weighted.is_finite())
    }
}

/// Partial sums of a rune's score
#[derive(Debug, Default)]
struct Tally {
    effects: f64,
    awakening: f64,
    grade: f64,
    penalty: f64,
    stacking: f64,
    dormant: [f64; DotType::COUNT],
}

impl Tally {
    fn without_demerits(&self) -> f64 {
        (self.effects + self.awakening + self.grade).max(0.0)
    }

    fn score(&self) -> f64 {
        (self.effects + self.awakening + self.grade - self.penalty).max(0.0)
    }
}

/// Turns runes into scores for a given character
#[derive(Debug, Clone, Default)]
pub struct ScoreModel {
    weights: WeightTable,
    classes: ClassTable,
    config: ScoreConfig,
}

impl ScoreModel {
    pub fn new(weights: WeightTable, classes: ClassTable, config: ScoreConfig) -> Self {
        Self {
            weights,
            classes,
            config,
        }
    }

    pub fn weights(&self) -> &WeightTable {
        &self.weights
    }

    pub fn classes(&self) -> &ClassTable {
        &self.classes
    }

    pub fn config(&self) -> &ScoreConfig {
        &self.config
    }

    // ========================================================================
    // Multipliers
    // ========================================================================

    /// Activation weight of an effect
    ///
    /// With `optimistic` set, duration and decay effects count as always at
    /// full strength, or at their fallback weight if that is larger.
    pub fn activation_weight(&self, effect: &Effect, optimistic: bool) -> f64 {
        let cfg = &self.config;
        match effect.kind {
            EffectKind::Trigger => {
                let condition = effect
                    .trigger
                    .as_deref()
                    .map_or(1.0, |t| self.weights.trigger_weight_of(t));
                cfg.trigger_weight * condition
            }
            EffectKind::Duration if optimistic => cfg.duration_fallback.max(1.0),
            EffectKind::Duration => match (effect.duration, effect.cooldown) {
                (Some(duration), Some(cooldown)) => uptime_of(duration, cooldown),
                (Some(_), None) => 1.0,
                _ => cfg.duration_fallback,
            },
            EffectKind::Decay if optimistic => cfg.decay_fallback.max(1.0),
            EffectKind::Decay => match (effect.decay_rate, effect.decay_interval) {
                _ if effect.value <= 0.0 => 1.0,
                (Some(rate), Some(interval)) => {
                    decay_average(effect.value, rate, interval, cfg.combat_window) / effect.value
                }
                _ => cfg.decay_fallback,
            },
            kind => cfg.type_weight(kind),
        }
    }

    /// Diminishing returns on critical rate and the attack/damage balance correction
    pub fn stat_adjustment(&self, name: &str, ctx: &CharacterContext, optimistic: bool) -> f64 {
        match StatClass::of(name) {
            StatClass::CritRate if optimistic => self.config.min_crit_utility.max(1.0),
            StatClass::CritRate => {
                let rate = ctx.crit_rate(self.config.crit_rating_per_percent);
                (1.0 - rate).max(self.config.min_crit_utility)
            }
            StatClass::Attack => self.balance_multiplier(
                ctx.bonuses.attack_bonus,
                ctx.bonuses.damage_bonus,
            ),
            StatClass::Damage => self.balance_multiplier(
                ctx.bonuses.damage_bonus,
                ctx.bonuses.attack_bonus,
            ),
            _ => 1.0,
        }
    }

    /// `1 + (0.5 − own/(own+other)) × strength`: the under-represented side scores higher
    fn balance_multiplier(&self, own: f64, other: f64) -> f64 {
        let total = own + other;
        if total <= 0.0 {
            return 1.0;
        }
        let share = (own / total).clamp(0.0, 1.0);
        1.0 + (0.5 - share) * self.config.balance_strength
    }

    pub fn role_multiplier(&self, name: &str, ctx: &CharacterContext) -> f64 {
        let class = StatClass::of(name);
        if !class.is_offensive() {
            return 1.0;
        }
        match ctx.role {
            Role::Dealer => 1.0,
            Role::Tank => self.config.tank_offense,
            Role::Healer if class == StatClass::SkillPower => 1.0,
            Role::Healer => self.config.healer_offense,
            Role::Balanced => self.config.balanced_offense,
        }
    }

    pub fn class_multiplier(&self, name: &str, ctx: &CharacterContext) -> f64 {
        if self.classes.is_priority(&ctx.class_code, name) {
            1.0 + self.config.class_priority_bonus
        } else {
            1.0
        }
    }

    // ========================================================================
    // Scoring
    // ========================================================================

    fn effect_line(
        &self,
        effect: &Effect,
        ctx: &CharacterContext,
        source: ScoreSource,
        optimistic: bool,
    ) -> Option<BreakdownLine> {
        if !effect.dps_relevant {
            return None;
        }
        let raw_value = effect.effective_value();
        let weight = self.weights.weight_of(&effect.name);
        let multiplier = self.activation_weight(effect, optimistic)
            * self.stat_adjustment(&effect.name, ctx, optimistic)
            * self.role_multiplier(&effect.name, ctx)
            * self.class_multiplier(&effect.name, ctx);
        Some(BreakdownLine {
            source,
            name: effect.name.clone(),
            raw_value,
            weight,
            multiplier,
            contribution: raw_value * weight * multiplier,
        })
    }

    /// Effects active at `enhance_level`, tagged with their source
    fn active_effects<'a>(
        rune: &'a Rune,
        enhance_level: u8,
    ) -> impl Iterator<Item = (&'a Effect, ScoreSource)> + 'a {
        let tier10: &[Effect] = if enhance_level >= 10 { &rune.enhance.tier10 } else { &[] };
        let tier15: &[Effect] = if enhance_level >= 15 { &rune.enhance.tier15 } else { &[] };
        rune.effects
            .iter()
            .map(|e| (e, ScoreSource::Effect))
            .chain(tier10.iter().map(|e| (e, ScoreSource::Enhance10)))
            .chain(tier15.iter().map(|e| (e, ScoreSource::Enhance15)))
    }

    fn awakening_profile(&self, awakening: &Awakening) -> AwakeningProfile {
        let weighted = awakening
            .effects
            .iter()
            .filter(|e| e.dps_relevant)
            .map(|e| e.effective_value() * self.weights.weight_of(&e.name))
            .sum();
        AwakeningProfile {
            duration: awakening.duration,
            cooldown: awakening.cooldown,
            weighted,
        }
    }

    fn tally(
        &self,
        rune: &Rune,
        ctx: &CharacterContext,
        enhance_level: u8,
        cooldown_reduction: f64,
        mut lines: Option<&mut Vec<BreakdownLine>>,
    ) -> Tally {
        let mut tally = Tally::default();

        for (effect, source) in Self::active_effects(rune, enhance_level) {
            let Some(line) = self.effect_line(effect, ctx, source, false) else {
                continue;
            };
            if let Some(dot) = effect.requires_dot {
                tally.dormant[dot.index()] += line.contribution;
                continue;
            }
            tally.effects += line.contribution;
            if effect.kind == EffectKind::Stacking {
                tally.stacking += line.contribution;
            }
            if let Some(lines) = lines.as_deref_mut() {
                lines.push(line);
            }
        }

        if let Some(awakening) = &rune.awakening {
            let uptime = awakening_uptime(
                awakening.duration,
                awakening.cooldown,
                cooldown_reduction,
                self.config.min_awakening_cooldown,
            );
            for effect in awakening.effects.iter().filter(|e| e.dps_relevant) {
                let weight = self.weights.weight_of(&effect.name);
                let contribution = effect.effective_value() * weight * uptime;
                tally.awakening += contribution;
                if let Some(lines) = lines.as_deref_mut() {
                    lines.push(BreakdownLine {
                        source: ScoreSource::Awakening,
                        name: effect.name.clone(),
                        raw_value: effect.effective_value(),
                        weight,
                        multiplier: uptime,
                        contribution,
                    });
                }
            }
        }

        for demerit in &rune.demerits {
            let weight = self.weights.demerit_weight_of(&demerit.name);
            let penalty = demerit.value.abs() * weight;
            tally.penalty += penalty;
            if let Some(lines) = lines.as_deref_mut() {
                lines.push(BreakdownLine {
                    source: ScoreSource::Demerit,
                    name: demerit.name.clone(),
                    raw_value: demerit.value,
                    weight,
                    multiplier: -1.0,
                    contribution: -penalty,
                });
            }
        }

        tally.grade = rune.grade.ordinal() as f64 * self.config.grade_bonus;
        if tally.grade > 0.0 {
            if let Some(lines) = lines.as_deref_mut() {
                lines.push(BreakdownLine {
                    source: ScoreSource::Grade,
                    name: format!("{:?}", rune.grade),
                    raw_value: rune.grade.ordinal() as f64,
                    weight: self.config.grade_bonus,
                    multiplier: 1.0,
                    contribution: tally.grade,
                });
            }
        }

        tally
    }

    /// Score a rune at `enhance_level` with `cooldown_reduction` seconds of
    /// awakening cooldown reduction, with a line-by-line explanation
    pub fn score_rune(
        &self,
        rune: &Rune,
        ctx: &CharacterContext,
        enhance_level: u8,
        cooldown_reduction: f64,
    ) -> RuneScore {
        let mut breakdown = Vec::new();
        let tally = self.tally(rune, ctx, enhance_level, cooldown_reduction, Some(&mut breakdown));
        RuneScore {
            score: tally.score(),
            breakdown,
        }
    }

    /// Optimistic upper bound on a rune's contribution
    ///
    /// Full uptime, no diminishing returns, every enhancement tier, dormant
    /// effects active at full weight, demerits ignored, and only positive
    /// effect contributions counted.
    pub fn max_score(&self, rune: &Rune, ctx: &CharacterContext) -> f64 {
        self.upper_parts(rune, ctx).0
    }

    /// (upper bound, optimistic stacking contribution)
    fn upper_parts(&self, rune: &Rune, ctx: &CharacterContext) -> (f64, f64) {
        // Dormant effects are paid out at `synergy_weight` once activated
        let dormant_scale = self.config.synergy_weight.max(1.0);
        let mut total = 0.0;
        let mut stacking = 0.0;
        for (effect, source) in Self::active_effects(rune, u8::MAX) {
            if let Some(line) = self.effect_line(effect, ctx, source, true) {
                let mut contribution = line.contribution.max(0.0);
                if effect.requires_dot.is_some() {
                    contribution *= dormant_scale;
                }
                total += contribution;
                if effect.kind == EffectKind::Stacking && effect.requires_dot.is_none() {
                    stacking += contribution;
                }
            }
        }
        if let Some(awakening) = &rune.awakening {
            total += self.awakening_profile(awakening).upper();
        }
        total += rune.grade.ordinal() as f64 * self.config.grade_bonus;
        (total, stacking)
    }

    /// Build the cached per-rune data used by the reducer, search and synergy resolver
    pub fn profile(&self, rune: Arc<Rune>, ctx: &CharacterContext, enhance_level: u8) -> ScoredRune {
        let tally = self.tally(&rune, ctx, enhance_level, 0.0, None);
        let (max_score, stacking_upper) = self.upper_parts(&rune, ctx);
        let synergy = rune.synergy.clone().unwrap_or_default();
        let dormant_mask = rune
            .effects
            .iter()
            .chain(rune.enhance.all())
            .filter_map(|e| e.requires_dot)
            .fold(0, |mask, dot| mask | dot.bit());

        ScoredRune {
            base_score: tally.score(),
            max_score,
            demerit_restore: tally.without_demerits() - tally.score(),
            dormant: tally.dormant,
            applies: DotType::mask_of(&synergy.applies_dot),
            requires: DotType::mask_of(&synergy.requires_dot) | dormant_mask,
            removes_demerits: synergy.removes_demerits,
            cooldown_reduction: synergy.cooldown_reduction,
            awakening: rune.awakening.as_ref().map(|a| self.awakening_profile(a)),
            stacking: tally.stacking,
            stacking_upper,
            rune,
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::context::{BonusTotals, CombatStats};
    use crate::rune::{Category, Grade};
    use proptest::prelude::*;

    fn effect_strategy() -> impl Strategy<Value = Effect> {
        let names = prop::sample::select(vec![
            "공격력",
            "피해",
            "치명타 확률",
            "추가타",
            "강타 피해",
            "스킬 위력",
            "이동 속도",
        ]);
        (names, -5.0f64..30.0, 0usize..6, 1.0f64..20.0, 0.0f64..120.0).prop_map(
            |(name, value, kind, a, b)| match kind {
                0 => Effect::permanent(name, value),
                1 => Effect::stacking(name, value / 5.0, 5),
                2 => Effect::trigger(name, value, "피격 시"),
                3 => Effect::state(name, value),
                4 => Effect::duration(name, value, a, b),
                _ => Effect::decay(name, value.abs(), a / 4.0, a),
            },
        )
    }

    fn rune_strategy() -> impl Strategy<Value = Rune> {
        (
            prop::collection::vec(effect_strategy(), 0..4),
            prop::collection::vec(effect_strategy(), 0..2),
            prop::collection::vec(effect_strategy(), 0..2),
            0.0f64..10.0,
            prop::option::of((1.0f64..20.0, 0.0f64..120.0, 0.0f64..40.0)),
            0u8..5,
            prop::option::of(0.0f64..20.0),
        )
            .prop_map(|(effects, tier10, tier15, demerit, awakening, grade, dormant)| {
                let grade = [Grade::Common, Grade::Uncommon, Grade::Rare, Grade::Epic, Grade::Legendary]
                    [grade as usize];
                let mut rune = Rune::new(1, "p", Category::Emblem).with_grade(grade);
                rune.effects = effects;
                rune.enhance.tier10 = tier10;
                rune.enhance.tier15 = tier15;
                rune = rune.with_demerit("피해", demerit);
                if let Some((duration, cooldown, value)) = awakening {
                    rune = rune.with_awakening(duration, cooldown, vec![Effect::permanent("피해", value)]);
                }
                if let Some(value) = dormant {
                    rune = rune.with_effect(Effect::permanent("출혈 피해", value).requiring(DotType::Bleed));
                }
                rune
            })
    }

    fn context_strategy() -> impl Strategy<Value = CharacterContext> {
        (
            0.0f64..3000.0,
            -10.0f64..80.0,
            0.0f64..80.0,
            0.0f64..80.0,
            0usize..4,
            prop::sample::select(vec!["rogue", "mage", "warrior", "nobody"]),
        )
            .prop_map(|(critical, crit_bonus, attack, damage, role, class)| {
                let role = [Role::Dealer, Role::Tank, Role::Healer, Role::Balanced][role];
                CharacterContext::new(class, role)
                    .with_combat(CombatStats {
                        critical,
                        ..Default::default()
                    })
                    .with_bonuses(BonusTotals {
                        attack_bonus: attack,
                        damage_bonus: damage,
                        crit_rate_bonus: crit_bonus,
                    })
            })
    }

    fn config_strategy() -> impl Strategy<Value = ScoreConfig> {
        (0.0f64..3.0, 0.0f64..2.0, 0.0f64..3.0, 0.0f64..3.0, 0.0f64..2.0).prop_map(
            |(synergy_weight, min_crit_utility, duration_fallback, decay_fallback, balance_strength)| {
                ScoreConfig {
                    synergy_weight,
                    min_crit_utility,
                    duration_fallback,
                    decay_fallback,
                    balance_strength,
                    ..Default::default()
                }
            },
        )
    }

    proptest! {
        /// Property: the upper bound dominates the score at any enhancement level and reduction
        #[test]
        fn prop_max_score_dominates(
            rune in rune_strategy(),
            ctx in context_strategy(),
            level in 0u8..=20,
            reduction in 0.0f64..200.0,
        ) {
            let model = ScoreModel::default();
            let max = model.max_score(&rune, &ctx);
            let score = model.score_rune(&rune, &ctx, level, reduction).score;
            prop_assert!(max + 1e-9 >= score, "max {} < score {}", max, score);
        }

        /// Property: base score plus every synergy-attributable gain stays under the bound
        #[test]
        fn prop_profile_bound_covers_synergy(
            rune in rune_strategy(),
            ctx in context_strategy(),
            level in 0u8..=20,
            reduction in 0.0f64..200.0,
        ) {
            let model = ScoreModel::default();
            let p = model.profile(Arc::new(rune), &ctx, level);
            let awakening_gain = p.awakening.map_or(0.0, |a| {
                a.contribution(reduction, model.config().min_awakening_cooldown)
                    - a.contribution(0.0, model.config().min_awakening_cooldown)
            });
            let dormant: f64 = p.dormant.iter().map(|d| d * model.config().synergy_weight).sum();
            let achievable = p.base_score + p.demerit_restore + awakening_gain + dormant;
            prop_assert!(p.max_score + 1e-9 >= p.base_score);
            prop_assert!(p.max_score + 1e-9 >= achievable);
        }

        /// Property: the bound still holds when config knobs exceed one
        #[test]
        fn prop_bound_holds_for_any_valid_config(
            rune in rune_strategy(),
            ctx in context_strategy(),
            config in config_strategy(),
            level in 0u8..=20,
            reduction in 0.0f64..200.0,
        ) {
            prop_assert!(config.validate().is_ok());
            let model = ScoreModel::new(WeightTable::builtin(), ClassTable::builtin(), config);
            let p = model.profile(Arc::new(rune), &ctx, level);
            let awakening_gain = p.awakening.map_or(0.0, |a| {
                a.contribution(reduction, model.config().min_awakening_cooldown)
                    - a.contribution(0.0, model.config().min_awakening_cooldown)
            });
            let dormant: f64 = p.dormant.iter().map(|d| d * model.config().synergy_weight).sum();
            let achievable = p.base_score + p.demerit_restore + awakening_gain + dormant;
            prop_assert!(p.max_score + 1e-9 >= p.base_score);
            prop_assert!(p.max_score + 1e-9 >= achievable);
        }
    }
}
