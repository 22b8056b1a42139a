//! Synergy resolver
//!
//! Cross-slot bonuses that only exist once a loadout is complete:
//!
//! - **DoT pairing**: a rune's dormant effects waiting on a DoT type wake up
//!   when another equipped rune inflicts it, at the synergy weight.
//! - **Demerit removal**: while a removal rune is equipped, every other rune
//!   gets its demerit penalty back, once no matter how many removers there are.
//! - **Cooldown reduction**: armor reduction is summed and the emblem's
//!   awakening is re-scored with it.
//! - **Amplify**: a rune multiplies part of a named rune in another slot.
//!
//! Every bonus is additive on top of the per-slot base scores. The resolver
//! works on cached [`ScoredRune`] profiles so the search can call
//! [`SynergyResolver::bonus`] at every leaf without allocating.

use crate::rune::{AmplifyScope, Category, DotType, RuneId};
use crate::score::{ScoreConfig, ScoredRune};
use serde::{Deserialize, Serialize};

/// Which synergy rule produced a bonus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SynergyKind {
    DotPairing(DotType),
    DemeritRemoval,
    CooldownReduction,
    Amplify(AmplifyScope),
}

/// One applied synergy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynergyDetail {
    pub kind: SynergyKind,
    /// Rune enabling the bonus
    pub source: RuneId,
    /// Rune whose contribution changes
    pub target: RuneId,
    pub bonus: f64,
}

/// All synergies of a loadout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynergyReport {
    pub total_bonus: f64,
    pub details: Vec<SynergyDetail>,
}

/// Computes cross-slot bonuses from cached rune profiles
#[derive(Debug, Clone, Copy)]
pub struct SynergyResolver {
    synergy_weight: f64,
    min_awakening_cooldown: f64,
}

impl SynergyResolver {
    pub fn new(config: &ScoreConfig) -> Self {
        Self {
            synergy_weight: config.synergy_weight,
            min_awakening_cooldown: config.min_awakening_cooldown,
        }
    }

    /// Total synergy bonus of a loadout
    pub fn bonus(&self, slots: &[&ScoredRune]) -> f64 {
        self.walk(slots, |_, _, _, _| {})
    }

    /// Total synergy bonus with one detail per application
    pub fn resolve(&self, slots: &[&ScoredRune]) -> SynergyReport {
        let mut details = Vec::new();
        let total_bonus = self.walk(slots, |kind, source, target, bonus| {
            details.push(SynergyDetail {
                kind,
                source,
                target,
                bonus,
            });
        });
        SynergyReport {
            total_bonus,
            details,
        }
    }

    /// Largest gain `amplifier` could get from any rune in `pool`
    ///
    /// Added to the amplifier's upper bound before searching.
    pub fn amplify_upper_bound<'a>(
        amplifier: &ScoredRune,
        pool: impl IntoIterator<Item = &'a ScoredRune>,
    ) -> f64 {
        let Some(amplify) = amplifier.rune.synergy.as_ref().and_then(|s| s.amplify.as_ref())
        else {
            return 0.0;
        };
        let scale = (amplify.factor - 1.0).abs();
        pool.into_iter()
            .filter(|target| target.rune.id != amplifier.rune.id && target.rune.name == amplify.target)
            .map(|target| match amplify.scope {
                AmplifyScope::Awakening => target.awakening.map_or(0.0, |a| a.weighted.abs()),
                AmplifyScope::Stacking => target.stacking.abs().max(target.stacking_upper),
            })
            .fold(0.0, f64::max)
            * scale
    }

    fn walk<F>(&self, slots: &[&ScoredRune], mut emit: F) -> f64
    where
        F: FnMut(SynergyKind, RuneId, RuneId, f64),
    {
        let mut total = 0.0;

        // DoT pairing
        for (i, rune) in slots.iter().enumerate() {
            if rune.requires == 0 {
                continue;
            }
            for dot in DotType::ALL {
                if rune.requires & dot.bit() == 0 {
                    continue;
                }
                let provider = slots
                    .iter()
                    .enumerate()
                    .find(|&(j, other)| j != i && other.applies & dot.bit() != 0);
                if let Some((_, provider)) = provider {
                    let bonus = self.synergy_weight * rune.dormant[dot.index()];
                    total += bonus;
                    emit(SynergyKind::DotPairing(dot), provider.id(), rune.id(), bonus);
                }
            }
        }

        // Demerit removal; a rune never removes its own demerits
        let first_remover = slots.iter().position(|r| r.removes_demerits);
        if let Some(first) = first_remover {
            for (i, rune) in slots.iter().enumerate() {
                if rune.demerit_restore <= 0.0 {
                    continue;
                }
                let remover = if i != first {
                    Some(first)
                } else {
                    slots
                        .iter()
                        .enumerate()
                        .skip(first + 1)
                        .find(|(_, r)| r.removes_demerits)
                        .map(|(j, _)| j)
                };
                if let Some(j) = remover {
                    total += rune.demerit_restore;
                    emit(SynergyKind::DemeritRemoval, slots[j].id(), rune.id(), rune.demerit_restore);
                }
            }
        }

        // Cooldown reduction from armor, consumed by the emblem
        let reduction: f64 = slots
            .iter()
            .filter(|r| r.rune.category == Category::Armor)
            .map(|r| r.cooldown_reduction)
            .sum();
        if reduction > 0.0 {
            let contributor = slots
                .iter()
                .find(|r| r.rune.category == Category::Armor && r.cooldown_reduction > 0.0);
            for emblem in slots.iter().filter(|r| r.rune.category == Category::Emblem) {
                let (Some(awakening), Some(contributor)) = (emblem.awakening, contributor) else {
                    continue;
                };
                let bonus = awakening.contribution(reduction, self.min_awakening_cooldown)
                    - awakening.contribution(0.0, self.min_awakening_cooldown);
                total += bonus;
                emit(SynergyKind::CooldownReduction, contributor.id(), emblem.id(), bonus);
            }
        }

        // Amplifiers
        for (i, rune) in slots.iter().enumerate() {
            let Some(amplify) = rune.rune.synergy.as_ref().and_then(|s| s.amplify.as_ref()) else {
                continue;
            };
            let target = slots
                .iter()
                .enumerate()
                .find(|&(j, other)| j != i && other.rune.name == amplify.target);
            let Some((_, target)) = target else {
                continue;
            };
            let scoped = match amplify.scope {
                AmplifyScope::Awakening => target.awakening.map_or(0.0, |a| {
                    let reduction = if target.rune.category == Category::Emblem {
                        reduction
                    } else {
                        0.0
                    };
                    a.contribution(reduction, self.min_awakening_cooldown)
                }),
                AmplifyScope::Stacking => target.stacking,
            };
            let bonus = (amplify.factor - 1.0) * scoped;
            total += bonus;
            emit(SynergyKind::Amplify(amplify.scope), rune.id(), target.id(), bonus);
        }

        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CharacterContext, Role};
    use crate::rune::{Amplify, Effect, Rune, Synergy};
    use crate::score::ScoreModel;
    use std::sync::Arc;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn profile(rune: Rune) -> ScoredRune {
        let ctx = CharacterContext::new("nobody", Role::Dealer);
        ScoreModel::default().profile(Arc::new(rune), &ctx, 0)
    }

    fn resolver() -> SynergyResolver {
        SynergyResolver::new(&ScoreConfig::default())
    }

    fn remover(id: u32) -> ScoredRune {
        profile(Rune::new(id, "정화", Category::Accessory).with_synergy(Synergy {
            removes_demerits: true,
            ..Default::default()
        }))
    }

    fn penalized(id: u32) -> ScoredRune {
        profile(
            Rune::new(id, "저주받은 갑옷", Category::Armor)
                .with_effect(Effect::permanent("피해", 5.0))
                .with_demerit("피해", 3.0),
        )
    }

    #[test]
    fn test_no_synergy() {
        let a = profile(Rune::new(1, "a", Category::Armor).with_effect(Effect::permanent("피해", 5.0)));
        let b = profile(Rune::new(2, "b", Category::Armor));
        let report = resolver().resolve(&[&a, &b]);
        assert_eq!(report.total_bonus, 0.0);
        assert!(report.details.is_empty());
    }

    #[test]
    fn test_dot_pairing() {
        let provider = profile(Rune::new(1, "출혈 검", Category::Weapon).with_synergy(Synergy {
            applies_dot: vec![DotType::Bleed],
            ..Default::default()
        }));
        let beneficiary = profile(
            Rune::new(2, "피의 갑옷", Category::Armor)
                .with_effect(Effect::permanent("피해", 10.0).requiring(DotType::Bleed)),
        );
        assert_eq!(beneficiary.base_score, 0.0);

        let report = resolver().resolve(&[&provider, &beneficiary]);
        assert!(close(report.total_bonus, 8.0));
        assert_eq!(report.details[0].kind, SynergyKind::DotPairing(DotType::Bleed));
        assert_eq!(report.details[0].source, RuneId(1));
        assert_eq!(report.details[0].target, RuneId(2));

        // Without the provider nothing wakes up
        assert_eq!(resolver().bonus(&[&beneficiary]), 0.0);
    }

    #[test]
    fn test_self_applied_dot_does_not_count() {
        let rune = profile(
            Rune::new(1, "자급자족", Category::Armor)
                .with_effect(Effect::permanent("피해", 10.0).requiring(DotType::Burn))
                .with_synergy(Synergy {
                    applies_dot: vec![DotType::Burn],
                    ..Default::default()
                }),
        );
        assert_eq!(resolver().bonus(&[&rune]), 0.0);
    }

    #[test]
    fn test_demerit_removal() {
        let armor = penalized(1);
        let accessory = remover(2);
        let report = resolver().resolve(&[&armor, &accessory]);
        assert!(close(report.total_bonus, 3.0));
        assert_eq!(report.details[0].kind, SynergyKind::DemeritRemoval);
    }

    #[test]
    fn test_demerit_removal_is_idempotent() {
        let armor = penalized(1);
        let first = remover(2);
        let second = remover(3);
        let once = resolver().bonus(&[&armor, &first]);
        let twice = resolver().bonus(&[&armor, &first, &second]);
        assert!(close(once, twice));
    }

    #[test]
    fn test_remover_keeps_own_demerits_unless_another_remover() {
        let cursed = profile(
            Rune::new(1, "대가", Category::Accessory)
                .with_effect(Effect::permanent("피해", 8.0))
                .with_demerit("피해", 2.0)
                .with_synergy(Synergy {
                    removes_demerits: true,
                    ..Default::default()
                }),
        );
        assert_eq!(resolver().bonus(&[&cursed]), 0.0);

        let other = remover(2);
        assert!(close(resolver().bonus(&[&cursed, &other]), 2.0));
    }

    #[test]
    fn test_cooldown_reduction_feeds_emblem() {
        let emblem = profile(Rune::new(1, "각성", Category::Emblem).with_awakening(
            10.0,
            90.0,
            vec![Effect::permanent("피해", 20.0)],
        ));
        let armor = |id| {
            profile(Rune::new(id, "시간", Category::Armor).with_synergy(Synergy {
                cooldown_reduction: 15.0,
                ..Default::default()
            }))
        };
        let (a, b) = (armor(2), armor(3));
        let bonus = resolver().bonus(&[&emblem, &a, &b]);
        let expected = 20.0 * 10.0 / (10.0 + 60.0) - 20.0 * 0.1;
        assert!(close(bonus, expected));
    }

    #[test]
    fn test_cooldown_reduction_ignored_off_armor() {
        let emblem = profile(Rune::new(1, "각성", Category::Emblem).with_awakening(
            10.0,
            90.0,
            vec![Effect::permanent("피해", 20.0)],
        ));
        let accessory = profile(Rune::new(2, "시간", Category::Accessory).with_synergy(Synergy {
            cooldown_reduction: 30.0,
            ..Default::default()
        }));
        assert_eq!(resolver().bonus(&[&emblem, &accessory]), 0.0);
    }

    #[test]
    fn test_amplify_awakening() {
        let emblem = profile(Rune::new(1, "각성", Category::Emblem).with_awakening(
            10.0,
            90.0,
            vec![Effect::permanent("피해", 20.0)],
        ));
        let amplifier = profile(Rune::new(2, "증폭", Category::Accessory).with_synergy(Synergy {
            amplify: Some(Amplify {
                target: "각성".to_string(),
                scope: AmplifyScope::Awakening,
                factor: 2.0,
            }),
            ..Default::default()
        }));
        let report = resolver().resolve(&[&emblem, &amplifier]);
        assert!(close(report.total_bonus, 2.0));
        assert_eq!(report.details[0].kind, SynergyKind::Amplify(AmplifyScope::Awakening));

        let bound = SynergyResolver::amplify_upper_bound(&amplifier, [&emblem, &amplifier]);
        assert!(close(bound, 20.0));
    }

    #[test]
    fn test_amplify_stacking() {
        let stacker = profile(
            Rune::new(1, "분노", Category::Armor).with_effect(Effect::stacking("공격력", 2.0, 5)),
        );
        let amplifier = profile(Rune::new(2, "격앙", Category::Accessory).with_synergy(Synergy {
            amplify: Some(Amplify {
                target: "분노".to_string(),
                scope: AmplifyScope::Stacking,
                factor: 1.5,
            }),
            ..Default::default()
        }));
        assert!(close(resolver().bonus(&[&stacker, &amplifier]), 0.5 * 9.5));
        assert_eq!(resolver().bonus(&[&amplifier]), 0.0);
    }
}
