//! Difficulty curve
//!
//! Everything here is a pure function of the progress ratio `p` (elapsed
//! fraction of the round) plus an RNG. Spawns get faster and shorter as the
//! round goes on, but the last fifth gets *less* random so the finish stays
//! playable.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::pattern::SpawnPattern;
use crate::consts::*;

/// Elapsed fraction of the round, clamped to [0, 1]
pub fn progress_ratio(total_seconds: u32, remaining_seconds: u32) -> f64 {
    if total_seconds == 0 {
        return 1.0;
    }
    let elapsed = total_seconds as f64 - remaining_seconds as f64;
    (elapsed / total_seconds as f64).clamp(0.0, 1.0)
}

/// Time until the next spawn cycle, before the multiplier (ms)
pub fn base_spawn_delay_ms(progress: f64) -> f64 {
    (MAX_SPAWN_DELAY_MS - progress * SPAWN_DELAY_RAMP_MS).max(MIN_SPAWN_DELAY_MS)
}

/// Nominal time a hole stays active, before the multiplier (ms)
pub fn base_visible_time_ms(progress: f64) -> f64 {
    (MAX_VISIBLE_MS - progress * VISIBLE_RAMP_MS).max(MIN_VISIBLE_MS)
}

/// Uniform random scale applied to both delay and visible time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyMultiplier {
    /// Width of the uniform draw
    pub range: f64,
    /// Lower bound of the draw
    pub offset: f64,
}

impl DifficultyMultiplier {
    pub fn for_progress(progress: f64) -> Self {
        if progress > LATE_GAME_PROGRESS {
            Self {
                range: 0.2,
                offset: 0.9,
            }
        } else {
            Self {
                range: 0.4,
                offset: 0.8,
            }
        }
    }

    /// Multiplier for a unit roll in [0, 1)
    pub fn at(&self, unit: f64) -> f64 {
        self.offset + unit * self.range
    }

    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.at(rng.random::<f64>())
    }
}

/// Timing for one spawn cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleTiming {
    /// Multiplier drawn for this cycle
    pub multiplier: f64,
    /// Delay until the next cycle starts (ms)
    pub spawn_delay_ms: f64,
    /// How long the pattern's real mole stays up (ms)
    pub visible_ms: f64,
}

impl CycleTiming {
    /// Timing for a given progress and multiplier
    pub fn with_multiplier(progress: f64, multiplier: f64) -> Self {
        Self {
            multiplier,
            spawn_delay_ms: base_spawn_delay_ms(progress) * multiplier,
            visible_ms: (base_visible_time_ms(progress) * multiplier).max(VISIBLE_FLOOR_MS),
        }
    }

    pub fn roll<R: Rng + ?Sized>(progress: f64, rng: &mut R) -> Self {
        let multiplier = DifficultyMultiplier::for_progress(progress).roll(rng);
        Self::with_multiplier(progress, multiplier)
    }

    /// Spawn delay rounded to whole milliseconds
    pub fn spawn_delay(&self) -> u64 {
        self.spawn_delay_ms.round() as u64
    }

    /// Visible time rounded to whole milliseconds
    pub fn visible(&self) -> u64 {
        self.visible_ms.round() as u64
    }
}

/// Relative pattern probabilities for one progress tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternWeights {
    pub single: f64,
    pub fake_out: f64,
    pub rapid_fire: f64,
    pub multi_mole: f64,
}

impl PatternWeights {
    pub fn for_progress(progress: f64) -> Self {
        if progress < 0.5 {
            // Mostly singles, a few fake-outs
            Self {
                single: 0.80,
                fake_out: 0.15,
                rapid_fire: 0.05,
                multi_mole: 0.0,
            }
        } else if progress < LATE_GAME_PROGRESS {
            Self {
                single: 0.60,
                fake_out: 0.25,
                rapid_fire: 0.10,
                multi_mole: 0.05,
            }
        } else {
            // Final stretch: no multi-mole chaos
            Self {
                single: 0.70,
                fake_out: 0.25,
                rapid_fire: 0.05,
                multi_mole: 0.0,
            }
        }
    }

    /// Weights in selection order
    pub fn entries(&self) -> [(SpawnPattern, f64); 4] {
        [
            (SpawnPattern::Single, self.single),
            (SpawnPattern::FakeOut, self.fake_out),
            (SpawnPattern::RapidFire, self.rapid_fire),
            (SpawnPattern::MultiMole, self.multi_mole),
        ]
    }

    pub fn total(&self) -> f64 {
        self.entries().iter().map(|(_, w)| w).sum()
    }

    pub fn weight_of(&self, pattern: SpawnPattern) -> f64 {
        match pattern {
            SpawnPattern::Single => self.single,
            SpawnPattern::FakeOut => self.fake_out,
            SpawnPattern::RapidFire => self.rapid_fire,
            SpawnPattern::MultiMole => self.multi_mole,
        }
    }

    /// Draw a pattern
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> SpawnPattern {
        let roll = rng.random::<f64>() * self.total();
        weighted_choice(&self.entries(), roll).unwrap_or(SpawnPattern::Single)
    }
}

/// Walk `choices` subtracting each weight from `roll`; the first entry that
/// brings the remainder to <= 0 wins. Earlier entries win ties.
///
/// Falls back to the first entry if rounding leaves a positive remainder.
/// Returns None only for an empty slice.
pub fn weighted_choice<T: Copy>(choices: &[(T, f64)], roll: f64) -> Option<T> {
    let mut remainder = roll;
    for &(choice, weight) in choices {
        remainder -= weight;
        if remainder <= 0.0 {
            return Some(choice);
        }
    }
    choices.first().map(|&(choice, _)| choice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_progress_ratio() {
        assert_eq!(progress_ratio(30, 30), 0.0);
        assert_eq!(progress_ratio(30, 0), 1.0);
        assert!((progress_ratio(30, 3) - 0.9).abs() < 1e-12);
        // Remaining above total clamps to 0
        assert_eq!(progress_ratio(30, 45), 0.0);
        assert_eq!(progress_ratio(0, 0), 1.0);
    }

    #[test]
    fn test_round_start_timing() {
        let p = progress_ratio(30, 30);
        assert_eq!(base_spawn_delay_ms(p), 2000.0);
        assert_eq!(base_visible_time_ms(p), 1000.0);
    }

    #[test]
    fn test_round_end_timing() {
        assert_eq!(base_spawn_delay_ms(1.0), 800.0);
        assert_eq!(base_visible_time_ms(1.0), 500.0);
    }

    #[test]
    fn test_multiplier_narrows_late() {
        let early = DifficultyMultiplier::for_progress(0.8);
        assert_eq!(early.at(0.0), 0.8);
        assert!((early.at(1.0) - 1.2).abs() < 1e-12);

        let late = DifficultyMultiplier::for_progress(0.81);
        assert_eq!(late.at(0.0), 0.9);
        assert!((late.at(1.0) - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_visible_floor_applies_after_multiplier() {
        // 500ms base * 0.6 would be 300ms
        let timing = CycleTiming::with_multiplier(1.0, 0.6);
        assert_eq!(timing.visible_ms, 350.0);
        assert!((timing.spawn_delay_ms - 480.0).abs() < 1e-9);
    }

    #[test]
    fn test_weights_by_tier() {
        let w = PatternWeights::for_progress(0.0);
        assert_eq!((w.single, w.fake_out, w.rapid_fire, w.multi_mole), (0.80, 0.15, 0.05, 0.0));

        let w = PatternWeights::for_progress(0.5);
        assert_eq!((w.single, w.fake_out, w.rapid_fire, w.multi_mole), (0.60, 0.25, 0.10, 0.05));

        // 3 seconds left of 30
        let w = PatternWeights::for_progress(progress_ratio(30, 3));
        assert_eq!((w.single, w.fake_out, w.rapid_fire, w.multi_mole), (0.70, 0.25, 0.05, 0.0));
    }

    #[test]
    fn test_weighted_choice_walk() {
        let choices = [('a', 0.5), ('b', 0.3), ('c', 0.2)];
        assert_eq!(weighted_choice(&choices, 0.0), Some('a'));
        assert_eq!(weighted_choice(&choices, 0.5), Some('a'));
        assert_eq!(weighted_choice(&choices, 0.51), Some('b'));
        assert_eq!(weighted_choice(&choices, 0.95), Some('c'));
        // Overshoot falls back to the first entry
        assert_eq!(weighted_choice(&choices, 5.0), Some('a'));
        assert_eq!(weighted_choice::<char>(&[], 0.1), None);
    }

    #[test]
    fn test_weighted_choice_ties_favor_earlier() {
        let choices = [('x', 0.5), ('y', 0.5)];
        // Exactly on the boundary goes to the earlier entry
        assert_eq!(weighted_choice(&choices, 0.5), Some('x'));
    }

    #[test]
    fn test_zero_weight_never_chosen() {
        let weights = PatternWeights::for_progress(0.1);
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..10_000 {
            assert_ne!(weights.choose(&mut rng), SpawnPattern::MultiMole);
        }
    }

    #[test]
    fn test_choose_draws_once_per_pick() {
        // Each pick consumes exactly one roll, so a replayed stream agrees
        let weights = PatternWeights::for_progress(0.6);
        let mut rng = Pcg32::seed_from_u64(99);
        let mut replay = Pcg32::seed_from_u64(99);
        for _ in 0..1_000 {
            let pick = weights.choose(&mut rng);
            let roll = replay.random::<f64>() * weights.total();
            assert_eq!(Some(pick), weighted_choice(&weights.entries(), roll));
        }
    }

    #[test]
    fn test_pattern_frequencies_match_weights() {
        const DRAWS: usize = 100_000;
        for p in [0.2, 0.6, 0.9] {
            let weights = PatternWeights::for_progress(p);
            let mut rng = Pcg32::seed_from_u64(0xC0FFEE);
            let mut counts = [0usize; 4];
            for _ in 0..DRAWS {
                let pick = weights.choose(&mut rng);
                let idx = SpawnPattern::ALL.iter().position(|&pat| pat == pick).unwrap();
                counts[idx] += 1;
            }
            for (i, &pattern) in SpawnPattern::ALL.iter().enumerate() {
                let observed = counts[i] as f64 / DRAWS as f64;
                let expected = weights.weight_of(pattern) / weights.total();
                assert!(
                    (observed - expected).abs() < 0.01,
                    "p={p} {}: observed {observed:.4}, expected {expected:.4}",
                    pattern.name()
                );
            }
        }
    }

    proptest! {
        #[test]
        fn prop_base_curves_bounded(p in 0.0f64..=1.0) {
            let delay = base_spawn_delay_ms(p);
            let visible = base_visible_time_ms(p);
            prop_assert!((800.0..=2000.0).contains(&delay));
            prop_assert!((500.0..=1000.0).contains(&visible));
        }

        #[test]
        fn prop_base_curves_non_increasing(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(base_spawn_delay_ms(hi) <= base_spawn_delay_ms(lo));
            prop_assert!(base_visible_time_ms(hi) <= base_visible_time_ms(lo));
        }

        #[test]
        fn prop_visible_never_below_floor(p in 0.0f64..=1.0, seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let timing = CycleTiming::roll(p, &mut rng);
            prop_assert!(timing.visible_ms >= 350.0);
            prop_assert!(timing.visible() >= 350);
            prop_assert!(timing.multiplier >= 0.8 && timing.multiplier <= 1.2);
        }
    }
}
