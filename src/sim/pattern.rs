//! Spawn patterns
//!
//! A pattern turns one cycle's visible time into a short timeline of
//! show/hide steps. Planning is pure; the scheduler turns each step into a
//! timer.

use rand::Rng;
use rand::seq::index;
use serde::{Deserialize, Serialize};

use super::active::{ActiveSetMode, StepAction};
use crate::consts::*;

/// The four spawn behaviours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnPattern {
    /// One mole, one hole
    Single,
    /// Quick decoy flash, then the real mole somewhere else
    FakeOut,
    /// 2-3 moles in quick succession
    RapidFire,
    /// 2-3 moles shuffled round-robin
    MultiMole,
}

/// One planned activation change, relative to cycle start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnStep {
    pub at_ms: u64,
    pub action: StepAction,
}

impl SpawnStep {
    fn show(at_ms: u64, hole: usize) -> Self {
        Self {
            at_ms,
            action: StepAction::Show(hole),
        }
    }

    fn hide(at_ms: u64, hole: usize) -> Self {
        Self {
            at_ms,
            action: StepAction::Hide(hole),
        }
    }
}

impl SpawnPattern {
    /// Selection order (matters for tie-breaking)
    pub const ALL: [SpawnPattern; 4] = [
        SpawnPattern::Single,
        SpawnPattern::FakeOut,
        SpawnPattern::RapidFire,
        SpawnPattern::MultiMole,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SpawnPattern::Single => "single",
            SpawnPattern::FakeOut => "fake_out",
            SpawnPattern::RapidFire => "rapid_fire",
            SpawnPattern::MultiMole => "multi_mole",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == s)
    }

    /// Plan this pattern's steps on a board of `holes` holes.
    ///
    /// Steps come back sorted by `at_ms`. At equal offsets shows fire before
    /// hides, so a rapid-fire hide landing on the next show's instant empties
    /// a shared slot right after that show. An empty board yields no steps.
    pub fn plan<R: Rng + ?Sized>(
        self,
        rng: &mut R,
        holes: usize,
        visible_ms: u64,
        mode: ActiveSetMode,
    ) -> Vec<SpawnStep> {
        if holes == 0 {
            return Vec::new();
        }
        let mut steps = match self {
            SpawnPattern::Single => plan_single(rng, holes, visible_ms),
            // Needs a second hole to fake out
            SpawnPattern::FakeOut if holes < 2 => plan_single(rng, holes, visible_ms),
            SpawnPattern::FakeOut => plan_fake_out(rng, holes, visible_ms),
            SpawnPattern::RapidFire => plan_rapid_fire(rng, holes, visible_ms),
            SpawnPattern::MultiMole => plan_multi_mole(rng, holes, visible_ms, mode),
        };
        steps.sort_by_key(|s| (s.at_ms, matches!(s.action, StepAction::Hide(_))));
        steps
    }
}

fn plan_single<R: Rng + ?Sized>(rng: &mut R, holes: usize, visible_ms: u64) -> Vec<SpawnStep> {
    let hole = rng.random_range(0..holes);
    vec![SpawnStep::show(0, hole), SpawnStep::hide(visible_ms, hole)]
}

fn plan_fake_out<R: Rng + ?Sized>(rng: &mut R, holes: usize, visible_ms: u64) -> Vec<SpawnStep> {
    let decoy = rng.random_range(0..holes);
    let flash = rng.random_range(FAKE_OUT_FLASH_MS.0..FAKE_OUT_FLASH_MS.1);
    let gap = rng.random_range(FAKE_OUT_GAP_MS.0..FAKE_OUT_GAP_MS.1);

    // Uniform over every hole except the decoy
    let mut real = rng.random_range(0..holes - 1);
    if real >= decoy {
        real += 1;
    }

    let real_at = flash + gap;
    vec![
        SpawnStep::show(0, decoy),
        SpawnStep::hide(flash, decoy),
        SpawnStep::show(real_at, real),
        SpawnStep::hide(real_at + visible_ms, real),
    ]
}

/// 2-3 distinct holes, capped by board size
fn pick_distinct<R: Rng + ?Sized>(rng: &mut R, holes: usize) -> Vec<usize> {
    let count = rng.random_range(2usize..=3).min(holes);
    index::sample(rng, holes, count).into_vec()
}

fn plan_rapid_fire<R: Rng + ?Sized>(rng: &mut R, holes: usize, visible_ms: u64) -> Vec<SpawnStep> {
    let picked = pick_distinct(rng, holes);
    let hold = rapid_fire_hold_ms(visible_ms);
    let cadence = visible_ms as f64 * 0.3;

    let mut steps = Vec::with_capacity(picked.len() * 2);
    for (i, &hole) in picked.iter().enumerate() {
        let start = (i as f64 * cadence).round() as u64;
        steps.push(SpawnStep::show(start, hole));
        steps.push(SpawnStep::hide(start + hold, hole));
    }
    steps
}

fn plan_multi_mole<R: Rng + ?Sized>(
    rng: &mut R,
    holes: usize,
    visible_ms: u64,
    mode: ActiveSetMode,
) -> Vec<SpawnStep> {
    let picked = pick_distinct(rng, holes);
    let interval = multi_mole_interval_ms(visible_ms, picked.len());
    let shows = picked.len() * MULTI_MOLE_PASSES;
    let end = shows as u64 * interval;

    match mode {
        ActiveSetMode::Shared => {
            // One slot: cycle it through the holes
            let mut steps: Vec<SpawnStep> = (0..shows)
                .map(|k| SpawnStep::show(k as u64 * interval, picked[k % picked.len()]))
                .collect();
            let last = picked[(shows - 1) % picked.len()];
            steps.push(SpawnStep::hide(end, last));
            steps
        }
        ActiveSetMode::Concurrent => {
            // Real set: all up together for the same total span
            let mut steps: Vec<SpawnStep> = picked.iter().map(|&h| SpawnStep::show(0, h)).collect();
            steps.extend(picked.iter().map(|&h| SpawnStep::hide(end, h)));
            steps
        }
    }
}

/// Per-hole hold in a rapid-fire burst
pub fn rapid_fire_hold_ms(visible_ms: u64) -> u64 {
    ((visible_ms as f64 * 0.6).round() as u64).max(RAPID_FIRE_MIN_HOLD_MS)
}

/// Per-hole interval in a multi-mole shuffle of `count` holes
pub fn multi_mole_interval_ms(visible_ms: u64, count: usize) -> u64 {
    let per = visible_ms as f64 / (count.max(1) * MULTI_MOLE_PASSES) as f64;
    (per.round() as u64).max(MULTI_MOLE_MIN_INTERVAL_MS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::collections::HashSet;

    fn shown(steps: &[SpawnStep]) -> Vec<usize> {
        steps
            .iter()
            .filter_map(|s| match s.action {
                StepAction::Show(h) => Some(h),
                StepAction::Hide(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_names_round_trip() {
        for p in SpawnPattern::ALL {
            assert_eq!(SpawnPattern::from_name(p.name()), Some(p));
        }
        assert_eq!(SpawnPattern::from_name("mega_mole"), None);
    }

    #[test]
    fn test_single() {
        let mut rng = Pcg32::seed_from_u64(1);
        let steps = SpawnPattern::Single.plan(&mut rng, 16, 1000, ActiveSetMode::Shared);
        assert_eq!(steps.len(), 2);
        let hole = shown(&steps)[0];
        assert!(hole < 16);
        assert_eq!(steps[0], SpawnStep::show(0, hole));
        assert_eq!(steps[1], SpawnStep::hide(1000, hole));
    }

    #[test]
    fn test_fake_out_timeline() {
        let mut rng = Pcg32::seed_from_u64(2);
        for _ in 0..500 {
            let steps = SpawnPattern::FakeOut.plan(&mut rng, 16, 700, ActiveSetMode::Shared);
            let &[decoy_on, decoy_off, real_on, real_off] = steps.as_slice() else {
                panic!("fake_out should plan four steps, got {steps:?}");
            };
            let (StepAction::Show(a), StepAction::Show(b)) = (decoy_on.action, real_on.action) else {
                panic!("unexpected actions {steps:?}");
            };
            assert_ne!(a, b);
            assert_eq!(decoy_on.at_ms, 0);
            assert!((120..200).contains(&decoy_off.at_ms));
            let gap = real_on.at_ms - decoy_off.at_ms;
            assert!((50..150).contains(&gap));
            assert_eq!(real_off.at_ms - real_on.at_ms, 700);
            assert_eq!(real_off.action, StepAction::Hide(b));
        }
    }

    #[test]
    fn test_fake_out_on_one_hole_board_degrades_to_single() {
        let mut rng = Pcg32::seed_from_u64(3);
        let steps = SpawnPattern::FakeOut.plan(&mut rng, 1, 500, ActiveSetMode::Shared);
        assert_eq!(steps, vec![SpawnStep::show(0, 0), SpawnStep::hide(500, 0)]);
    }

    #[test]
    fn test_rapid_fire_cadence() {
        let mut rng = Pcg32::seed_from_u64(4);
        let steps = SpawnPattern::RapidFire.plan(&mut rng, 16, 1000, ActiveSetMode::Shared);
        let shows: Vec<&SpawnStep> = steps
            .iter()
            .filter(|s| matches!(s.action, StepAction::Show(_)))
            .collect();
        assert!((2..=3).contains(&shows.len()));
        for (i, s) in shows.iter().enumerate() {
            assert_eq!(s.at_ms, i as u64 * 300);
        }
        // 0.6 * 1000
        let first = shown(&steps)[0];
        assert!(steps.contains(&SpawnStep::hide(600, first)));
    }

    #[test]
    fn test_rapid_fire_show_precedes_coinciding_hide() {
        // 0.6 * 1000: the first hole's hide lands on the third show
        let mut rng = Pcg32::seed_from_u64(0);
        let mut checked = false;
        for _ in 0..50 {
            let steps = SpawnPattern::RapidFire.plan(&mut rng, 16, 1000, ActiveSetMode::Shared);
            let holes = shown(&steps);
            if holes.len() < 3 {
                continue;
            }
            let at_600: Vec<StepAction> = steps
                .iter()
                .filter(|s| s.at_ms == 600)
                .map(|s| s.action)
                .collect();
            assert_eq!(at_600, vec![StepAction::Show(holes[2]), StepAction::Hide(holes[0])]);
            checked = true;
        }
        assert!(checked, "no three-hole burst in 50 plans");
    }

    #[test]
    fn test_rapid_fire_hold_floor() {
        assert_eq!(rapid_fire_hold_ms(350), 300);
        assert_eq!(rapid_fire_hold_ms(1000), 600);
    }

    #[test]
    fn test_multi_mole_shared_round_robin() {
        let mut rng = Pcg32::seed_from_u64(5);
        let steps = SpawnPattern::MultiMole.plan(&mut rng, 16, 900, ActiveSetMode::Shared);
        let holes = shown(&steps);
        let count = holes.len() / 3;
        assert!((2..=3).contains(&count));
        assert_eq!(holes.len(), count * 3);
        // Each pass repeats the same order
        for (k, h) in holes.iter().enumerate() {
            assert_eq!(*h, holes[k % count]);
        }
        let interval = multi_mole_interval_ms(900, count);
        let last = steps.last().unwrap();
        assert!(matches!(last.action, StepAction::Hide(_)));
        assert_eq!(last.at_ms, holes.len() as u64 * interval);
    }

    #[test]
    fn test_multi_mole_concurrent_shows_all_at_once() {
        let mut rng = Pcg32::seed_from_u64(6);
        let steps = SpawnPattern::MultiMole.plan(&mut rng, 16, 900, ActiveSetMode::Concurrent);
        let holes = shown(&steps);
        assert!((2..=3).contains(&holes.len()));
        let end = holes.len() as u64 * 3 * multi_mole_interval_ms(900, holes.len());
        for s in &steps {
            match s.action {
                StepAction::Show(_) => assert_eq!(s.at_ms, 0),
                StepAction::Hide(_) => assert_eq!(s.at_ms, end),
            }
        }
    }

    #[test]
    fn test_multi_mole_interval_floor() {
        assert_eq!(multi_mole_interval_ms(350, 3), 100);
        assert_eq!(multi_mole_interval_ms(900, 2), 150);
    }

    #[test]
    fn test_small_board_caps_hole_count() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..50 {
            let steps = SpawnPattern::RapidFire.plan(&mut rng, 2, 800, ActiveSetMode::Shared);
            assert_eq!(shown(&steps).len(), 2);
        }
        assert!(SpawnPattern::Single.plan(&mut rng, 0, 800, ActiveSetMode::Shared).is_empty());
    }

    proptest! {
        #[test]
        fn prop_burst_patterns_never_repeat_holes(
            seed in any::<u64>(),
            holes in 2usize..=25,
            visible in 350u64..=1200,
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let fire = shown(&SpawnPattern::RapidFire.plan(&mut rng, holes, visible, ActiveSetMode::Shared));
            let unique: HashSet<_> = fire.iter().collect();
            prop_assert_eq!(unique.len(), fire.len());

            let multi = shown(&SpawnPattern::MultiMole.plan(&mut rng, holes, visible, ActiveSetMode::Concurrent));
            let unique: HashSet<_> = multi.iter().collect();
            prop_assert_eq!(unique.len(), multi.len());
        }

        #[test]
        fn prop_steps_sorted_and_on_board(
            seed in any::<u64>(),
            holes in 1usize..=25,
            visible in 350u64..=1200,
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            for pattern in SpawnPattern::ALL {
                let steps = pattern.plan(&mut rng, holes, visible, ActiveSetMode::Shared);
                prop_assert!(!steps.is_empty());
                prop_assert!(steps.windows(2).all(|w| w[0].at_ms <= w[1].at_ms));
                prop_assert!(shown(&steps).iter().all(|&h| h < holes));
            }
        }

        #[test]
        fn prop_timing_floors(visible in 0u64..=2000, count in 2usize..=3) {
            prop_assert!(rapid_fire_hold_ms(visible) >= 300);
            prop_assert!(multi_mole_interval_ms(visible, count) >= 100);
        }
    }
}
