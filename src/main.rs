//! Smackamoji entry point
//!
//! The web build is driven from JavaScript through `platform::web`. The
//! native binary plays one headless round with a simple bot and prints the
//! result, which is handy for eyeballing the difficulty curve in the logs
//! (`RUST_LOG=debug`).

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Smackamoji (native) starting...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or_else(smackamoji::platform::clock_seed);
    demo::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::wasm_start, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use smackamoji::consts::BOARD_COLUMNS;
    use smackamoji::highscores::format_date;
    use smackamoji::leaderboard::submit_round_score;
    use smackamoji::platform::{now_ms, today};
    use smackamoji::sim::{Game, TapOutcome};
    use smackamoji::{CloudLeaderboard, LocalLeaderboard, MemoryScoreStore, Settings};

    /// Simulation step for the bot (ms)
    const STEP_MS: u64 = 10;
    /// Bot reaction time range (ms)
    const REACTION_MS: (u64, u64) = (220, 480);
    /// Chance the bot taps the wrong hole
    const FUMBLE_CHANCE: f64 = 0.08;

    pub fn run(seed: u64) {
        let mut settings = Settings::load();
        if settings.needs_player_name() && settings.set_player_name("Demo Bot").is_ok() {
            settings.save();
        }
        let holes = settings.validated().holes;

        let mut game = Game::new(&settings, seed);
        game.on_active_set_changed(|change| {
            log::trace!("{}ms active={:?}", change.at_ms, change.active);
        });

        let mut bot = Pcg32::seed_from_u64(seed ^ 0x5EED);
        // (hole, time it appeared, reaction delay)
        let mut target: Option<(usize, u64, u64)> = None;

        log::info!("Started new game with seed: {}", seed);
        game.start();
        let summary = loop {
            if let Some(summary) = game.advance_by(STEP_MS) {
                break summary;
            }

            let active = game.active_holes();
            let now = game.now_ms();
            target = match target {
                Some((hole, since, delay)) if active.contains(&hole) => {
                    if now - since >= delay {
                        let tap = if bot.random_bool(FUMBLE_CHANCE) {
                            (hole + 1) % holes
                        } else {
                            hole
                        };
                        if game.tap(tap) == TapOutcome::Hit {
                            log::debug!("Bot hit hole {} after {}ms", hole, now - since);
                        }
                        None
                    } else {
                        Some((hole, since, delay))
                    }
                }
                _ => active
                    .first()
                    .map(|&hole| (hole, now, bot.random_range(REACTION_MS.0..REACTION_MS.1))),
            };
        };

        println!(
            "Round over: {} hits, {} misses ({:.0}% accuracy) in {}s",
            summary.score,
            summary.misses,
            summary.accuracy() * 100.0,
            summary.duration_seconds
        );

        let mut local = LocalLeaderboard::load();
        let mut cloud = CloudLeaderboard::new(MemoryScoreStore::new());
        let report = submit_round_score(
            settings.player_name.as_deref(),
            summary.score,
            today(),
            now_ms(),
            &mut local,
            &mut cloud,
        );
        if let Some(rank) = report.local_rank {
            println!("New high score! Rank #{}", rank);
        }

        println!("\nTop scores");
        for (i, entry) in local.entries.iter().enumerate() {
            println!(
                "{:>2}. {:<20} {:>4}  {}",
                i + 1,
                entry.name,
                entry.score,
                format_date(entry.date, today())
            );
        }
        println!("\n{}", board_summary(holes));
    }

    fn board_summary(holes: usize) -> String {
        let rows = holes.div_ceil(BOARD_COLUMNS);
        format!("Board: {} holes ({}x{})", holes, BOARD_COLUMNS, rows)
    }
}
