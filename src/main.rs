//! Office Bomber entry point
//!
//! The native build runs one headless round on a simulated frame clock,
//! driven by a small autopilot, and reports the outcome. The browser build
//! enters through `office_bomber::web`.
//!
//! Usage: `office-bomber [seed] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use glam::IVec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use office_bomber::Millis;
    use office_bomber::sim::detonation::march;
    use office_bomber::sim::{Dir, GameState, Intent, Tile};

    /// Minimum time between autopilot decisions
    const THINK_MS: Millis = 200;

    pub struct Autopilot {
        rng: Pcg32,
        next_think: Millis,
    }

    impl Autopilot {
        pub fn new(seed: u64) -> Self {
            Self {
                rng: Pcg32::seed_from_u64(seed ^ 0x5eed),
                next_think: 0,
            }
        }

        /// Cells a live bomb or blast will cover
        fn danger(state: &GameState) -> Vec<IVec2> {
            let mut cells: Vec<IVec2> = state.blasts.iter().map(|b| b.payload.pos).collect();
            for bomb in &state.bombs {
                cells.push(bomb.pos);
                for dir in Dir::ALL {
                    cells.extend(march(&state.board, bomb.pos, dir, bomb.range).cells);
                }
            }
            cells
        }

        pub fn think(&mut self, state: &GameState, now: Millis) -> Vec<Intent> {
            if now < self.next_think {
                return Vec::new();
            }
            self.next_think = now + THINK_MS;

            let pos = state.player.pos;
            let danger = Self::danger(state);
            let exits: Vec<Dir> = Dir::ALL
                .into_iter()
                .filter(|d| state.board.is_walkable(pos + d.delta()))
                .filter(|d| !state.enemies.iter().any(|e| e.pos == pos + d.delta()))
                .collect();
            let safe_exits: Vec<Dir> = exits
                .iter()
                .copied()
                .filter(|d| !danger.contains(&(pos + d.delta())))
                .collect();

            if danger.contains(&pos) {
                // Run, preferably somewhere safe
                let pool = if safe_exits.is_empty() { &exits } else { &safe_exits };
                return pool
                    .get(self.rng.random_range(0..pool.len().max(1)))
                    .map(|&d| vec![Intent::Move(d)])
                    .unwrap_or_default();
            }

            let near_target = Dir::ALL.into_iter().any(|d| {
                let next = pos + d.delta();
                state.board.tile(next) == Some(Tile::Partition)
                    || state.enemies.iter().any(|e| e.pos == next)
            });
            if near_target && state.bombs.is_empty() && !safe_exits.is_empty() {
                let escape = safe_exits[self.rng.random_range(0..safe_exits.len())];
                return vec![Intent::PlaceBomb, Intent::Move(escape)];
            }

            if safe_exits.is_empty() || self.rng.random_bool(0.3) {
                return Vec::new();
            }
            vec![Intent::Move(safe_exits[self.rng.random_range(0..safe_exits.len())])]
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::path::Path;

    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use office_bomber::sim::{Command, GameState, TickInput, advance};
    use office_bomber::{Level, Millis, Tuning};

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(2024);
    let tuning = match args.next() {
        Some(path) => match Tuning::load(Path::new(&path)) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => Tuning::default(),
    };
    log::info!("Office Bomber (native, headless) seed {seed}");

    let round_ms = tuning.level_time_secs as Millis * tuning.countdown_unit_ms;
    let mut state = match GameState::new(seed, Level::builtin(), tuning) {
        Ok(state) => state,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };
    let mut pilot = autopilot::Autopilot::new(seed);
    // Jittered frame times: the simulation only sees wall-clock timestamps
    let mut frames = Pcg32::seed_from_u64(seed);

    let mut input = TickInput {
        command: Some(Command::Start),
        ..Default::default()
    };
    let mut now: Millis = 0;
    let deadline = round_ms + 10_000;
    while now <= deadline {
        advance(&mut state, &input, now);
        input.clear();
        if state.phase.is_terminal() {
            break;
        }
        input.intents = pilot.think(&state, now);
        now += frames.random_range(8..40);
    }

    let snapshot = state.snapshot(now);
    println!("{}", snapshot.board);
    println!(
        "{:?} ({:?}) score {} with {}s left, {} enemies remaining",
        snapshot.phase,
        snapshot.game_over_reason,
        snapshot.score,
        snapshot.time_remaining,
        snapshot.enemies.len()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::init, this is just to satisfy the compiler
}
