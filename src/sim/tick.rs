//! Round clock, phase controller and the single simulation entry point
//!
//! `advance` is called from one scheduler loop with the current wall-clock
//! time. Periodic subsystems (countdown, enemy steps, fuse polling) are
//! wall-clock cadences; every firing due at or before `now` is replayed in
//! chronological order, then the pending intents are applied.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::board::Dir;
use super::detonation::detonate_expired;
use super::movement::{try_move, try_place_bomb};
use super::pickup::resolve_collisions;
use super::state::{Cadence, GameOverReason, GameState, Phase, Timers};
use super::wander::step_enemies;
use crate::Millis;
use crate::consts::MAX_CATCH_UP;

/// Player intent, already decoded from whatever input device produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    Move(Dir),
    PlaceBomb,
}

impl Intent {
    pub const MOVE_UP: Intent = Intent::Move(Dir::Up);
    pub const MOVE_DOWN: Intent = Intent::Move(Dir::Down);
    pub const MOVE_LEFT: Intent = Intent::Move(Dir::Left);
    pub const MOVE_RIGHT: Intent = Intent::Move(Dir::Right);
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(Intent::MOVE_UP),
            "down" => Ok(Intent::MOVE_DOWN),
            "left" => Ok(Intent::MOVE_LEFT),
            "right" => Ok(Intent::MOVE_RIGHT),
            "bomb" => Ok(Intent::PlaceBomb),
            other => Err(format!("unknown intent {other:?}")),
        }
    }
}

/// Round-level commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Leave the Start screen
    Start,
    /// Rebuild the round from the level template (any phase)
    Reset,
}

/// Everything that arrived since the previous advance
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub command: Option<Command>,
    /// Applied in order
    pub intents: Vec<Intent>,
}

impl TickInput {
    pub fn clear(&mut self) {
        self.command = None;
        self.intents.clear();
    }
}

/// Periodic subsystems, in tie-break order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timer {
    Countdown,
    EnemyStep,
    Detonation,
}

impl Timer {
    const ALL: [Timer; 3] = [Timer::Countdown, Timer::EnemyStep, Timer::Detonation];

    /// Whether missed periods past `MAX_CATCH_UP` may be dropped. The
    /// countdown must track elapsed time and ends the round itself.
    fn drops_backlog(self) -> bool {
        !matches!(self, Timer::Countdown)
    }

    fn get(self, timers: &Timers) -> &Cadence {
        match self {
            Timer::Countdown => &timers.countdown,
            Timer::EnemyStep => &timers.enemy_step,
            Timer::Detonation => &timers.detonation,
        }
    }

    fn get_mut(self, timers: &mut Timers) -> &mut Cadence {
        match self {
            Timer::Countdown => &mut timers.countdown,
            Timer::EnemyStep => &mut timers.enemy_step,
            Timer::Detonation => &mut timers.detonation,
        }
    }
}

/// Advance the round to wall-clock time `now`
pub fn advance(state: &mut GameState, input: &TickInput, now: Millis) {
    if let Some(command) = input.command {
        apply_command(state, command, now);
    }

    // Intents only count if they were issued during live play
    let was_playing = state.phase == Phase::Playing;

    match state.phase {
        Phase::Start | Phase::GameOver | Phase::LevelClear => return,
        Phase::Ready => match state.timers.ready_at {
            Some(at) if now >= at => state.enter_playing(at),
            _ => return,
        },
        Phase::Playing => {}
    }

    run_timers(state, now);

    if was_playing {
        for &intent in &input.intents {
            if state.phase != Phase::Playing {
                break;
            }
            match intent {
                Intent::Move(dir) => {
                    try_move(state, dir);
                }
                Intent::PlaceBomb => {
                    try_place_bomb(state, now);
                }
            }
            resolve_collisions(state, now);
        }
    }

    resolve_collisions(state, now);

    // Cleanups never touch a frozen round
    if state.phase == Phase::Playing {
        state.expire_transients(now);
    }
    state.normalize_order();
}

fn apply_command(state: &mut GameState, command: Command, now: Millis) {
    match command {
        Command::Start if state.phase == Phase::Start => state.reset(now),
        Command::Start => log::debug!("Start ignored in {:?}", state.phase),
        Command::Reset => state.reset(now),
    }
}

/// Fire every due cadence in time order. Enemy steps and fuse polls replay
/// at most `MAX_CATCH_UP` missed periods; older ones are dropped. The
/// countdown replays every missed unit.
fn run_timers(state: &mut GameState, now: Millis) {
    for timer in Timer::ALL.into_iter().filter(|t| t.drops_backlog()) {
        let dropped = timer.get_mut(&mut state.timers).drop_backlog(now, MAX_CATCH_UP);
        if dropped > 0 {
            log::debug!("{:?} dropped {} missed periods", timer, dropped);
        }
    }

    while state.phase == Phase::Playing {
        let timers = &state.timers;
        let next = Timer::ALL
            .into_iter()
            .filter_map(|timer| timer.get(timers).due(now).map(|at| (at, timer)))
            .min_by_key(|&(at, _)| at);
        let Some((at, timer)) = next else {
            break;
        };
        timer.get_mut(&mut state.timers).fire();

        match timer {
            Timer::Countdown => count_down(state, at),
            Timer::EnemyStep => {
                step_enemies(state);
                resolve_collisions(state, at);
            }
            Timer::Detonation => {
                detonate_expired(state, at);
                resolve_collisions(state, at);
            }
        }
    }
}

fn count_down(state: &mut GameState, at: Millis) {
    state.time_remaining = state.time_remaining.saturating_sub(1);
    if state.time_remaining == 0 {
        state.game_over(GameOverReason::TimeExpired, at);
    }
}
