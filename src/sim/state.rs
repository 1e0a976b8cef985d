//! Game state and core simulation types
//!
//! Everything a round owns lives here. Entities are rebuilt from the level
//! template on every reset; nothing carries over between rounds.

use glam::{IVec2, Vec2};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::board::Board;
use super::snapshot::Snapshot;
use crate::Millis;
use crate::level::Level;
use crate::tuning::{Tuning, TuningError};

/// Top-level mode of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Idle, waiting for the player to start
    Start,
    /// Short guard after a reset, input ignored
    Ready,
    /// Active gameplay
    Playing,
    /// Player lost (see `GameOverReason`)
    GameOver,
    /// All enemies defeated
    LevelClear,
}

impl Phase {
    /// Terminal phases freeze the round for display
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::GameOver | Phase::LevelClear)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    Hit,
    TimeExpired,
}

/// Player stats, improved by power-ups for the rest of the round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub max_bombs: u32,
    pub bomb_range: u32,
    /// Seconds per tile (lower is faster)
    pub move_speed: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: IVec2,
    pub stats: PlayerStats,
    /// Pickup glow ends at this time
    pub glow_until: Option<Millis>,
}

impl Player {
    pub fn is_glowing(&self, now: Millis) -> bool {
        self.glow_until.is_some_and(|until| now < until)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enemy {
    /// Stable for the round, never reused
    pub id: u32,
    pub pos: IVec2,
}

/// A placed bomb. Range is captured at placement time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bomb {
    pub id: u32,
    pub pos: IVec2,
    pub expires_at: Millis,
    pub range: u32,
}

impl Bomb {
    #[inline]
    pub fn is_due(&self, now: Millis) -> bool {
        now >= self.expires_at
    }
}

/// One hazardous cell produced by a detonation batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlastCell {
    pub pos: IVec2,
    pub batch: u32,
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    FlameRange,
    BombCapacity,
    SpeedBoost,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::FlameRange,
        PowerUpKind::BombCapacity,
        PowerUpKind::SpeedBoost,
    ];

    /// Feedback text shown on pickup
    pub fn feedback_text(self) -> &'static str {
        match self {
            PowerUpKind::FlameRange => "+1 Flame!",
            PowerUpKind::BombCapacity => "+1 Bomb!",
            PowerUpKind::SpeedBoost => "Speed Up!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUp {
    pub pos: IVec2,
    pub kind: PowerUpKind,
}

/// Celebratory particle flung from a defeated enemy (visual only)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Tile the particle starts on
    pub origin: IVec2,
    /// Final offset from the tile, in pixels
    pub offset: Vec2,
    /// Spin over the lifetime, in degrees
    pub spin: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackMessage {
    pub text: String,
    pub pos: IVec2,
}

/// A payload that disappears at `expires_at`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transient<T> {
    pub id: u32,
    pub payload: T,
    pub expires_at: Millis,
}

impl<T> Transient<T> {
    #[inline]
    pub fn is_live(&self, now: Millis) -> bool {
        now < self.expires_at
    }
}

/// Fixed-interval schedule anchored on wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub interval: Millis,
    pub next_due: Millis,
}

impl Cadence {
    /// A disarmed cadence never comes due
    pub fn new(interval: Millis) -> Self {
        Self {
            interval,
            next_due: Millis::MAX,
        }
    }

    /// First firing one interval after `now`
    pub fn arm(&mut self, now: Millis) {
        self.next_due = now.saturating_add(self.interval);
    }

    pub fn disarm(&mut self) {
        self.next_due = Millis::MAX;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due != Millis::MAX
    }

    /// Due time of the pending firing, if it is at or before `now`
    pub fn due(&self, now: Millis) -> Option<Millis> {
        (now >= self.next_due).then_some(self.next_due)
    }

    /// Consume one firing
    pub fn fire(&mut self) {
        self.next_due = self.next_due.saturating_add(self.interval);
    }

    /// Keep at most `keep` of the firings due by `now`, dropping the oldest.
    /// Returns how many were dropped.
    pub fn drop_backlog(&mut self, now: Millis, keep: u32) -> u64 {
        if !self.is_armed() || self.next_due > now {
            return 0;
        }
        let due = (now - self.next_due) / self.interval + 1;
        let dropped = due.saturating_sub(keep as u64);
        self.next_due += dropped * self.interval;
        dropped
    }
}

/// Periodic subsystems of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timers {
    pub countdown: Cadence,
    pub enemy_step: Cadence,
    pub detonation: Cadence,
    /// Ready -> Playing transition time
    pub ready_at: Option<Millis>,
}

impl Timers {
    fn new(tuning: &Tuning) -> Self {
        Self {
            countdown: Cadence::new(tuning.countdown_unit_ms),
            enemy_step: Cadence::new(tuning.enemy_step_ms),
            detonation: Cadence::new(tuning.detonation_poll_ms),
            ready_at: None,
        }
    }

    fn arm(&mut self, now: Millis) {
        self.countdown.arm(now);
        self.enemy_step.arm(now);
        self.detonation.arm(now);
        self.ready_at = None;
    }

    fn disarm(&mut self) {
        self.countdown.disarm();
        self.enemy_step.disarm();
        self.detonation.disarm();
        self.ready_at = None;
    }
}

/// Complete round state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Validated at construction
    pub(crate) tuning: Tuning,
    /// Template the round is rebuilt from
    level: Level,
    pub board: Board,
    pub player: Player,
    /// Sorted by id
    pub enemies: Vec<Enemy>,
    /// Sorted by id (placement order)
    pub bombs: Vec<Bomb>,
    pub blasts: Vec<Transient<BlastCell>>,
    pub power_ups: Vec<PowerUp>,
    pub particles: Vec<Transient<Particle>>,
    pub messages: Vec<Transient<FeedbackMessage>>,
    /// Screen shake ends at this time
    pub shake_until: Option<Millis>,
    pub phase: Phase,
    pub score: u64,
    /// Countdown units left
    pub time_remaining: u32,
    pub game_over_reason: Option<GameOverReason>,
    /// Time the round reached a terminal phase
    pub frozen_at: Option<Millis>,
    pub timers: Timers,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a round in the Start phase, entities placed from the level.
    ///
    /// Rejects tuning that fails [`Tuning::validate`].
    pub fn new(seed: u64, level: Level, tuning: Tuning) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self::build(seed, level, tuning))
    }

    /// Built-in level with default tuning
    pub fn with_defaults(seed: u64) -> Self {
        Self::build(seed, Level::builtin(), Tuning::default())
    }

    fn build(seed: u64, level: Level, tuning: Tuning) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            timers: Timers::new(&tuning),
            board: level.board.clone(),
            player: Player {
                pos: level.player_spawn,
                stats: tuning.initial_stats(),
                glow_until: None,
            },
            enemies: Vec::new(),
            bombs: Vec::new(),
            blasts: Vec::new(),
            power_ups: Vec::new(),
            particles: Vec::new(),
            messages: Vec::new(),
            shake_until: None,
            phase: Phase::Start,
            score: 0,
            time_remaining: tuning.level_time_secs,
            game_over_reason: None,
            frozen_at: None,
            next_id: 1,
            tuning,
            level,
        };
        state.populate();
        state
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Rebuild every entity from the template and enter Ready.
    /// The RNG keeps running so consecutive rounds differ.
    pub fn reset(&mut self, now: Millis) {
        self.populate();
        self.phase = Phase::Ready;
        self.timers.disarm();
        self.timers.ready_at = Some(now.saturating_add(self.tuning.ready_delay_ms));
        log::info!("Round reset (seed {})", self.seed);
    }

    fn populate(&mut self) {
        self.board = self.level.board.clone();
        self.player = Player {
            pos: self.level.player_spawn,
            stats: self.tuning.initial_stats(),
            glow_until: None,
        };
        self.enemies = self
            .level
            .enemy_spawns
            .iter()
            .zip(1..)
            .map(|(&pos, id)| Enemy { id, pos })
            .collect();
        self.bombs.clear();
        self.blasts.clear();
        self.power_ups.clear();
        self.particles.clear();
        self.messages.clear();
        self.shake_until = None;
        self.score = 0;
        self.time_remaining = self.tuning.level_time_secs;
        self.game_over_reason = None;
        self.frozen_at = None;
        self.next_id = self.enemies.len() as u32 + 1;
    }

    /// Ready -> Playing; periodic subsystems start counting from `now`
    pub fn enter_playing(&mut self, now: Millis) {
        self.phase = Phase::Playing;
        self.timers.arm(now);
        log::info!(
            "Round started: {} enemies, {}s on the clock",
            self.enemies.len(),
            self.time_remaining
        );
    }

    /// End the round as lost. No-op once terminal.
    pub fn game_over(&mut self, reason: GameOverReason, now: Millis) {
        if self.finish(Phase::GameOver, now) {
            self.game_over_reason = Some(reason);
            log::info!("Game over ({:?}), score {}", reason, self.score);
        }
    }

    /// End the round as won. No-op once terminal.
    pub fn level_clear(&mut self, now: Millis) {
        if self.finish(Phase::LevelClear, now) {
            log::info!("Level clear, score {}", self.score);
        }
    }

    fn finish(&mut self, phase: Phase, now: Millis) -> bool {
        if self.phase.is_terminal() {
            return false;
        }
        self.phase = phase;
        self.frozen_at = Some(now);
        self.timers.disarm();
        true
    }

    pub fn bomb_at(&self, pos: IVec2) -> bool {
        self.bombs.iter().any(|b| b.pos == pos)
    }

    pub fn enemy_at(&self, pos: IVec2) -> bool {
        self.enemies.iter().any(|e| e.pos == pos)
    }

    /// Whether a live blast cell covers `pos`
    pub fn blast_at(&self, pos: IVec2, now: Millis) -> bool {
        self.blasts
            .iter()
            .any(|b| b.payload.pos == pos && b.is_live(now))
    }

    pub fn power_up_at(&self, pos: IVec2) -> Option<usize> {
        self.power_ups.iter().position(|p| p.pos == pos)
    }

    /// Garbage-collect expired blasts, particles, messages and flags
    pub fn expire_transients(&mut self, now: Millis) {
        self.blasts.retain(|b| b.is_live(now));
        self.particles.retain(|p| p.is_live(now));
        self.messages.retain(|m| m.is_live(now));
        if self.player.glow_until.is_some_and(|until| now >= until) {
            self.player.glow_until = None;
        }
        if self.shake_until.is_some_and(|until| now >= until) {
            self.shake_until = None;
        }
    }

    /// Read-only projection for the presentation layer
    pub fn snapshot(&self, now: Millis) -> Snapshot {
        Snapshot::capture(self, now)
    }

    /// Ensure collections are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.bombs.sort_by_key(|b| b.id);
        self.blasts.sort_by_key(|b| b.id);
        self.particles.sort_by_key(|p| p.id);
        self.messages.sort_by_key(|m| m.id);
    }
}
