//! Office Bomber - A grid arena bomb game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (board, bombs, enemies, round clock)
//! - `level`: Level templates (ASCII maps with spawn points)
//! - `tuning`: Data-driven game balance
//! - `web`: Browser facade (wasm32 only)

pub mod level;
pub mod sim;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use level::{Level, LevelError};
pub use tuning::{Tuning, TuningError};

/// Absolute wall-clock time in milliseconds
pub type Millis = u64;

/// Game configuration constants
pub mod consts {
    use super::Millis;

    /// Built-in arena dimensions
    pub const BOARD_WIDTH: usize = 15;
    pub const BOARD_HEIGHT: usize = 13;

    /// Bomb fuse (placement to detonation)
    pub const BOMB_FUSE_MS: Millis = 3000;
    /// How long blast cells stay on the board
    pub const EXPLOSION_MS: Millis = 500;
    /// Enemy random-walk step interval
    pub const ENEMY_STEP_MS: Millis = 1000;
    /// Fuse expiry polling interval
    pub const DETONATION_POLL_MS: Millis = 100;
    /// Countdown unit
    pub const COUNTDOWN_UNIT_MS: Millis = 1000;
    /// Round length in countdown units (seconds)
    pub const LEVEL_TIME_SECS: u32 = 180;
    /// Guard delay between reset and live input
    pub const READY_DELAY_MS: Millis = 50;

    /// Maximum missed periods a cadence replays in one advance
    pub const MAX_CATCH_UP: u32 = 8;

    /// Cosmetic lifetimes
    pub const PARTICLE_MS: Millis = 1050;
    pub const FEEDBACK_MS: Millis = 1500;
    pub const GLOW_MS: Millis = 400;
    pub const SHAKE_MS: Millis = 300;
    /// Particles spawned per defeated enemy
    pub const PARTICLES_PER_ENEMY: usize = 5;

    /// Scoring
    pub const PARTITION_SCORE: u64 = 10;
    pub const ENEMY_SCORE: u64 = 100;
    /// Chance a destroyed partition drops a power-up
    pub const POWERUP_DROP_CHANCE: f64 = 0.3;

    /// Player stat defaults (move speed in seconds per tile)
    pub const INITIAL_MAX_BOMBS: u32 = 1;
    pub const INITIAL_BOMB_RANGE: u32 = 1;
    pub const INITIAL_MOVE_SPEED: f32 = 0.15;
    pub const SPEED_STEP: f32 = 0.02;
    pub const MIN_MOVE_SPEED: f32 = 0.05;
}
