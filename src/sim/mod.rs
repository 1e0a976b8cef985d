//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Wall-clock time is passed in, never read
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod board;
pub mod detonation;
pub mod movement;
pub mod pickup;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod wander;

pub use board::{Board, Dir, Tile};
pub use detonation::{DetonationReport, detonate_expired};
pub use movement::{try_move, try_place_bomb};
pub use pickup::resolve_collisions;
pub use snapshot::Snapshot;
pub use state::{
    BlastCell, Bomb, Cadence, Enemy, FeedbackMessage, GameOverReason, GameState, Particle,
    Phase, Player, PlayerStats, PowerUp, PowerUpKind, Transient,
};
pub use tick::{Command, Intent, TickInput, advance};
pub use wander::step_enemies;
