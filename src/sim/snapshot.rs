//! Read-only projection of a round for the presentation layer

use glam::IVec2;
use serde::Serialize;

use super::board::Board;
use super::state::{
    Bomb, Enemy, FeedbackMessage, GameOverReason, GameState, Particle, Phase, PlayerStats,
    PowerUp, Transient,
};
use crate::Millis;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub pos: IVec2,
    pub stats: PlayerStats,
    pub glowing: bool,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub board: Board,
    pub player: PlayerView,
    pub enemies: Vec<Enemy>,
    pub bombs: Vec<Bomb>,
    /// Live blast cells (may repeat when batches overlap)
    pub blasts: Vec<IVec2>,
    pub power_ups: Vec<PowerUp>,
    pub particles: Vec<Transient<Particle>>,
    pub messages: Vec<Transient<FeedbackMessage>>,
    pub score: u64,
    pub time_remaining: u32,
    pub phase: Phase,
    pub game_over_reason: Option<GameOverReason>,
    pub shaking: bool,
}

impl Snapshot {
    /// Project `state` as seen at `now`. Terminal rounds are seen at the
    /// moment they froze, so the picture no longer changes.
    pub fn capture(state: &GameState, now: Millis) -> Self {
        let at = state.frozen_at.unwrap_or(now);
        Self {
            board: state.board.clone(),
            player: PlayerView {
                pos: state.player.pos,
                stats: state.player.stats,
                glowing: state.player.is_glowing(at),
            },
            enemies: state.enemies.clone(),
            bombs: state.bombs.clone(),
            blasts: state
                .blasts
                .iter()
                .filter(|b| b.is_live(at))
                .map(|b| b.payload.pos)
                .collect(),
            power_ups: state.power_ups.clone(),
            particles: state.particles.iter().filter(|p| p.is_live(at)).cloned().collect(),
            messages: state.messages.iter().filter(|m| m.is_live(at)).cloned().collect(),
            score: state.score,
            time_remaining: state.time_remaining,
            phase: state.phase,
            game_over_reason: state.game_over_reason,
            shaking: state.shake_until.is_some_and(|until| at < until),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
