//! Player collisions: enemies, live blasts and power-ups

use super::state::{
    FeedbackMessage, GameOverReason, GameState, Phase, PlayerStats, PowerUpKind, Transient,
};
use crate::Millis;
use crate::tuning::Tuning;

/// Check the player's tile against enemies, live blast cells and power-ups.
///
/// Contact with an enemy or a live blast ends the round. A power-up on the
/// player's tile is consumed and applied.
pub fn resolve_collisions(state: &mut GameState, now: Millis) {
    if state.phase != Phase::Playing {
        return;
    }
    let pos = state.player.pos;

    if state.enemy_at(pos) || state.blast_at(pos, now) {
        state.game_over(GameOverReason::Hit, now);
        return;
    }

    let Some(index) = state.power_up_at(pos) else {
        return;
    };
    let power_up = state.power_ups.remove(index);
    apply_power_up(&mut state.player.stats, power_up.kind, &state.tuning);
    log::debug!("Picked up {:?} at {}: {:?}", power_up.kind, pos, state.player.stats);

    let id = state.next_entity_id();
    state.messages.push(Transient {
        id,
        payload: FeedbackMessage {
            text: power_up.kind.feedback_text().to_string(),
            pos,
        },
        expires_at: now.saturating_add(state.tuning.feedback_ms),
    });
    state.player.glow_until = Some(now.saturating_add(state.tuning.glow_ms));
}

/// Permanent stat change for the rest of the round
pub fn apply_power_up(stats: &mut PlayerStats, kind: PowerUpKind, tuning: &Tuning) {
    match kind {
        PowerUpKind::FlameRange => stats.bomb_range += 1,
        PowerUpKind::BombCapacity => stats.max_bombs += 1,
        PowerUpKind::SpeedBoost => {
            stats.move_speed = (stats.move_speed - tuning.speed_step).max(tuning.min_move_speed);
        }
    }
}
