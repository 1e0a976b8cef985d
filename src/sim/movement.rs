//! Player move and bomb placement validation
//!
//! Illegal actions are normal play friction: they are rejected silently and
//! report `false`, never an error.

use super::board::Dir;
use super::state::{Bomb, GameState, Phase};
use crate::Millis;

/// Step the player one tile if the target is walkable
pub fn try_move(state: &mut GameState, dir: Dir) -> bool {
    if state.phase != Phase::Playing {
        return false;
    }
    let candidate = state.player.pos + dir.delta();
    if !state.board.is_walkable(candidate) {
        log::trace!("Move {:?} blocked at {}", dir, candidate);
        return false;
    }
    state.player.pos = candidate;
    true
}

/// Drop a bomb on the player's tile, fused from `now`
pub fn try_place_bomb(state: &mut GameState, now: Millis) -> bool {
    if state.phase != Phase::Playing {
        return false;
    }
    let pos = state.player.pos;
    let stats = state.player.stats;
    if state.bombs.len() >= stats.max_bombs as usize {
        log::debug!("Bomb rejected: {} of {} already live", state.bombs.len(), stats.max_bombs);
        return false;
    }
    if state.bomb_at(pos) {
        log::debug!("Bomb rejected: tile {} occupied", pos);
        return false;
    }

    let id = state.next_entity_id();
    state.bombs.push(Bomb {
        id,
        pos,
        expires_at: now.saturating_add(state.tuning.bomb_fuse_ms),
        range: stats.bomb_range,
    });
    log::debug!("Bomb {} placed at {} (range {})", id, pos, stats.bomb_range);
    true
}
