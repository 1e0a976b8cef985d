//! Enemy random walk
//!
//! Each step every enemy picks one of the four axis directions uniformly and
//! moves if the target is walkable. No pathfinding, no memory, and enemies
//! may share a tile.

use rand::Rng;

use super::board::Dir;
use super::state::{GameState, Phase};

/// Advance every enemy by one random-walk step. Returns how many moved.
pub fn step_enemies(state: &mut GameState) -> usize {
    if state.phase != Phase::Playing {
        return 0;
    }
    let mut moved = 0;
    for enemy in state.enemies.iter_mut() {
        let dir = Dir::ALL[state.rng.random_range(0..Dir::ALL.len())];
        let candidate = enemy.pos + dir.delta();
        if state.board.is_walkable(candidate) {
            log::trace!("Enemy {} {} -> {}", enemy.id, enemy.pos, candidate);
            enemy.pos = candidate;
            moved += 1;
        }
    }
    moved
}
