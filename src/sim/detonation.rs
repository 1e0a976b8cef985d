//! Fuse expiry, blast propagation and casualties
//!
//! A detonation batch consumes every bomb whose fuse has expired, marches
//! four rays from each, destroys the first Partition each ray meets, and then
//! resolves enemy and player casualties against the combined blast set.
//!
//! Bombs are removed from the state before any score is awarded, so a bomb
//! can contribute to exactly one batch.

use std::f32::consts::TAU;

use glam::{IVec2, Vec2};
use rand::Rng;

use super::board::{Board, Dir, Tile};
use super::state::{
    BlastCell, Bomb, Enemy, GameOverReason, GameState, Particle, Phase, PowerUp, PowerUpKind,
    Transient,
};
use crate::Millis;
use crate::consts::PARTICLES_PER_ENEMY;

/// What a single batch did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetonationReport {
    /// Bomb ids consumed by this batch
    pub bombs: Vec<u32>,
    /// Distinct blast cells
    pub cells: Vec<IVec2>,
    pub partitions_destroyed: Vec<IVec2>,
    pub power_ups_spawned: Vec<IVec2>,
    pub enemies_defeated: Vec<u32>,
    pub player_hit: bool,
}

/// Where one blast ray ends up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ray {
    /// Cells the ray marks, nearest first
    pub cells: Vec<IVec2>,
    /// Partition that stopped the ray (it is also the last marked cell)
    pub partition: Option<IVec2>,
}

/// March a ray from `origin` for up to `range` tiles.
///
/// Stops before the first Wall or out-of-bounds cell, and on (including) the
/// first Partition.
pub fn march(board: &Board, origin: IVec2, dir: Dir, range: u32) -> Ray {
    let mut cells = Vec::new();
    let mut partition = None;
    // No ray outlives the board, whatever the pickups added
    let reach = range.min(board.width().max(board.height()) as u32);
    for step in 1..=reach as i32 {
        let pos = origin + dir.delta() * step;
        match board.tile(pos) {
            None | Some(Tile::Wall) => break,
            Some(Tile::Floor) => cells.push(pos),
            Some(Tile::Partition) => {
                cells.push(pos);
                partition = Some(pos);
                break;
            }
        }
    }
    Ray { cells, partition }
}

/// Detonate every bomb due at `now`. Returns `None` when nothing exploded.
pub fn detonate_expired(state: &mut GameState, now: Millis) -> Option<DetonationReport> {
    if state.phase != Phase::Playing {
        return None;
    }

    // Consume due bombs up front
    let (exploding, waiting): (Vec<Bomb>, Vec<Bomb>) =
        state.bombs.iter().partition(|b| b.is_due(now));
    if exploding.is_empty() {
        return None;
    }
    state.bombs = waiting;

    let mut report = DetonationReport {
        bombs: exploding.iter().map(|b| b.id).collect(),
        ..Default::default()
    };

    for bomb in &exploding {
        mark(&mut report.cells, bomb.pos);
        for dir in Dir::ALL {
            let ray = march(&state.board, bomb.pos, dir, bomb.range);
            for &pos in &ray.cells {
                mark(&mut report.cells, pos);
            }
            if let Some(pos) = ray.partition {
                destroy_partition(state, pos, &mut report);
            }
        }
    }

    let batch = state.next_entity_id();
    let expires_at = now.saturating_add(state.tuning.explosion_ms);
    for &pos in &report.cells {
        let id = state.next_entity_id();
        state.blasts.push(Transient {
            id,
            payload: BlastCell { pos, batch },
            expires_at,
        });
    }
    state.shake_until = Some(now.saturating_add(state.tuning.shake_ms));

    // Casualties
    let cells = &report.cells;
    let (defeated, survivors): (Vec<Enemy>, Vec<Enemy>) =
        state.enemies.iter().partition(|e| cells.contains(&e.pos));
    state.enemies = survivors;
    for enemy in &defeated {
        state.score += state.tuning.enemy_score;
        spawn_particles(state, enemy.pos, now);
        report.enemies_defeated.push(enemy.id);
    }

    log::debug!(
        "Batch {}: {} bombs, {} cells, {} partitions, {} enemies",
        batch,
        report.bombs.len(),
        report.cells.len(),
        report.partitions_destroyed.len(),
        report.enemies_defeated.len()
    );

    // Hit takes precedence over clearing the level
    if report.cells.contains(&state.player.pos) {
        report.player_hit = true;
        state.game_over(GameOverReason::Hit, now);
    } else if state.enemies.is_empty() {
        state.level_clear(now);
    }

    Some(report)
}

fn mark(cells: &mut Vec<IVec2>, pos: IVec2) {
    if !cells.contains(&pos) {
        cells.push(pos);
    }
}

fn destroy_partition(state: &mut GameState, pos: IVec2, report: &mut DetonationReport) {
    if !state.board.destroy_partition(pos) {
        return;
    }
    state.score += state.tuning.partition_score;
    report.partitions_destroyed.push(pos);

    if state.rng.random_bool(state.tuning.powerup_drop_chance) {
        let kind = PowerUpKind::ALL[state.rng.random_range(0..PowerUpKind::ALL.len())];
        if state.power_up_at(pos).is_none() {
            state.power_ups.push(PowerUp { pos, kind });
            report.power_ups_spawned.push(pos);
        }
    }
}

fn spawn_particles(state: &mut GameState, origin: IVec2, now: Millis) {
    let expires_at = now.saturating_add(state.tuning.particle_ms);
    for _ in 0..PARTICLES_PER_ENEMY {
        let angle = state.rng.random::<f32>() * TAU;
        let distance = 40.0 + state.rng.random::<f32>() * 40.0;
        let spin = state.rng.random::<f32>() * 720.0 - 360.0;
        let id = state.next_entity_id();
        state.particles.push(Transient {
            id,
            payload: Particle {
                origin,
                offset: Vec2::from_angle(angle) * distance,
                spin,
            },
            expires_at,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    use crate::consts::{ENEMY_SCORE, EXPLOSION_MS, PARTITION_SCORE};
    use crate::level::Level;
    use crate::tuning::Tuning;

    fn playing(map: &str, tuning: Tuning) -> GameState {
        let mut state = GameState::new(5, Level::parse(map).unwrap(), tuning).unwrap();
        state.enter_playing(0);
        state
    }

    fn bomb(state: &mut GameState, pos: IVec2, range: u32, expires_at: Millis) {
        let id = state.next_entity_id();
        state.bombs.push(Bomb {
            id,
            pos,
            expires_at,
            range,
        });
    }

    fn no_drops() -> Tuning {
        Tuning {
            powerup_drop_chance: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_nothing_due() {
        let mut state = playing("#######\n#P...E#\n#######", no_drops());
        bomb(&mut state, IVec2::new(3, 1), 1, 3000);
        assert_eq!(detonate_expired(&mut state, 2999), None);
        assert_eq!(state.bombs.len(), 1);
        assert!(state.blasts.is_empty());
    }

    #[test]
    fn test_partition_and_wall_scenario() {
        // Bomb at (2,2): partition to the right, wall to the left
        let map = "\
#######
#P....#
##.+..#
#....E#
#######
";
        let mut state = playing(map, no_drops());
        bomb(&mut state, IVec2::new(2, 2), 1, 3000);
        let report = detonate_expired(&mut state, 3000).unwrap();

        assert_eq!(state.board.tile(IVec2::new(3, 2)), Some(Tile::Floor));
        assert_eq!(state.score, PARTITION_SCORE);
        assert_eq!(report.partitions_destroyed, vec![IVec2::new(3, 2)]);
        assert!(!report.cells.contains(&IVec2::new(1, 2)));
        assert!(report.cells.contains(&IVec2::new(2, 2)));
        assert_eq!(report.cells.len(), 4); // self, up, down, partition
        assert!(state.bombs.is_empty());
        assert_eq!(state.phase, Phase::Playing);
        assert!(state.blasts.iter().all(|b| b.expires_at == 3000 + EXPLOSION_MS));
        assert!(state.board.boundary_intact());
    }

    #[test]
    fn test_partition_blocks_ray() {
        let map = "\
#########
#P.++..E#
#########
";
        let mut state = playing(map, no_drops());
        bomb(&mut state, IVec2::new(2, 1), 5, 0);
        let report = detonate_expired(&mut state, 0).unwrap();
        // First partition destroyed, second untouched
        assert_eq!(report.partitions_destroyed, vec![IVec2::new(3, 1)]);
        assert_eq!(state.board.tile(IVec2::new(4, 1)), Some(Tile::Partition));
        assert!(!report.cells.contains(&IVec2::new(4, 1)));
        assert!(!report.cells.contains(&IVec2::new(7, 1)));
    }

    #[test]
    fn test_overlapping_bombs_kill_once() {
        let map = "\
#########
#P......#
#.......#
#...E...#
#########
";
        let mut state = playing(map, no_drops());
        state.enemies.push(Enemy {
            id: 99,
            pos: IVec2::new(7, 1),
        });
        bomb(&mut state, IVec2::new(3, 3), 1, 1000);
        bomb(&mut state, IVec2::new(5, 3), 1, 1000);
        let report = detonate_expired(&mut state, 1000).unwrap();

        assert_eq!(report.enemies_defeated, vec![1]);
        assert_eq!(state.score, ENEMY_SCORE);
        assert_eq!(state.particles.len(), PARTICLES_PER_ENEMY);
        // Shared cell counted once
        assert_eq!(
            report.cells.iter().filter(|&&c| c == IVec2::new(4, 3)).count(),
            1
        );
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.phase, Phase::Playing);
    }

    #[test]
    fn test_caught_bomb_waits_for_own_fuse() {
        let map = "\
#######
#P....#
#.....#
#######
";
        let mut state = playing(map, no_drops());
        state.enemies.push(Enemy {
            id: 50,
            pos: IVec2::new(5, 2),
        });
        bomb(&mut state, IVec2::new(3, 1), 1, 1000);
        bomb(&mut state, IVec2::new(4, 1), 1, 2000);
        let report = detonate_expired(&mut state, 1000).unwrap();
        assert_eq!(report.bombs.len(), 1);
        assert_eq!(state.bombs.len(), 1);
        assert_eq!(state.bombs[0].pos, IVec2::new(4, 1));
    }

    #[test]
    fn test_player_hit_beats_level_clear() {
        let map = "\
#######
#.PE..#
#######
";
        let mut state = playing(map, no_drops());
        bomb(&mut state, IVec2::new(2, 1), 1, 0);
        let report = detonate_expired(&mut state, 0).unwrap();
        assert!(report.player_hit);
        assert!(state.enemies.is_empty());
        assert_eq!(state.phase, Phase::GameOver);
        assert_eq!(state.game_over_reason, Some(GameOverReason::Hit));
    }

    #[test]
    fn test_last_enemy_clears_level() {
        let map = "\
#######
#P..E.#
#######
";
        let mut state = playing(map, no_drops());
        bomb(&mut state, IVec2::new(4, 1), 1, 0);
        detonate_expired(&mut state, 0).unwrap();
        assert_eq!(state.phase, Phase::LevelClear);
        assert_eq!(state.game_over_reason, None);
        // Frozen afterwards
        bomb(&mut state, IVec2::new(2, 1), 1, 0);
        assert_eq!(detonate_expired(&mut state, 10), None);
    }

    #[test]
    fn test_destroyed_partition_never_rewarded_twice() {
        let map = "\
########
#P..+.E#
########
";
        let mut state = playing(map, no_drops());
        bomb(&mut state, IVec2::new(3, 1), 1, 0);
        detonate_expired(&mut state, 0).unwrap();
        assert_eq!(state.score, PARTITION_SCORE);

        bomb(&mut state, IVec2::new(3, 1), 1, 10);
        let report = detonate_expired(&mut state, 10).unwrap();
        assert!(report.partitions_destroyed.is_empty());
        assert_eq!(state.score, PARTITION_SCORE);
        assert!(state.power_ups.is_empty());
    }

    #[test]
    fn test_power_up_drop() {
        let map = "\
########
#P..+.E#
########
";
        let tuning = Tuning {
            powerup_drop_chance: 1.0,
            ..Default::default()
        };
        let mut state = playing(map, tuning);
        bomb(&mut state, IVec2::new(3, 1), 1, 0);
        let report = detonate_expired(&mut state, 0).unwrap();
        assert_eq!(report.power_ups_spawned, vec![IVec2::new(4, 1)]);
        assert_eq!(state.power_ups.len(), 1);
        assert_eq!(state.power_ups[0].pos, IVec2::new(4, 1));
    }

    #[test]
    fn test_occupied_cell_gets_no_second_power_up() {
        let map = "\
########
#P..+.E#
########
";
        let tuning = Tuning {
            powerup_drop_chance: 1.0,
            ..Default::default()
        };
        let mut state = playing(map, tuning);
        state.power_ups.push(PowerUp {
            pos: IVec2::new(4, 1),
            kind: PowerUpKind::SpeedBoost,
        });
        bomb(&mut state, IVec2::new(3, 1), 1, 0);
        detonate_expired(&mut state, 0).unwrap();
        assert_eq!(state.power_ups.len(), 1);
        assert_eq!(state.power_ups[0].kind, PowerUpKind::SpeedBoost);
    }

    #[test]
    fn test_huge_range_reaches_board_edge() {
        let board = Board::from_tiles(5, 1, vec![Tile::Floor; 5]);
        let ray = march(&board, IVec2::new(0, 0), Dir::Right, u32::MAX);
        assert_eq!(
            ray.cells,
            (1..5).map(|x| IVec2::new(x, 0)).collect::<Vec<_>>()
        );
        assert_eq!(ray.partition, None);
    }

    fn arb_tile() -> impl Strategy<Value = Tile> {
        prop_oneof![
            4 => Just(Tile::Floor),
            1 => Just(Tile::Wall),
            1 => Just(Tile::Partition),
        ]
    }

    proptest! {
        #[test]
        fn prop_ray_stops_at_first_blocker(
            inner in prop::collection::vec(arb_tile(), 7 * 7),
            ox in 1i32..8,
            oy in 1i32..8,
            range in 1u32..10,
        ) {
            // 9x9 board with a wall ring around random interior
            let mut tiles = Vec::with_capacity(81);
            for y in 0..9 {
                for x in 0..9 {
                    if x == 0 || y == 0 || x == 8 || y == 8 {
                        tiles.push(Tile::Wall);
                    } else {
                        tiles.push(inner[(y - 1) * 7 + (x - 1)]);
                    }
                }
            }
            let board = Board::from_tiles(9, 9, tiles);
            let origin = IVec2::new(ox, oy);

            for dir in Dir::ALL {
                let ray = march(&board, origin, dir, range);
                prop_assert!(ray.cells.len() <= range as usize);
                for (i, &cell) in ray.cells.iter().enumerate() {
                    prop_assert_eq!(cell, origin + dir.delta() * (i as i32 + 1));
                    let tile = board.tile(cell);
                    prop_assert!(tile.is_some());
                    prop_assert_ne!(tile, Some(Tile::Wall));
                    if tile == Some(Tile::Partition) {
                        prop_assert_eq!(i, ray.cells.len() - 1);
                        prop_assert_eq!(ray.partition, Some(cell));
                    }
                }
                // The ray ended early only because of a blocker
                if ray.partition.is_none() && ray.cells.len() < range as usize {
                    let next = origin + dir.delta() * (ray.cells.len() as i32 + 1);
                    prop_assert!(matches!(board.tile(next), None | Some(Tile::Wall)));
                }
            }
        }
    }
}
