//! Arena grid: tiles, bounds and walkability
//!
//! Coordinates are `IVec2` with `x` growing right and `y` growing down,
//! 0-indexed from the top-left corner. The outer ring is always Wall.

use std::fmt;

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Terrain tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    /// Walkable, passable to blasts
    Floor,
    /// Permanent, blocks movement and blasts
    Wall,
    /// Destructible; blocks movement and blasts until destroyed (becomes Floor)
    Partition,
}

impl Tile {
    pub fn glyph(self) -> char {
        match self {
            Tile::Floor => '.',
            Tile::Wall => '#',
            Tile::Partition => '+',
        }
    }

    pub fn from_glyph(c: char) -> Option<Self> {
        match c {
            '.' => Some(Tile::Floor),
            '#' => Some(Tile::Wall),
            '+' => Some(Tile::Partition),
            _ => None,
        }
    }
}

/// Axis direction for movement and blast rays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    /// Unit vector for this direction
    pub fn delta(self) -> IVec2 {
        match self {
            Dir::Up => IVec2::new(0, -1),
            Dir::Down => IVec2::new(0, 1),
            Dir::Left => IVec2::new(-1, 0),
            Dir::Right => IVec2::new(1, 0),
        }
    }
}

/// Fixed-size tile grid (row-major)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Board {
    /// Build a board from row-major tiles. Callers validate shape and boundary.
    pub(crate) fn from_tiles(width: usize, height: usize, tiles: Vec<Tile>) -> Self {
        debug_assert_eq!(tiles.len(), width * height);
        Self {
            width,
            height,
            tiles,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    fn index(&self, pos: IVec2) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.y as usize * self.width + pos.x as usize)
    }

    /// Tile at `pos`, `None` when out of bounds
    pub fn tile(&self, pos: IVec2) -> Option<Tile> {
        self.index(pos).map(|i| self.tiles[i])
    }

    /// True only for in-bounds Floor tiles
    pub fn is_walkable(&self, pos: IVec2) -> bool {
        self.tile(pos) == Some(Tile::Floor)
    }

    /// Convert a Partition to Floor. Returns false (and changes nothing) for any other tile.
    pub fn destroy_partition(&mut self, pos: IVec2) -> bool {
        match self.index(pos) {
            Some(i) if self.tiles[i] == Tile::Partition => {
                self.tiles[i] = Tile::Floor;
                true
            }
            _ => false,
        }
    }

    /// Whether `pos` lies on the outer ring
    pub fn is_boundary(&self, pos: IVec2) -> bool {
        self.in_bounds(pos)
            && (pos.x == 0
                || pos.y == 0
                || pos.x as usize == self.width - 1
                || pos.y as usize == self.height - 1)
    }

    /// Every outer-ring tile is Wall
    pub fn boundary_intact(&self) -> bool {
        self.positions()
            .filter(|&p| self.is_boundary(p))
            .all(|p| self.tile(p) == Some(Tile::Wall))
    }

    /// Number of tiles of the given kind
    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|&&t| t == tile).count()
    }

    /// All coordinates in row-major order
    pub fn positions(&self) -> impl Iterator<Item = IVec2> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| IVec2::new(x as i32, y as i32)))
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> {
        self.tiles.chunks(self.width)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            let line: String = row.iter().map(|t| t.glyph()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn small_board() -> Board {
        use Tile::*;
        #[rustfmt::skip]
        let tiles = vec![
            Wall, Wall,      Wall,  Wall,
            Wall, Floor,     Partition, Wall,
            Wall, Floor,     Floor, Wall,
            Wall, Wall,      Wall,  Wall,
        ];
        Board::from_tiles(4, 4, tiles)
    }

    #[test]
    fn test_walkable_only_floor() {
        let board = small_board();
        assert!(board.is_walkable(IVec2::new(1, 1)));
        assert!(!board.is_walkable(IVec2::new(2, 1))); // partition
        assert!(!board.is_walkable(IVec2::new(0, 0))); // wall
        assert!(!board.is_walkable(IVec2::new(-1, 1)));
        assert!(!board.is_walkable(IVec2::new(4, 1)));
    }

    #[test]
    fn test_destroy_partition() {
        let mut board = small_board();
        assert!(board.destroy_partition(IVec2::new(2, 1)));
        assert_eq!(board.tile(IVec2::new(2, 1)), Some(Tile::Floor));
        assert!(board.is_walkable(IVec2::new(2, 1)));

        // Second attempt is a no-op
        assert!(!board.destroy_partition(IVec2::new(2, 1)));
        // Walls and out-of-bounds never change
        assert!(!board.destroy_partition(IVec2::new(0, 0)));
        assert!(!board.destroy_partition(IVec2::new(9, 9)));
        assert_eq!(board.tile(IVec2::new(0, 0)), Some(Tile::Wall));
    }

    #[test]
    fn test_boundary() {
        let board = small_board();
        assert!(board.boundary_intact());
        assert!(board.is_boundary(IVec2::new(3, 2)));
        assert!(!board.is_boundary(IVec2::new(1, 2)));
        assert!(!board.is_boundary(IVec2::new(-1, 0)));
    }

    #[test]
    fn test_display() {
        let board = small_board();
        assert_eq!(board.to_string(), "####\n#.+#\n#..#\n####\n");
    }

    proptest! {
        #[test]
        fn prop_out_of_bounds_never_walkable(
            x in prop_oneof![(-1000i32..0), (4i32..1000)],
            y in -1000i32..1000,
        ) {
            let board = small_board();
            prop_assert!(!board.is_walkable(IVec2::new(x, y)));
            prop_assert!(!board.is_walkable(IVec2::new(y, x)));
            prop_assert_eq!(board.tile(IVec2::new(x, y)), None);
        }
    }
}
