//! Board: 5×5 tile values, 0 = empty. Row 0 is the top.

use std::fmt;

/// Board side length (rows and columns).
pub const GRID_SIZE: usize = 5;

/// Tile value. Non-zero values are powers of two.
pub type Tile = u64;

/// Empty cell marker.
pub const EMPTY: Tile = 0;

/// Highest rank with a dedicated colour / label entry (2^20 = 1048576).
pub const MAX_RANK: u32 = 20;

/// Grid coordinate: (row, col), row 0 at the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Signed constructor used by input translation; `None` when outside the board.
    pub fn checked(row: i32, col: i32) -> Option<Self> {
        let in_range = |v: i32| v >= 0 && (v as usize) < GRID_SIZE;
        (in_range(row) && in_range(col)).then(|| Self::new(row as usize, col as usize))
    }

    /// 8-neighbourhood: horizontally, vertically or diagonally touching.
    /// A coordinate is not adjacent to itself.
    pub fn is_adjacent(self, other: Self) -> bool {
        let dr = self.row.abs_diff(other.row);
        let dc = self.col.abs_diff(other.col);
        dr <= 1 && dc <= 1 && (dr, dc) != (0, 0)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Tile rank: log2 of the value; 0 for an empty cell or a non power of two.
pub fn rank(value: Tile) -> u32 {
    if value.is_power_of_two() {
        value.trailing_zeros()
    } else {
        0
    }
}

/// Value for a rank (rank 1 = 2).
pub const fn value_of_rank(rank: u32) -> Tile {
    1 << rank
}

/// Short label for a tile: values from 16384 up are shown in K.
pub fn format_value(value: Tile) -> String {
    if value >= 16_384 {
        format!("{}K", value / 1024)
    } else {
        value.to_string()
    }
}

/// The 5×5 board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    /// cells[row][col]; row 0 is top.
    cells: [[Tile; GRID_SIZE]; GRID_SIZE],
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: [[Tile; GRID_SIZE]; GRID_SIZE]) -> Self {
        Self { cells: rows }
    }

    #[inline]
    pub fn get(&self, at: Coord) -> Option<Tile> {
        self.cells.get(at.row).and_then(|row| row.get(at.col)).copied()
    }

    /// Write a cell. Returns false (and does nothing) when out of bounds.
    #[inline]
    pub fn set(&mut self, at: Coord, value: Tile) -> bool {
        match self.cells.get_mut(at.row).and_then(|row| row.get_mut(at.col)) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn is_empty_at(&self, at: Coord) -> bool {
        self.get(at) == Some(EMPTY)
    }

    pub fn rows(&self) -> &[[Tile; GRID_SIZE]; GRID_SIZE] {
        &self.cells
    }

    /// Column values top to bottom.
    pub fn column(&self, col: usize) -> [Tile; GRID_SIZE] {
        let mut out = [EMPTY; GRID_SIZE];
        for (row, slot) in out.iter_mut().enumerate() {
            *slot = self.cells[row][col];
        }
        out
    }

    /// All coordinates in row-major order.
    pub fn coords() -> impl Iterator<Item = Coord> {
        (0..GRID_SIZE).flat_map(|row| (0..GRID_SIZE).map(move |col| Coord::new(row, col)))
    }

    pub fn empty_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        Self::coords().filter(|&c| self.is_empty_at(c))
    }

    pub fn is_full(&self) -> bool {
        self.empty_cells().next().is_none()
    }

    pub fn max_tile(&self) -> Tile {
        self.cells.iter().flatten().copied().max().unwrap_or(EMPTY)
    }

    /// True if two 8-adjacent cells hold the same non-zero value.
    pub fn has_legal_move(&self) -> bool {
        Self::coords().any(|a| {
            let v = self.cells[a.row][a.col];
            v != EMPTY
                && Self::coords()
                    .filter(|&b| b > a && a.is_adjacent(b))
                    .any(|b| self.cells[b.row][b.col] == v)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_and_set_bounds() {
        let mut g = Grid::new();
        assert!(g.set(Coord::new(4, 4), 8));
        assert_eq!(g.get(Coord::new(4, 4)), Some(8));
        assert!(!g.set(Coord::new(5, 0), 8));
        assert_eq!(g.get(Coord::new(0, 5)), None);
    }

    #[test]
    fn adjacency_is_eight_connected() {
        let c = Coord::new(2, 2);
        assert!(c.is_adjacent(Coord::new(1, 1)));
        assert!(c.is_adjacent(Coord::new(3, 2)));
        assert!(!c.is_adjacent(c));
        assert!(!c.is_adjacent(Coord::new(4, 2)));
    }

    #[test]
    fn checked_coord_rejects_outside() {
        assert_eq!(Coord::checked(-1, 0), None);
        assert_eq!(Coord::checked(0, 5), None);
        assert_eq!(Coord::checked(4, 0), Some(Coord::new(4, 0)));
    }

    #[test]
    fn labels_switch_to_k() {
        assert_eq!(format_value(8192), "8192");
        assert_eq!(format_value(16_384), "16K");
        assert_eq!(format_value(1_048_576), "1024K");
    }

    #[test]
    fn rank_of_values() {
        assert_eq!(rank(2), 1);
        assert_eq!(rank(256), 8);
        assert_eq!(rank(0), 0);
        assert_eq!(value_of_rank(6), 64);
    }

    #[test]
    fn legal_move_detection() {
        let checker = Grid::from_rows([
            [2, 4, 2, 4, 2],
            [8, 16, 8, 16, 8],
            [2, 4, 2, 4, 2],
            [8, 16, 8, 16, 8],
            [2, 4, 2, 4, 2],
        ]);
        assert!(!checker.has_legal_move());

        let mut diag = checker.clone();
        diag.set(Coord::new(1, 1), 2);
        assert!(diag.has_legal_move());
    }
}
