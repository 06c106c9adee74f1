//! Column collapse after a merge empties cells.

use crate::animation::FallAnimation;
use crate::grid::{Coord, EMPTY, GRID_SIZE, Grid};
use tracing::debug;

/// Pull tiles down into gaps, one column at a time, bottom-up.
///
/// Each tile that has to move is lifted out of the grid right away (its cell becomes 0) and
/// returned as a [`FallAnimation`]; the destination stays empty until the clock commits it.
/// A column is done as soon as a gap has nothing above it.
pub fn collapse(grid: &mut Grid) -> Vec<FallAnimation> {
    let mut falls = Vec::new();
    for col in 0..GRID_SIZE {
        collapse_column(grid, col, &mut falls);
    }
    if !falls.is_empty() {
        debug!(count = falls.len(), "gravity falls");
    }
    falls
}

fn collapse_column(grid: &mut Grid, col: usize, falls: &mut Vec<FallAnimation>) {
    for row in (0..GRID_SIZE).rev() {
        let gap = Coord::new(row, col);
        if !grid.is_empty_at(gap) {
            continue;
        }
        let source = (0..row)
            .rev()
            .map(|r| Coord::new(r, col))
            .find(|&c| !grid.is_empty_at(c));
        let Some(source) = source else {
            return;
        };
        let value = grid.get(source).unwrap_or(EMPTY);
        grid.set(source, EMPTY);
        falls.push(FallAnimation::new(source.row as i32, gap, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationClock;

    fn grid_with_column(col: usize, values: [u64; GRID_SIZE]) -> Grid {
        let mut g = Grid::new();
        for (row, v) in values.into_iter().enumerate() {
            g.set(Coord::new(row, col), v);
        }
        g
    }

    #[test]
    fn single_tile_falls_two_rows() {
        let mut g = grid_with_column(0, [0, 8, 0, 0, 4]);
        let falls = collapse(&mut g);
        assert_eq!(falls.len(), 1);
        assert_eq!(falls[0].start_row, 1);
        assert_eq!(falls[0].dest, Coord::new(3, 0));
        assert_eq!(falls[0].value, 8);
        assert_eq!(g.column(0), [0, 0, 0, 0, 4]);

        let mut clock = AnimationClock::new(1.0);
        clock.extend(falls);
        clock.tick(&mut g);
        assert_eq!(g.column(0), [0, 0, 0, 8, 4]);
    }

    #[test]
    fn order_is_preserved() {
        let mut g = grid_with_column(2, [2, 4, 0, 8, 0]);
        let falls = collapse(&mut g);
        let mut clock = AnimationClock::new(1.0);
        clock.extend(falls);
        clock.tick(&mut g);
        assert_eq!(g.column(2), [0, 0, 2, 4, 8]);
    }

    #[test]
    fn full_and_empty_columns_produce_nothing() {
        let mut g = grid_with_column(1, [2, 4, 8, 16, 32]);
        assert!(collapse(&mut g).is_empty());
        assert_eq!(g.column(1), [2, 4, 8, 16, 32]);
        assert_eq!(g.column(0), [0; GRID_SIZE]);
    }

    #[test]
    fn destinations_are_distinct() {
        let mut g = Grid::from_rows([
            [2, 4, 8, 0, 2],
            [0, 0, 8, 4, 0],
            [4, 0, 0, 0, 2],
            [0, 2, 0, 8, 0],
            [0, 0, 16, 0, 0],
        ]);
        let falls = collapse(&mut g);
        for (i, a) in falls.iter().enumerate() {
            assert!(falls[..i].iter().all(|b| b.dest != a.dest));
            assert!(a.start_row < a.dest.row as i32);
        }
    }
}
