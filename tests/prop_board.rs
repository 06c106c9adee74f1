//! Property-based tests for selection, merge, gravity and refill.
//!
//! Run with: cargo test --release prop_board

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use mergetui::animation::{ABOVE_BOARD, AnimationClock};
use mergetui::grid::{Coord, GRID_SIZE, Grid, Tile};
use mergetui::{gravity, merge, selection, spawn};

fn tile() -> impl Strategy<Value = Tile> {
    prop_oneof![Just(0u64), (1u32..=6).prop_map(|r| 1u64 << r)]
}

fn any_grid() -> impl Strategy<Value = Grid> {
    proptest::array::uniform5(proptest::array::uniform5(tile())).prop_map(Grid::from_rows)
}

fn full_grid() -> impl Strategy<Value = Grid> {
    proptest::array::uniform5(proptest::array::uniform5((1u32..=3).prop_map(|r| 1u64 << r)))
        .prop_map(Grid::from_rows)
}

fn coord() -> impl Strategy<Value = Coord> {
    (0..GRID_SIZE, 0..GRID_SIZE).prop_map(|(r, c)| Coord::new(r, c))
}

/// A walk of 8-neighbour steps, clamped to the board (may revisit cells).
fn walk() -> impl Strategy<Value = Vec<Coord>> {
    (coord(), proptest::collection::vec((-1i32..=1, -1i32..=1), 1..8)).prop_map(
        |(start, steps)| {
            let mut path = vec![start];
            let mut at = start;
            for (dr, dc) in steps {
                if let Some(next) = Coord::checked(at.row as i32 + dr, at.col as i32 + dc) {
                    at = next;
                    path.push(at);
                }
            }
            path
        },
    )
}

fn settle(clock: &mut AnimationClock, grid: &mut Grid) {
    while !clock.is_idle() {
        clock.tick(grid);
    }
}

fn non_zero(column: [Tile; GRID_SIZE]) -> Vec<Tile> {
    column.into_iter().filter(|&v| v != 0).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Accepted paths are adjacent, uniform and free of repeats.
    #[test]
    fn prop_accepted_paths_are_adjacent_and_uniform(grid in any_grid(), path in walk()) {
        if selection::validate(&grid, &path) {
            let v = grid.get(path[0]).unwrap();
            prop_assert!(v != 0);
            for w in path.windows(2) {
                prop_assert!(w[0].row.abs_diff(w[1].row) <= 1);
                prop_assert!(w[0].col.abs_diff(w[1].col) <= 1);
            }
            prop_assert!(path.iter().all(|&c| grid.get(c) == Some(v)));
        }
    }

    /// A uniform merge keeps exactly the last cell, multiplied, and zeroes the rest.
    #[test]
    fn prop_merge_conservation(grid in full_grid(), path in walk()) {
        let mut after = grid.clone();
        match merge::resolve(&mut after, &path) {
            Some(m) if selection::validate(&grid, &path) => {
                let v = grid.get(path[0]).unwrap();
                let expected = v * merge::multiplier(path.len());
                prop_assert_eq!(m.value, expected);
                prop_assert_eq!(m.score_delta, expected);
                prop_assert_eq!(after.get(m.target), Some(expected));
                let zeroed = Grid::coords().filter(|&c| after.get(c) == Some(0)).count();
                prop_assert_eq!(zeroed, path.len() - 1);
            }
            Some(_) => {
                // Uniform but not a legal gesture (skips or repeats); resolve does not judge.
            }
            None => prop_assert_eq!(&after, &grid),
        }
    }

    /// Collapse keeps each column's tiles in order and packs them to the bottom.
    #[test]
    fn prop_gravity_preserves_column_order(grid in any_grid()) {
        let mut g = grid.clone();
        let falls = gravity::collapse(&mut g);
        let mut dests: Vec<Coord> = falls.iter().map(|a| a.dest).collect();
        dests.sort();
        dests.dedup();
        prop_assert_eq!(dests.len(), falls.len());

        let mut clock = AnimationClock::new(0.3);
        clock.extend(falls);
        settle(&mut clock, &mut g);
        for col in 0..GRID_SIZE {
            let before = non_zero(grid.column(col));
            let column = g.column(col);
            prop_assert_eq!(non_zero(column), before.clone());
            let gaps = GRID_SIZE - before.len();
            prop_assert!(column[..gaps].iter().all(|&v| v == 0));
        }
    }

    /// Gravity then refill leaves no empty cell once everything lands.
    #[test]
    fn prop_refill_completes_board(grid in any_grid(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut g = grid;
        let mut clock = AnimationClock::new(0.5);
        clock.extend(gravity::collapse(&mut g));
        let reserved: Vec<Coord> = clock.reserved().collect();
        let spawns = spawn::refill(&g, &reserved, &mut rng);
        prop_assert!(spawns.iter().all(|a| a.start_row == ABOVE_BOARD));
        clock.extend(spawns);
        settle(&mut clock, &mut g);
        prop_assert!(g.is_full());
    }

    /// Every destination is written once, on the tick its progress reaches 1.0.
    #[test]
    fn prop_commit_exactly_once(grid in any_grid(), step in 0.05f32..=1.0) {
        let mut g = grid;
        let falls = gravity::collapse(&mut g);
        let expected: Vec<(Coord, Tile)> = falls.iter().map(|a| (a.dest, a.value)).collect();
        let mut clock = AnimationClock::new(step);
        clock.extend(falls);

        let mut committed = 0;
        while !clock.is_idle() {
            let pending: Vec<Coord> = clock.reserved().collect();
            for &c in &pending {
                prop_assert_eq!(g.get(c), Some(0));
            }
            committed += clock.tick(&mut g);
        }
        prop_assert_eq!(committed, expected.len());
        for (dest, value) in expected {
            prop_assert_eq!(g.get(dest), Some(value));
        }
    }
}
