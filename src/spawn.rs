//! New tiles entering from above the board.

use crate::animation::{ABOVE_BOARD, FallAnimation};
use crate::grid::{Coord, GRID_SIZE, Grid, Tile, value_of_rank};
use rand::Rng;
use tracing::debug;

/// Ranks of the values handed out during play: 2, 4, 8, 16, 32, 64.
pub const SPAWN_RANKS: [u32; 6] = [1, 2, 3, 4, 5, 6];

/// Uniform pick from a rank table.
pub fn random_value(ranks: &[u32], rng: &mut impl Rng) -> Tile {
    value_of_rank(ranks[rng.random_range(0..ranks.len())])
}

/// One spawn per column that still has a free cell.
///
/// The target is the topmost cell that is empty and not `reserved` by an animation in
/// flight, so calling this again fills the next free cell down. Full columns produce nothing.
pub fn spawn_missing(
    grid: &Grid,
    reserved: &[Coord],
    rng: &mut impl Rng,
) -> Vec<FallAnimation> {
    (0..GRID_SIZE)
        .filter_map(|col| {
            (0..GRID_SIZE)
                .map(|row| Coord::new(row, col))
                .find(|c| grid.is_empty_at(*c) && !reserved.contains(c))
        })
        .map(|dest| FallAnimation::new(ABOVE_BOARD, dest, random_value(&SPAWN_RANKS, rng)))
        .collect()
}

/// Repeat [`spawn_missing`] until every free cell has an incoming tile.
pub fn refill(grid: &Grid, reserved: &[Coord], rng: &mut impl Rng) -> Vec<FallAnimation> {
    let mut taken = reserved.to_vec();
    let mut spawns = Vec::new();
    loop {
        let batch = spawn_missing(grid, &taken, rng);
        if batch.is_empty() {
            break;
        }
        taken.extend(batch.iter().map(|a| a.dest));
        spawns.extend(batch);
    }
    if !spawns.is_empty() {
        debug!(count = spawns.len(), "animated refill");
    }
    spawns
}

/// Fill every free, unreserved cell in place, without animation. Returns the cells written.
pub fn sweep(grid: &mut Grid, reserved: &[Coord], rng: &mut impl Rng) -> Vec<Coord> {
    let targets: Vec<Coord> = grid
        .empty_cells()
        .filter(|c| !reserved.contains(c))
        .collect();
    for &c in &targets {
        grid.set(c, random_value(&SPAWN_RANKS, rng));
    }
    if !targets.is_empty() {
        debug!(count = targets.len(), "instant sweep fill");
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn full_grid() -> Grid {
        Grid::from_rows([[2; GRID_SIZE]; GRID_SIZE])
    }

    fn is_spawn_value(v: Tile) -> bool {
        [2, 4, 8, 16, 32, 64].contains(&v)
    }

    #[test]
    fn full_board_spawns_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(spawn_missing(&full_grid(), &[], &mut rng).is_empty());
    }

    #[test]
    fn one_per_column_per_call() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut g = full_grid();
        g.set(Coord::new(0, 3), 0);
        g.set(Coord::new(1, 3), 0);
        g.set(Coord::new(0, 0), 0);

        let first = spawn_missing(&g, &[], &mut rng);
        assert_eq!(first.len(), 2);
        let dests: Vec<Coord> = first.iter().map(|a| a.dest).collect();
        assert!(dests.contains(&Coord::new(0, 0)));
        assert!(dests.contains(&Coord::new(0, 3)));
        assert!(first.iter().all(|a| a.start_row == ABOVE_BOARD));

        let second = spawn_missing(&g, &dests, &mut rng);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].dest, Coord::new(1, 3));
    }

    #[test]
    fn two_empty_top_slots_get_two_spawns() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut g = full_grid();
        g.set(Coord::new(0, 2), 0);
        g.set(Coord::new(1, 2), 0);
        let spawns = refill(&g, &[], &mut rng);
        assert_eq!(spawns.len(), 2);
        assert!(spawns.iter().all(|a| a.start_row == -1 && a.dest.col == 2));
        assert!(spawns.iter().all(|a| is_spawn_value(a.value)));
    }

    #[test]
    fn reserved_cells_are_skipped() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut g = full_grid();
        g.set(Coord::new(0, 1), 0);
        g.set(Coord::new(1, 1), 0);
        let spawns = refill(&g, &[Coord::new(1, 1)], &mut rng);
        assert_eq!(spawns.len(), 1);
        assert_eq!(spawns[0].dest, Coord::new(0, 1));
    }

    #[test]
    fn sweep_fills_in_place() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut g = full_grid();
        g.set(Coord::new(2, 2), 0);
        g.set(Coord::new(3, 3), 0);
        let written = sweep(&mut g, &[Coord::new(3, 3)], &mut rng);
        assert_eq!(written, vec![Coord::new(2, 2)]);
        assert!(is_spawn_value(g.get(Coord::new(2, 2)).unwrap()));
        assert_eq!(g.get(Coord::new(3, 3)), Some(0));
    }

    #[test]
    fn values_cover_the_pool() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut seen = [false; 7];
        for _ in 0..500 {
            let v = random_value(&SPAWN_RANKS, &mut rng);
            assert!(is_spawn_value(v));
            seen[v.trailing_zeros() as usize] = true;
        }
        assert!(seen[1..].iter().all(|&s| s));
    }
}
