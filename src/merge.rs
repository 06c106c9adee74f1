//! Merge resolution: a uniform path collapses onto its last cell.

use crate::grid::{Coord, EMPTY, Grid, Tile};
use tracing::debug;

/// Multiplier by path length; index 5 covers every longer chain.
const MULTIPLIERS: [u64; 6] = [1, 1, 2, 4, 4, 8];

/// Reward multiplier for a chain of `len` tiles: 2 → ×2, 3–4 → ×4, 5+ → ×8.
pub fn multiplier(len: usize) -> u64 {
    MULTIPLIERS[len.min(MULTIPLIERS.len() - 1)]
}

/// Result of a successful merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Merge {
    /// Cell holding the merged tile (last cell of the path).
    pub target: Coord,
    pub value: Tile,
    pub score_delta: u64,
    pub chain_len: usize,
}

/// Collapse `path` onto its last coordinate.
///
/// Returns `None` without touching the grid when the path is shorter than two, leaves
/// the board, holds mixed or empty values, or the merged value would overflow.
pub fn resolve(grid: &mut Grid, path: &[Coord]) -> Option<Merge> {
    let (&target, donors) = path.split_last()?;
    if donors.is_empty() {
        return None;
    }
    let value = grid.get(path[0])?;
    if value == EMPTY || !path.iter().all(|&c| grid.get(c) == Some(value)) {
        return None;
    }
    let merged = value.checked_mul(multiplier(path.len()))?;

    for &c in donors {
        grid.set(c, EMPTY);
    }
    grid.set(target, merged);
    debug!(len = path.len(), value, merged, %target, "merged chain");

    Some(Merge {
        target,
        value: merged,
        score_delta: merged,
        chain_len: path.len(),
    })
}
