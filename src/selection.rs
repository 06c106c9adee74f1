//! Drag path: live extension rule and release-time validation.

use crate::grid::{Coord, EMPTY, Grid};

/// What a pointer-over-cell did to the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extend {
    Appended,
    /// Cell was the second-to-last member: the last member was dropped.
    Retreated,
    Ignored,
}

/// Ordered, distinct coordinates chosen by one drag gesture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    path: Vec<Coord>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self) -> &[Coord] {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn contains(&self, at: Coord) -> bool {
        self.path.contains(&at)
    }

    /// Value of the first selected tile (what every later pick must match).
    pub fn anchor_value(&self, grid: &Grid) -> Option<u64> {
        self.path.first().and_then(|&c| grid.get(c))
    }

    /// Start of a gesture. Appends the cell if it is on the board and not already picked.
    pub fn begin(&mut self, at: Coord, grid: &Grid) -> Extend {
        if grid.get(at).is_none() || self.contains(at) {
            return Extend::Ignored;
        }
        if let Some(anchor) = self.anchor_value(grid) {
            if grid.get(at) != Some(anchor) {
                return Extend::Ignored;
            }
        }
        self.path.push(at);
        Extend::Appended
    }

    /// Pointer is over `at` during a live drag.
    ///
    /// A cell with a different value than the first pick is ignored. Going back onto the
    /// second-to-last cell retreats one step; any other cell already on the path is ignored.
    /// Adjacency is not checked here: a path that skipped cells fails [`validate`] on release.
    pub fn extend(&mut self, at: Coord, grid: &Grid) -> Extend {
        let Some(value) = grid.get(at) else {
            return Extend::Ignored;
        };
        if let Some(anchor) = self.anchor_value(grid) {
            if value != anchor {
                return Extend::Ignored;
            }
        }
        let n = self.path.len();
        if n > 1 && self.path[n - 2] == at {
            self.path.pop();
            Extend::Retreated
        } else if self.contains(at) {
            Extend::Ignored
        } else {
            self.path.push(at);
            Extend::Appended
        }
    }

    /// Undo the last pick (secondary button, backspace).
    pub fn pop_last(&mut self) -> Option<Coord> {
        self.path.pop()
    }

    /// Hand the path over on release, leaving the selection empty.
    pub fn take(&mut self) -> Vec<Coord> {
        std::mem::take(&mut self.path)
    }

    pub fn clear(&mut self) {
        self.path.clear();
    }
}

/// True if `path` is a legal merge: at least two distinct on-board cells, each 8-adjacent
/// to the previous one, all holding the first cell's non-zero value.
pub fn validate(grid: &Grid, path: &[Coord]) -> bool {
    if path.len() < 2 {
        return false;
    }
    let Some(first) = grid.get(path[0]) else {
        return false;
    };
    if first == EMPTY {
        return false;
    }
    if !path.windows(2).all(|w| w[0].is_adjacent(w[1])) {
        return false;
    }
    if !path.iter().all(|&c| grid.get(c) == Some(first)) {
        return false;
    }
    path.iter()
        .enumerate()
        .all(|(i, c)| !path[..i].contains(c))
}
