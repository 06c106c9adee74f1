//! Frame-locked fall animations and the clock that commits them into the grid.

use crate::grid::{Coord, Grid, Tile};
use tracing::trace;

/// Default progress added per tick (20 ticks per fall).
pub const DEFAULT_FALL_STEP: f32 = 0.05;

/// Start row for tiles entering from above the board.
pub const ABOVE_BOARD: i32 = -1;

/// One tile in flight from `start_row` down to `dest`, in the same column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallAnimation {
    /// May be [`ABOVE_BOARD`] for spawned tiles.
    pub start_row: i32,
    pub dest: Coord,
    pub value: Tile,
    /// In [0, 1) while active.
    pub progress: f32,
}

impl FallAnimation {
    pub fn new(start_row: i32, dest: Coord, value: Tile) -> Self {
        Self {
            start_row,
            dest,
            value,
            progress: 0.0,
        }
    }

    /// Start coordinate as (row, col); row may be negative.
    pub fn start(&self) -> (i32, i32) {
        (self.start_row, self.dest.col as i32)
    }

    /// Interpolated (row, col) for drawing: `start + (end - start) * progress`.
    pub fn position(&self) -> (f32, f32) {
        let start = self.start_row as f32;
        let end = self.dest.row as f32;
        (start + (end - start) * self.progress, self.dest.col as f32)
    }
}

/// Active set of fall animations, advanced by a fixed step per tick.
#[derive(Debug, Clone)]
pub struct AnimationClock {
    step: f32,
    active: Vec<FallAnimation>,
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new(DEFAULT_FALL_STEP)
    }
}

impl AnimationClock {
    pub fn new(step: f32) -> Self {
        Self {
            step,
            active: Vec::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    pub fn active(&self) -> &[FallAnimation] {
        &self.active
    }

    /// True while an animation is headed for `at`; the grid cell must not be drawn.
    pub fn is_reserved(&self, at: Coord) -> bool {
        self.active.iter().any(|a| a.dest == at)
    }

    /// Destination cells of every active animation.
    pub fn reserved(&self) -> impl Iterator<Item = Coord> + '_ {
        self.active.iter().map(|a| a.dest)
    }

    pub fn push(&mut self, anim: FallAnimation) {
        debug_assert!(
            !self.is_reserved(anim.dest),
            "two animations targeting {}",
            anim.dest
        );
        self.active.push(anim);
    }

    pub fn extend(&mut self, anims: impl IntoIterator<Item = FallAnimation>) {
        for anim in anims {
            self.push(anim);
        }
    }

    /// Advance every animation by one step. Finished ones are written into `grid` and
    /// dropped on this same tick. Returns how many were committed.
    pub fn tick(&mut self, grid: &mut Grid) -> usize {
        let step = self.step;
        let before = self.active.len();
        self.active.retain_mut(|anim| {
            anim.progress += step;
            if anim.progress >= 1.0 {
                anim.progress = 1.0;
                grid.set(anim.dest, anim.value);
                trace!(dest = %anim.dest, value = anim.value, "fall committed");
                false
            } else {
                true
            }
        });
        before - self.active.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commits_on_the_tick_progress_reaches_one() {
        let mut grid = Grid::new();
        let mut clock = AnimationClock::new(0.25);
        let dest = Coord::new(3, 1);
        clock.push(FallAnimation::new(1, dest, 8));

        for _ in 0..3 {
            assert_eq!(clock.tick(&mut grid), 0);
            assert_eq!(grid.get(dest), Some(0));
            assert!(clock.is_reserved(dest));
        }
        assert_eq!(clock.tick(&mut grid), 1);
        assert_eq!(grid.get(dest), Some(8));
        assert!(clock.is_idle());
    }

    #[test]
    fn committed_cell_is_not_written_again() {
        let mut grid = Grid::new();
        let mut clock = AnimationClock::new(0.5);
        let dest = Coord::new(0, 0);
        clock.push(FallAnimation::new(ABOVE_BOARD, dest, 4));
        clock.tick(&mut grid);
        clock.tick(&mut grid);
        grid.set(dest, 64);
        clock.tick(&mut grid);
        assert_eq!(grid.get(dest), Some(64));
    }

    #[test]
    fn step_of_one_commits_next_tick() {
        let mut grid = Grid::new();
        let mut clock = AnimationClock::new(1.0);
        clock.push(FallAnimation::new(ABOVE_BOARD, Coord::new(0, 2), 2));
        clock.push(FallAnimation::new(0, Coord::new(4, 2), 16));
        assert_eq!(clock.tick(&mut grid), 2);
        assert_eq!(grid.column(2), [2, 0, 0, 0, 16]);
    }

    #[test]
    fn position_interpolates() {
        let mut anim = FallAnimation::new(ABOVE_BOARD, Coord::new(3, 4), 2);
        assert_eq!(anim.start(), (-1, 4));
        anim.progress = 0.5;
        let (row, col) = anim.position();
        assert!((row - 1.0).abs() < f32::EPSILON);
        assert!((col - 4.0).abs() < f32::EPSILON);
    }
}
