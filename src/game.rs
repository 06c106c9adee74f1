//! Game session: board, score, live selection, falling tiles and the turn cascade.

use crate::animation::{AnimationClock, FallAnimation};
use crate::config::{GameConfig, RefillPolicy};
use crate::difficulty::Difficulty;
use crate::grid::{Coord, Grid, Tile};
use crate::merge::{self, Merge};
use crate::selection::{self, Extend, Selection};
use crate::{gravity, spawn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

/// Player intent, already translated from screen space to grid coordinates.
/// `None` means the pointer is not over a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Down(Option<Coord>),
    Move(Option<Coord>),
    Up,
    /// Drop the most recent pick.
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Playing,
    /// Board settled with no two adjacent equal tiles.
    Stuck,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub merges: u32,
    pub longest_chain: usize,
    pub best_tile: Tile,
}

#[derive(Debug)]
pub struct GameState {
    grid: Grid,
    score: u64,
    selection: Selection,
    dragging: bool,
    clock: AnimationClock,
    rng: StdRng,
    difficulty: Difficulty,
    refill: RefillPolicy,
    status: Status,
    stats: SessionStats,
    last_merge: Option<Merge>,
}

impl GameState {
    /// Fresh session: the board is filled from the difficulty's pool.
    pub fn new(config: &GameConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let grid = config.difficulty.profile().fill(&mut rng);
        info!(difficulty = %config.difficulty, seed = ?config.seed, "session started");
        Self::from_parts(grid, rng, config)
    }

    /// Session over a given board (puzzles, tests).
    pub fn with_grid(grid: Grid, config: &GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::from_parts(grid, rng, config)
    }

    fn from_parts(grid: Grid, rng: StdRng, config: &GameConfig) -> Self {
        let mut state = Self {
            stats: SessionStats {
                best_tile: grid.max_tile(),
                ..SessionStats::default()
            },
            grid,
            score: 0,
            selection: Selection::new(),
            dragging: false,
            clock: AnimationClock::new(config.fall_step),
            rng,
            difficulty: config.difficulty,
            refill: config.refill,
            status: Status::Playing,
            last_merge: None,
        };
        state.check_stuck();
        state
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn animations(&self) -> &[FallAnimation] {
        self.clock.active()
    }

    /// True while a falling tile is headed for `at`; draw the animation, not the cell.
    pub fn is_reserved(&self, at: Coord) -> bool {
        self.clock.is_reserved(at)
    }

    /// No tiles in flight.
    pub fn is_settled(&self) -> bool {
        self.clock.is_idle()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Most recent successful merge, until the next one.
    pub fn last_merge(&self) -> Option<Merge> {
        self.last_merge
    }

    /// Route one input event. Returns the merge when a release resolved one.
    pub fn handle(&mut self, event: PointerEvent) -> Option<Merge> {
        match event {
            PointerEvent::Down(at) => {
                self.pointer_down(at);
                None
            }
            PointerEvent::Move(at) => {
                self.pointer_move(at);
                None
            }
            PointerEvent::Up => self.pointer_up(),
            PointerEvent::Secondary => {
                self.secondary_press();
                None
            }
        }
    }

    /// Start (or continue) a gesture. Ignored until falling tiles have landed.
    pub fn pointer_down(&mut self, at: Option<Coord>) {
        if self.status == Status::Stuck || !self.is_settled() {
            return;
        }
        self.dragging = true;
        if let Some(at) = at {
            self.selection.begin(at, &self.grid);
        }
    }

    pub fn pointer_move(&mut self, at: Option<Coord>) {
        if !self.dragging {
            return;
        }
        if let Some(at) = at {
            if self.selection.extend(at, &self.grid) == Extend::Retreated {
                debug!(%at, "selection retreated");
            }
        }
    }

    pub fn secondary_press(&mut self) {
        self.selection.pop_last();
    }

    /// Finish the gesture: merge, collapse and refill in one step, or discard the path.
    pub fn pointer_up(&mut self) -> Option<Merge> {
        if !self.dragging {
            return None;
        }
        self.dragging = false;
        let path = self.selection.take();
        self.resolve_turn(&path)
    }

    fn resolve_turn(&mut self, path: &[Coord]) -> Option<Merge> {
        if !selection::validate(&self.grid, path) {
            if path.len() > 1 {
                debug!(len = path.len(), "selection discarded");
            }
            return None;
        }
        let merged = merge::resolve(&mut self.grid, path)?;
        self.score = self.score.saturating_add(merged.score_delta);
        self.stats.merges += 1;
        self.stats.longest_chain = self.stats.longest_chain.max(merged.chain_len);
        self.stats.best_tile = self.stats.best_tile.max(merged.value);
        self.last_merge = Some(merged);

        self.clock.extend(gravity::collapse(&mut self.grid));
        let reserved: Vec<Coord> = self.clock.reserved().collect();
        match self.refill {
            RefillPolicy::Animated => {
                let spawns = spawn::refill(&self.grid, &reserved, &mut self.rng);
                self.clock.extend(spawns);
            }
            RefillPolicy::Sweep => {
                let spawns = spawn::spawn_missing(&self.grid, &reserved, &mut self.rng);
                self.clock.extend(spawns);
                let reserved: Vec<Coord> = self.clock.reserved().collect();
                spawn::sweep(&mut self.grid, &reserved, &mut self.rng);
            }
        }
        debug!(
            score = self.score,
            falling = self.clock.active().len(),
            "turn resolved"
        );
        Some(merged)
    }

    /// Advance falling tiles by one frame. Returns how many landed this tick.
    pub fn tick(&mut self) -> usize {
        let landed = self.clock.tick(&mut self.grid);
        if landed > 0 && self.clock.is_idle() {
            self.check_stuck();
        }
        landed
    }

    fn check_stuck(&mut self) {
        if self.status == Status::Playing && self.grid.is_full() && !self.grid.has_legal_move() {
            info!(score = self.score, "no legal moves left");
            self.status = Status::Stuck;
            self.selection.clear();
            self.dragging = false;
        }
    }
}
