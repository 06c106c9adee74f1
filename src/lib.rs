//! Mergetui core: the 5×5 merge-puzzle state machine, free of any terminal or drawing code.
//!
//! A turn is a drag across equal tiles. On release the path is validated
//! ([`selection::validate`]), collapsed onto its last cell ([`merge::resolve`]), the board
//! compacts downward ([`gravity::collapse`]) and new tiles drop in from the top
//! ([`spawn::refill`]). Moving tiles are [`animation::FallAnimation`]s that the
//! [`animation::AnimationClock`] commits into the grid when they land. [`game::GameState`]
//! ties these together behind pointer events and a per-frame [`game::GameState::tick`].

pub mod animation;
pub mod config;
pub mod difficulty;
pub mod game;
pub mod gravity;
pub mod grid;
pub mod merge;
pub mod selection;
pub mod spawn;

pub use config::{ConfigError, GameConfig, RefillPolicy};
pub use difficulty::{Difficulty, DifficultyProfile};
pub use game::{GameState, PointerEvent, Status};
pub use grid::{Coord, GRID_SIZE, Grid, Tile};
