//! Difficulty profiles: which values fill the board at session start.

use crate::grid::{GRID_SIZE, Grid, Tile};
use crate::spawn::random_value;
use clap::ValueEnum;
use rand::Rng;
use std::fmt;

/// Named, immutable starting configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyProfile {
    pub label: &'static str,
    /// Ranks (log2 values) the initial board draws from.
    pub ranks: &'static [u32],
}

impl DifficultyProfile {
    pub fn values(&self) -> impl Iterator<Item = Tile> + '_ {
        self.ranks.iter().map(|&r| crate::grid::value_of_rank(r))
    }

    /// Every cell drawn uniformly from the pool. No check for ready-made merges.
    pub fn fill(&self, rng: &mut impl Rng) -> Grid {
        let mut rows = [[0; GRID_SIZE]; GRID_SIZE];
        for cell in rows.iter_mut().flatten() {
            *cell = random_value(self.ranks, rng);
        }
        Grid::from_rows(rows)
    }
}

const EASY: DifficultyProfile = DifficultyProfile {
    label: "Easy",
    ranks: &[1, 2, 3],
};

const MEDIUM: DifficultyProfile = DifficultyProfile {
    label: "Medium",
    ranks: &[1, 2, 3, 4, 5, 6],
};

const HARD: DifficultyProfile = DifficultyProfile {
    label: "Hard",
    ranks: &[3, 4, 5, 6, 7, 8],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub const fn profile(self) -> DifficultyProfile {
        match self {
            Self::Easy => EASY,
            Self::Medium => MEDIUM,
            Self::Hard => HARD,
        }
    }

    pub const fn next(self) -> Self {
        match self {
            Self::Easy => Self::Medium,
            Self::Medium => Self::Hard,
            Self::Hard => Self::Easy,
        }
    }

    pub const fn prev(self) -> Self {
        match self {
            Self::Easy => Self::Hard,
            Self::Medium => Self::Easy,
            Self::Hard => Self::Medium,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile().label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn pools_match_labels() {
        let easy: Vec<Tile> = Difficulty::Easy.profile().values().collect();
        assert_eq!(easy, vec![2, 4, 8]);
        let hard: Vec<Tile> = Difficulty::Hard.profile().values().collect();
        assert_eq!(hard, vec![8, 16, 32, 64, 128, 256]);
        assert_eq!(Difficulty::Medium.to_string(), "Medium");
    }

    #[test]
    fn fill_uses_only_the_pool() {
        let mut rng = StdRng::seed_from_u64(9);
        for d in Difficulty::ALL {
            let profile = d.profile();
            let pool: Vec<Tile> = profile.values().collect();
            let grid = profile.fill(&mut rng);
            assert!(grid.is_full());
            assert!(grid.rows().iter().flatten().all(|v| pool.contains(v)));
        }
    }

    #[test]
    fn cycling() {
        assert_eq!(Difficulty::Hard.next(), Difficulty::Easy);
        assert_eq!(Difficulty::Easy.prev(), Difficulty::Hard);
    }
}
