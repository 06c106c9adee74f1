//! Session options and their validation.

use crate::animation::DEFAULT_FALL_STEP;
use crate::difficulty::Difficulty;
use clap::ValueEnum;
use thiserror::Error;

/// How cells emptied by a turn get their new tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RefillPolicy {
    /// Every free cell receives a tile falling from above the board.
    #[default]
    Animated,
    /// One falling tile per column, then the remaining free cells are filled in place.
    Sweep,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("fall step must be in (0, 1], got {0}")]
    FallStep(f32),
    #[error("frame rate must be a positive number, got {0}")]
    FrameRate(f64),
}

/// Options that affect game rules and timing (not presentation).
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub difficulty: Difficulty,
    /// Progress added to each falling tile per tick.
    pub fall_step: f32,
    pub refill: RefillPolicy,
    /// Fixed RNG seed for reproducible boards; OS entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            fall_step: DEFAULT_FALL_STEP,
            refill: RefillPolicy::default(),
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(self) -> Result<Self, ConfigError> {
        if !(self.fall_step > 0.0 && self.fall_step <= 1.0) {
            return Err(ConfigError::FallStep(self.fall_step));
        }
        Ok(self)
    }
}

/// Frame rate sanity check for the front end loop.
pub fn validate_frame_rate(fps: f64) -> Result<f64, ConfigError> {
    if fps.is_finite() && fps > 0.0 {
        Ok(fps)
    } else {
        Err(ConfigError::FrameRate(fps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn fall_step_bounds() {
        let bad = |s| GameConfig {
            fall_step: s,
            ..GameConfig::default()
        };
        assert_eq!(bad(0.0).validate(), Err(ConfigError::FallStep(0.0)));
        assert!(bad(1.5).validate().is_err());
        assert!(bad(f32::NAN).validate().is_err());
        assert!(bad(1.0).validate().is_ok());
    }

    #[test]
    fn frame_rate_bounds() {
        assert!(validate_frame_rate(80.0).is_ok());
        assert!(validate_frame_rate(0.0).is_err());
        assert!(validate_frame_rate(f64::INFINITY).is_err());
    }
}
