use crate::BreachError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Difficulty preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Grid and objective parameters for this preset
    pub fn config(self) -> PuzzleConfig {
        match self {
            Difficulty::Easy => PuzzleConfig {
                rows: 2,
                cols: 2,
                line_count: 2,
                length: LengthSpec::Fixed(2),
            },
            Difficulty::Medium => PuzzleConfig {
                rows: 5,
                cols: 5,
                line_count: 4,
                length: LengthSpec::Range { min: 3, max: 6 },
            },
            Difficulty::Hard => PuzzleConfig {
                rows: 7,
                cols: 8,
                line_count: 6,
                length: LengthSpec::Range { min: 5, max: 7 },
            },
        }
    }

    /// All presets, easiest first
    pub fn all() -> &'static [Difficulty] {
        &[Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        };
        write!(f, "{}", name)
    }
}

/// Objective line length: fixed, or drawn once per line from an inclusive range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LengthSpec {
    Fixed(usize),
    Range { min: usize, max: usize },
}

impl LengthSpec {
    /// Draw a line length
    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> usize {
        match self {
            LengthSpec::Fixed(len) => len,
            LengthSpec::Range { min, max } => rng.gen_range(min..=max.max(min)),
        }
    }

    /// Inclusive (min, max) bounds
    pub fn bounds(self) -> (usize, usize) {
        match self {
            LengthSpec::Fixed(len) => (len, len),
            LengthSpec::Range { min, max } => (min, max),
        }
    }
}

impl fmt::Display for LengthSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LengthSpec::Fixed(len) => write!(f, "{}", len),
            LengthSpec::Range { min, max } => write!(f, "{}–{}", min, max),
        }
    }
}

/// Configuration for puzzle generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleConfig {
    pub rows: usize,
    pub cols: usize,
    /// Number of objective lines
    pub line_count: usize,
    pub length: LengthSpec,
}

impl PuzzleConfig {
    /// Check the configuration can produce a playable puzzle
    pub fn validate(&self) -> Result<(), BreachError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(BreachError::InvalidConfig("grid dimensions must be non-zero"));
        }
        if self.line_count == 0 {
            return Err(BreachError::InvalidConfig("at least one objective line is required"));
        }
        let (min, max) = self.length.bounds();
        if min == 0 || max < min {
            return Err(BreachError::InvalidConfig(
                "line length range must be non-empty and positive",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_presets() {
        let easy = Difficulty::Easy.config();
        assert_eq!((easy.rows, easy.cols, easy.line_count), (2, 2, 2));
        assert_eq!(easy.length, LengthSpec::Fixed(2));

        let medium = Difficulty::Medium.config();
        assert_eq!((medium.rows, medium.cols, medium.line_count), (5, 5, 4));
        assert_eq!(medium.length.bounds(), (3, 6));

        let hard = Difficulty::Hard.config();
        assert_eq!((hard.rows, hard.cols, hard.line_count), (7, 8, 6));
        assert_eq!(hard.length.bounds(), (5, 7));

        for difficulty in Difficulty::all() {
            assert!(difficulty.config().validate().is_ok());
        }
    }

    #[test]
    fn test_length_sampling_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let spec = LengthSpec::Range { min: 3, max: 6 };
        let mut seen = [false; 7];
        for _ in 0..500 {
            let len = spec.sample(&mut rng);
            assert!((3..=6).contains(&len));
            seen[len] = true;
        }
        assert!(seen[3] && seen[6]);
        assert_eq!(LengthSpec::Fixed(2).sample(&mut rng), 2);
    }

    #[test]
    fn test_validate_rejects_degenerate() {
        let mut config = Difficulty::Medium.config();
        config.rows = 0;
        assert!(config.validate().is_err());

        let mut config = Difficulty::Medium.config();
        config.length = LengthSpec::Range { min: 4, max: 2 };
        assert!(config.validate().is_err());

        let mut config = Difficulty::Easy.config();
        config.line_count = 0;
        assert!(config.validate().is_err());
    }
}
