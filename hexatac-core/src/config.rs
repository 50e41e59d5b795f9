//! Game geometry and difficulty profiles

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::eval::LineWeights;

/// Default hexagon radius
pub const DEFAULT_RADIUS: u32 = 3;

/// Default number of marks in a row needed to win
pub const DEFAULT_WINNING_LENGTH: u32 = 4;

// ============================================================================
// BOARD GEOMETRY
// ============================================================================

/// Board shape and win condition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub radius: u32,
    pub winning_length: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            winning_length: DEFAULT_WINNING_LENGTH,
        }
    }
}

impl GameConfig {
    pub fn new(radius: u32, winning_length: u32) -> Self {
        Self {
            radius,
            winning_length,
        }
    }

    /// Longest straight line on the hexagon (its diameter)
    pub fn max_line(&self) -> u32 {
        2 * self.radius + 1
    }

    /// Number of cells on the board
    pub fn cell_count(&self) -> usize {
        let r = self.radius as usize;
        3 * r * r + 3 * r + 1
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.radius < 1 {
            return Err(GameError::InvalidConfiguration(
                "radius must be at least 1".to_string(),
            ));
        }
        // Keeps every coordinate and line walk comfortably inside i32
        if self.radius > 1000 {
            return Err(GameError::InvalidConfiguration(format!(
                "radius {} is too large",
                self.radius
            )));
        }
        if self.winning_length < 2 {
            return Err(GameError::InvalidConfiguration(
                "winning length must be at least 2".to_string(),
            ));
        }
        if self.winning_length > self.max_line() {
            return Err(GameError::InvalidConfiguration(format!(
                "winning length {} cannot fit on a radius-{} board (longest line is {})",
                self.winning_length,
                self.radius,
                self.max_line()
            )));
        }
        Ok(())
    }
}

// ============================================================================
// DIFFICULTY
// ============================================================================

/// Search depth plus the chance of playing a random move instead
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    pub depth: u32,
    pub mistake: f64,
}

impl Difficulty {
    pub fn new(depth: u32, mistake: f64) -> Result<Self, GameError> {
        let difficulty = Self { depth, mistake };
        difficulty.validate()?;
        Ok(difficulty)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.depth < 1 {
            return Err(GameError::InvalidConfiguration(
                "search depth must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mistake) {
            return Err(GameError::InvalidConfiguration(format!(
                "mistake probability {} is outside [0, 1]",
                self.mistake
            )));
        }
        Ok(())
    }
}

/// Named difficulty tiers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Easy,
    Medium,
    Hard,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 3] = [
        DifficultyLevel::Easy,
        DifficultyLevel::Medium,
        DifficultyLevel::Hard,
    ];

    /// Built-in profile for this tier
    pub fn preset(self) -> Difficulty {
        match self {
            DifficultyLevel::Easy => Difficulty { depth: 2, mistake: 0.30 },
            DifficultyLevel::Medium => Difficulty { depth: 3, mistake: 0.15 },
            DifficultyLevel::Hard => Difficulty { depth: 4, mistake: 0.05 },
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DifficultyLevel::Easy => "easy",
            DifficultyLevel::Medium => "medium",
            DifficultyLevel::Hard => "hard",
        };
        f.write_str(name)
    }
}

impl FromStr for DifficultyLevel {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(DifficultyLevel::Easy),
            "medium" => Ok(DifficultyLevel::Medium),
            "hard" => Ok(DifficultyLevel::Hard),
            other => Err(GameError::InvalidConfiguration(format!(
                "unknown difficulty: {}",
                other
            ))),
        }
    }
}

/// Profiles for each tier, overridable from a settings file
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTable {
    pub easy: Difficulty,
    pub medium: Difficulty,
    pub hard: Difficulty,
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            easy: DifficultyLevel::Easy.preset(),
            medium: DifficultyLevel::Medium.preset(),
            hard: DifficultyLevel::Hard.preset(),
        }
    }
}

impl DifficultyTable {
    pub fn get(&self, level: DifficultyLevel) -> Difficulty {
        match level {
            DifficultyLevel::Easy => self.easy,
            DifficultyLevel::Medium => self.medium,
            DifficultyLevel::Hard => self.hard,
        }
    }
}

// ============================================================================
// SETTINGS FILE
// ============================================================================

/// Startup settings supplied by the front end
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub board: GameConfig,
    pub difficulties: DifficultyTable,
    /// Evaluator weights shared by every tier
    pub weights: LineWeights,
}

impl Settings {
    pub fn validate(&self) -> Result<(), GameError> {
        self.board.validate()?;
        for level in DifficultyLevel::ALL {
            self.difficulties.get(level).validate()?;
        }
        Ok(())
    }

    /// Parse and validate settings from JSON text
    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let settings: Settings =
            serde_json::from_str(content).context("Malformed settings JSON")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Invalid settings file: {}", path.display()))
    }
}
