//! Exposure and crossover values carried on each signaled bar.

use serde::{Deserialize, Serialize};

/// Desired market exposure on a bar: long when the short average is strictly
/// above the long average, flat otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Exposure {
    #[default]
    Flat,
    Long,
}

impl Exposure {
    /// 0 for flat, 1 for long.
    pub fn value(self) -> i8 {
        match self {
            Exposure::Flat => 0,
            Exposure::Long => 1,
        }
    }
}

/// Change in exposure from the previous bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Crossover {
    /// Flat → long (+1).
    Golden,
    /// Long → flat (−1).
    Death,
    /// No change (0).
    Hold,
}

impl Crossover {
    /// Diff two consecutive exposures.
    pub fn between(previous: Exposure, current: Exposure) -> Self {
        match current.value() - previous.value() {
            1 => Crossover::Golden,
            -1 => Crossover::Death,
            _ => Crossover::Hold,
        }
    }

    /// +1, −1 or 0.
    pub fn value(self) -> i8 {
        match self {
            Crossover::Golden => 1,
            Crossover::Death => -1,
            Crossover::Hold => 0,
        }
    }
}
