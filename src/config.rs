//! Difficulty presets and operator overrides.

use std::time::Duration;

use thiserror::Error;

use crate::entities::{Difficulty, Level};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("enemies need at least one head hit to die")]
    ZeroLethality,
    #[error("the helicopter must carry at least one missile")]
    ZeroCapacity,
    #[error("enemy spawn interval must be at least one second")]
    ZeroSpawnInterval,
}

/// (hits to kill, helicopter capacity, spawn interval in seconds)
fn preset(level: Level) -> (u32, u32, u64) {
    match level {
        Level::Easy => (1, 20, 10),
        Level::Medium => (2, 15, 7),
        Level::Hard => (3, 10, 5),
    }
}

impl Level {
    pub fn difficulty(self) -> Difficulty {
        let (lethality, heli_capacity, spawn_secs) = preset(self);
        Difficulty {
            lethality,
            heli_capacity,
            spawn_interval: Duration::from_secs(spawn_secs),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Level::Easy => "Easy",
            Level::Medium => "Medium",
            Level::Hard => "Hard",
        }
    }
}

impl Difficulty {
    pub fn custom(lethality: u32, heli_capacity: u32, spawn_secs: u64) -> Result<Self, ConfigError> {
        if lethality == 0 {
            return Err(ConfigError::ZeroLethality);
        }
        if heli_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if spawn_secs == 0 {
            return Err(ConfigError::ZeroSpawnInterval);
        }
        Ok(Difficulty {
            lethality,
            heli_capacity,
            spawn_interval: Duration::from_secs(spawn_secs),
        })
    }

    /// Replace any subset of the parameters, validating the result.
    pub fn with_overrides(
        self,
        hits: Option<u32>,
        ammo: Option<u32>,
        spawn_secs: Option<u64>,
    ) -> Result<Self, ConfigError> {
        Difficulty::custom(
            hits.unwrap_or(self.lethality),
            ammo.unwrap_or(self.heli_capacity),
            spawn_secs.unwrap_or(self.spawn_interval.as_secs()),
        )
    }
}
