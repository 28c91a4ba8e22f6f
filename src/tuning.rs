//! Data-driven game balance
//!
//! Every level-dependent number lives here so a JSON file can rebalance the
//! game without touching the simulation. Missing fields fall back to the
//! built-in defaults.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Resolved parameters for a single level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelTuning {
    /// Level number (1-based)
    pub level: u32,
    /// Vertical block speed (units/s)
    pub fall_speed: f32,
    /// Seconds between spawns
    pub spawn_interval: f32,
    /// Maximum block spin (rad/s), 0 = no rotation
    pub max_rotation_speed: f32,
    /// Horizontal drift speed (units/s), 0 = no drift
    pub drift_speed: f32,
    /// Matches needed to complete the level
    pub points_to_clear: u32,
    /// Cap on simultaneously falling blocks
    pub max_blocks: usize,
}

impl LevelTuning {
    pub fn rotates(&self) -> bool {
        self.max_rotation_speed > 0.0
    }

    pub fn bounces(&self) -> bool {
        self.drift_speed > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Speed ramp ===
    pub base_fall_speed: f32,
    /// Added per level above 1
    pub fall_speed_step: f32,
    pub max_fall_speed: f32,

    // === Spawning ===
    pub base_spawn_interval: f32,
    /// Subtracted per level above 1
    pub spawn_interval_step: f32,
    pub min_spawn_interval: f32,
    pub max_blocks: usize,

    // === Rotation ===
    pub rotation_start_level: u32,
    pub base_rotation_speed: f32,
    pub rotation_speed_step: f32,
    pub max_rotation_speed: f32,

    // === Horizontal bounce ===
    pub bounce_start_level: u32,
    pub base_drift_speed: f32,
    pub drift_speed_step: f32,
    pub max_drift_speed: f32,

    // === Progression ===
    pub base_points_to_clear: u32,
    pub points_step: u32,

    // === Effects ===
    pub burst_particles: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_fall_speed: 160.0,
            fall_speed_step: 22.0,
            max_fall_speed: 420.0,

            base_spawn_interval: 1.4,
            spawn_interval_step: 0.1,
            min_spawn_interval: 0.55,
            max_blocks: 6,

            rotation_start_level: 2,
            base_rotation_speed: 1.0,
            rotation_speed_step: 0.4,
            max_rotation_speed: 3.5,

            bounce_start_level: 3,
            base_drift_speed: 40.0,
            drift_speed_step: 15.0,
            max_drift_speed: 140.0,

            base_points_to_clear: 10,
            points_step: 2,

            burst_particles: 24,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.base_fall_speed <= 0.0 || self.max_fall_speed < self.base_fall_speed {
            return Err(Error::InvalidTuning(
                "fall speed must be positive and max_fall_speed >= base_fall_speed".into(),
            ));
        }
        if self.min_spawn_interval <= 0.0 || self.base_spawn_interval < self.min_spawn_interval {
            return Err(Error::InvalidTuning(
                "spawn interval must be positive and base >= min".into(),
            ));
        }
        if self.max_blocks == 0 {
            return Err(Error::InvalidTuning("max_blocks must be at least 1".into()));
        }
        if self.base_points_to_clear == 0 {
            return Err(Error::InvalidTuning(
                "base_points_to_clear must be at least 1".into(),
            ));
        }
        if self.rotation_start_level == 0 || self.bounce_start_level == 0 {
            return Err(Error::InvalidTuning("levels are 1-based".into()));
        }
        Ok(())
    }

    /// Resolve the parameters for a level (1-based; 0 is treated as 1)
    pub fn level(&self, level: u32) -> LevelTuning {
        let level = level.max(1);
        let steps = (level - 1) as f32;

        let fall_speed =
            (self.base_fall_speed + self.fall_speed_step * steps).min(self.max_fall_speed);
        let spawn_interval = (self.base_spawn_interval - self.spawn_interval_step * steps)
            .max(self.min_spawn_interval);

        let max_rotation_speed = if level >= self.rotation_start_level {
            let steps = (level - self.rotation_start_level) as f32;
            (self.base_rotation_speed + self.rotation_speed_step * steps)
                .min(self.max_rotation_speed)
        } else {
            0.0
        };

        let drift_speed = if level >= self.bounce_start_level {
            let steps = (level - self.bounce_start_level) as f32;
            (self.base_drift_speed + self.drift_speed_step * steps).min(self.max_drift_speed)
        } else {
            0.0
        };

        LevelTuning {
            level,
            fall_speed,
            spawn_interval,
            max_rotation_speed,
            drift_speed,
            points_to_clear: self
                .base_points_to_clear
                .saturating_add(self.points_step.saturating_mul(level - 1)),
            max_blocks: self.max_blocks,
        }
    }
}
