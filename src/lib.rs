//! Chroma Drop - A falling-block color matching arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, kinematics, collisions, game state)
//! - `tuning`: Data-driven level balance
//! - `renderer`: WebGPU rendering pipeline
//! - `platform`: Audio/haptic feedback seam
//! - `persistence`: Key-value storage for settings and high scores

pub mod error;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{Error, Result};
pub use highscores::HighScores;
pub use settings::{QualityPreset, Settings};
pub use tuning::{LevelTuning, Tuning};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, matches the display refresh on phones)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Playfield dimensions (portrait, origin top-left, +y down)
    pub const WORLD_WIDTH: f32 = 360.0;
    pub const WORLD_HEIGHT: f32 = 640.0;

    /// Player disc
    pub const PLAYER_RADIUS: f32 = 28.0;
    pub const PLAYER_Y: f32 = WORLD_HEIGHT - 110.0;

    /// Falling block side length
    pub const BLOCK_SIZE: f32 = 52.0;

    /// Particle physics
    pub const PARTICLE_GRAVITY: f32 = 420.0;
    pub const PARTICLE_DRAG: f32 = 0.98;
    /// Life lost per second (life starts at 1.0)
    pub const PARTICLE_DECAY: f32 = 1.4;
}

/// Clamp a player x coordinate so the disc stays fully on screen
#[inline]
pub fn clamp_player_x(x: f32) -> f32 {
    use consts::{PLAYER_RADIUS, WORLD_WIDTH};
    x.clamp(PLAYER_RADIUS, WORLD_WIDTH - PLAYER_RADIUS)
}

/// Deterministic hash spread used for visual-only randomness (particles)
#[inline]
pub fn hash_u32(seed: u32, i: u32) -> u32 {
    seed.wrapping_mul(2654435761).wrapping_add(i.wrapping_mul(7919))
}

/// Map a hash to [0, 1)
#[inline]
pub fn hash_unit(hash: u32) -> f32 {
    (hash % 1000) as f32 / 1000.0
}
