//! Game state and core simulation types
//!
//! Everything needed to reproduce a run lives here. Particles are visual only
//! and are skipped on serialization.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::aabb::{Aabb, rotated_extent};
use super::color::BlockColor;
use crate::consts::*;
use crate::clamp_player_x;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first tap
    Ready,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Level goal reached, waiting for the player to continue
    LevelComplete,
    /// Run ended on a color mismatch
    GameOver,
}

/// Something that happened during a tick, consumed by audio/haptics/HUD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Started,
    ColorChanged { color: BlockColor },
    Scored { score: u64, color: BlockColor, pos: Vec2 },
    Mismatch { player: BlockColor, block: BlockColor },
    LevelComplete { level: u32 },
    LevelStarted { level: u32 },
    Paused,
    Resumed,
    GameOver { score: u64, level: u32 },
}

/// The player's disc
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Horizontal center (y is fixed at `PLAYER_Y`)
    pub x: f32,
    pub color: BlockColor,
    pub radius: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            x: WORLD_WIDTH / 2.0,
            color: BlockColor::Red,
            radius: PLAYER_RADIUS,
        }
    }
}

impl Player {
    #[inline]
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, PLAYER_Y)
    }

    /// Move horizontally to follow a drag, staying on screen
    pub fn drag_to(&mut self, x: f32) {
        self.x = clamp_player_x(x);
    }

    /// Advance to the next palette color
    pub fn cycle_color(&mut self) -> BlockColor {
        self.color = self.color.next();
        self.color
    }

    /// Bounding box of the disc
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.pos(), Vec2::splat(self.radius))
    }
}

/// A falling block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: u32,
    /// Center position
    pub pos: Vec2,
    /// Units per second (y > 0 falls, x != 0 drifts)
    pub vel: Vec2,
    pub color: BlockColor,
    /// Rotation in radians
    #[serde(default)]
    pub angle: f32,
    /// Radians per second (0 = no spin)
    #[serde(default)]
    pub angular_vel: f32,
    /// Side length
    pub size: f32,
}

impl Block {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, color: BlockColor) -> Self {
        Self {
            id,
            pos,
            vel,
            color,
            angle: 0.0,
            angular_vel: 0.0,
            size: BLOCK_SIZE,
        }
    }

    /// Bounding box enclosing the block at its current rotation
    pub fn aabb(&self) -> Aabb {
        let half = rotated_extent(self.size / 2.0, self.angle);
        Aabb::from_center(self.pos, Vec2::splat(half))
    }

    /// Advance position and rotation
    pub fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        if self.angular_vel != 0.0 {
            self.angle = (self.angle + self.angular_vel * dt).rem_euclid(std::f32::consts::TAU);
        }
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: BlockColor,
    pub life: f32, // 0-1, decreases over time
    pub size: f32,
}

/// Maximum particles
pub const MAX_PARTICLES: usize = 256;

/// RNG state wrapper for serialization
///
/// Each draw batch derives a fresh generator from (seed, stream) so the
/// state stays plain data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    /// Generator for the next batch of draws
    pub fn next_rng(&mut self) -> Pcg32 {
        self.stream += 1;
        Pcg32::seed_from_u64(self.seed ^ self.stream.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng_state: RngState,
    /// Current level (1-based)
    pub level: u32,
    /// Total score for the run
    pub score: u64,
    /// Matches scored in the current level
    pub level_score: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: GamePhase,
    /// Seconds until the next spawn
    pub spawn_timer: f32,
    pub player: Player,
    /// Falling blocks (sorted by id for determinism)
    pub blocks: Vec<Block>,
    /// Visual particles (not gameplay-affecting)
    #[serde(skip)]
    pub particles: Vec<Particle>,
    /// Events produced since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng_state: RngState::new(seed),
            level: 1,
            score: 0,
            level_score: 0,
            time_ticks: 0,
            phase: GamePhase::Ready,
            spawn_timer: 0.0,
            player: Player::default(),
            blocks: Vec::new(),
            particles: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Start over from level 1, keeping the seed lineage deterministic
    pub fn restart(&mut self) {
        let seed = self.seed.wrapping_add(self.rng_state.stream).wrapping_add(1);
        *self = Self::new(seed);
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ensure blocks are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.blocks.sort_by_key(|b| b.id);
    }

    /// Blocks are falling; the frontend auto-pauses only in this phase
    pub fn is_active(&self) -> bool {
        self.phase == GamePhase::Playing
    }
}
