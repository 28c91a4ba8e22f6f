//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod aabb;
pub mod collision;
pub mod color;
pub mod particles;
pub mod spawn;
pub mod state;
pub mod tick;

pub use aabb::Aabb;
pub use collision::{Contact, player_block_contact, resolve_contact, wall_bounce};
pub use color::BlockColor;
pub use spawn::spawn_block;
pub use state::{Block, GameEvent, GamePhase, GameState, MAX_PARTICLES, Particle, Player};
pub use tick::{TickInput, tick};
