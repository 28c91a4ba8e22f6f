//! Obstacle spawning

use glam::Vec2;
use rand::Rng;

use super::color::BlockColor;
use super::state::{Block, GameState};
use crate::consts::*;
use crate::tuning::LevelTuning;

/// Spawn one block above the top edge, using the level's kinematics
///
/// Returns the new block's id, or `None` when the screen is already full.
pub fn spawn_block(state: &mut GameState, level: &LevelTuning) -> Option<u32> {
    if state.blocks.len() >= level.max_blocks {
        return None;
    }

    let mut rng = state.rng_state.next_rng();
    let half = BLOCK_SIZE / 2.0;
    // Rotated blocks need the diagonal to stay inside the walls
    let margin = if level.rotates() {
        half * std::f32::consts::SQRT_2
    } else {
        half
    };

    let x = rng.random_range(margin..=WORLD_WIDTH - margin);
    let color = BlockColor::random(&mut rng);

    let drift = if level.bounces() {
        if rng.random_bool(0.5) {
            level.drift_speed
        } else {
            -level.drift_speed
        }
    } else {
        0.0
    };

    let angular_vel = if level.rotates() {
        let spin = rng.random_range(0.4..=1.0) * level.max_rotation_speed;
        if rng.random_bool(0.5) { spin } else { -spin }
    } else {
        0.0
    };

    let id = state.next_entity_id();
    let mut block = Block::new(
        id,
        Vec2::new(x, -margin),
        Vec2::new(drift, level.fall_speed),
        color,
    );
    block.angular_vel = angular_vel;
    state.blocks.push(block);

    log::debug!("Spawned block {} ({}) at x={:.1}", id, color.as_str(), x);
    Some(id)
}
