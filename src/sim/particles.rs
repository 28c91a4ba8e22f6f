//! Particle bursts for scoring feedback
//!
//! Visual only. Spread comes from a hash of the tick counter so bursts are
//! reproducible without consuming gameplay RNG.

use glam::Vec2;

use super::color::BlockColor;
use super::state::{MAX_PARTICLES, Particle};
use crate::consts::*;
use crate::{hash_u32, hash_unit};

/// Spawn a radial burst of `count` particles at `pos`
///
/// When the pool is full the oldest particles are evicted.
pub fn burst(particles: &mut Vec<Particle>, seed: u32, pos: Vec2, color: BlockColor, count: u32) {
    let count = (count as usize).min(MAX_PARTICLES);
    let overflow = (particles.len() + count).saturating_sub(MAX_PARTICLES);
    if overflow > 0 {
        particles.drain(..overflow);
    }

    for i in 0..count as u32 {
        let hash = hash_u32(seed, i);
        let r1 = hash_unit(hash);
        let r2 = hash_unit(hash >> 10);
        let r3 = hash_unit(hash >> 20);

        // Even angular spacing with jitter so bursts look round
        let angle = std::f32::consts::TAU * (i as f32 + r1 * 0.8) / count as f32;
        let speed = 120.0 + r2 * 180.0;
        let dir = Vec2::new(angle.cos(), angle.sin());

        particles.push(Particle {
            pos: pos + dir * 4.0,
            // Slight upward bias so gravity reads as an arc
            vel: dir * speed - Vec2::new(0.0, 60.0),
            color,
            life: 0.7 + r3 * 0.3,
            size: 3.0 + r2 * 4.0,
        });
    }
}

/// Integrate particles and drop the dead ones
pub fn update(particles: &mut Vec<Particle>, dt: f32) {
    for particle in particles.iter_mut() {
        particle.pos += particle.vel * dt;
        particle.vel.y += PARTICLE_GRAVITY * dt;
        particle.vel *= PARTICLE_DRAG;
        particle.life -= dt * PARTICLE_DECAY;
        particle.size *= 0.99;
    }
    particles.retain(|p| p.life > 0.0);
}
