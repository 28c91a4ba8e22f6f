//! Shape generation for 2D primitives
//!
//! Everything is emitted as triangle lists in world coordinates
//! (origin top-left, +y down). The pipeline maps them to NDC.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Vertex, colors, with_alpha};
use crate::consts::{WORLD_HEIGHT, WORLD_WIDTH};
use crate::settings::Settings;
use crate::sim::{Block, GamePhase, GameState, Particle, Player};

/// Push two triangles for the quad a-b-c-d (in winding order)
fn quad(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, d: Vec2, color: [f32; 4]) {
    out.push(Vertex::new(a.x, a.y, color));
    out.push(Vertex::new(b.x, b.y, color));
    out.push(Vertex::new(c.x, c.y, color));

    out.push(Vertex::new(a.x, a.y, color));
    out.push(Vertex::new(c.x, c.y, color));
    out.push(Vertex::new(d.x, d.y, color));
}

/// Generate vertices for an axis-aligned rectangle
pub fn rect(min: Vec2, max: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(6);
    quad(
        &mut vertices,
        min,
        Vec2::new(max.x, min.y),
        max,
        Vec2::new(min.x, max.y),
        color,
    );
    vertices
}

/// Generate vertices for a square of side `size` rotated by `angle` about `center`
pub fn rotated_rect(center: Vec2, size: f32, angle: f32, color: [f32; 4]) -> Vec<Vertex> {
    let half = size * 0.5;
    let rot = Vec2::from_angle(angle);
    let corner = |x: f32, y: f32| center + rot.rotate(Vec2::new(x, y));

    let mut vertices = Vec::with_capacity(6);
    quad(
        &mut vertices,
        corner(-half, -half),
        corner(half, -half),
        corner(half, half),
        corner(-half, half),
        color,
    );
    vertices
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for a ring (hollow circle)
pub fn ring(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 6) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;
        let dir1 = Vec2::new(theta1.cos(), theta1.sin());
        let dir2 = Vec2::new(theta2.cos(), theta2.sin());

        quad(
            &mut vertices,
            center + dir1 * inner_radius,
            center + dir1 * outer_radius,
            center + dir2 * outer_radius,
            center + dir2 * inner_radius,
            color,
        );
    }

    vertices
}

fn block_shape(block: &Block) -> Vec<Vertex> {
    let mut vertices = rotated_rect(block.pos, block.size + 4.0, block.angle, colors::BLOCK_OUTLINE);
    vertices.extend(rotated_rect(block.pos, block.size, block.angle, block.color.rgba()));
    vertices
}

fn particle_shape(p: &Particle) -> Vec<Vertex> {
    let half = Vec2::splat(p.size * 0.5 * p.life.max(0.2));
    rect(p.pos - half, p.pos + half, with_alpha(p.color.rgba(), p.life))
}

fn player_shape(player: &Player, pulse: f32, segments: u32) -> Vec<Vertex> {
    let pos = player.pos();
    let mut vertices = circle(pos, player.radius, player.color.rgba(), segments);
    let outer = player.radius + 3.0 + pulse;
    vertices.extend(ring(pos, player.radius, outer, colors::PLAYER_RING, segments));
    vertices
}

/// Build the full frame for a game state
///
/// Draw order: playfield, blocks, particles, player, then a dim overlay
/// for paused / level complete / game over.
pub fn scene(state: &GameState, settings: &Settings) -> Vec<Vertex> {
    let segments = settings.quality.circle_segments();
    let mut vertices = Vec::with_capacity(512);

    vertices.extend(rect(
        Vec2::ZERO,
        Vec2::new(WORLD_WIDTH, WORLD_HEIGHT),
        colors::PLAYFIELD,
    ));
    for i in 1..4 {
        let x = WORLD_WIDTH * i as f32 / 4.0;
        vertices.extend(rect(
            Vec2::new(x - 0.5, 0.0),
            Vec2::new(x + 0.5, WORLD_HEIGHT),
            colors::LANE_LINE,
        ));
    }

    for block in &state.blocks {
        vertices.extend(block_shape(block));
    }

    // Newest particles win when the quality cap is lower than the sim cap
    let cap = settings.max_particles();
    let skip = state.particles.len().saturating_sub(cap);
    for p in state.particles.iter().skip(skip) {
        vertices.extend(particle_shape(p));
    }

    let pulse = if settings.reduced_motion || state.phase != GamePhase::Ready {
        0.0
    } else {
        2.0 * (state.time_ticks as f32 * 0.1).sin().abs()
    };
    vertices.extend(player_shape(&state.player, pulse, segments));

    if matches!(
        state.phase,
        GamePhase::Paused | GamePhase::LevelComplete | GamePhase::GameOver
    ) {
        vertices.extend(rect(
            Vec2::ZERO,
            Vec2::new(WORLD_WIDTH, WORLD_HEIGHT),
            colors::DIM_OVERLAY,
        ));
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::QualityPreset;
    use crate::sim::BlockColor;

    fn approx(a: [f32; 2], b: [f32; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-4 && (a[1] - b[1]).abs() < 1e-4
    }

    #[test]
    fn test_primitive_vertex_counts() {
        assert_eq!(rect(Vec2::ZERO, Vec2::ONE, [1.0; 4]).len(), 6);
        assert_eq!(circle(Vec2::ZERO, 1.0, [1.0; 4], 16).len(), 48);
        assert_eq!(ring(Vec2::ZERO, 1.0, 2.0, [1.0; 4], 16).len(), 96);
    }

    #[test]
    fn test_unrotated_rect_matches_axis_aligned() {
        let a = rotated_rect(Vec2::new(10.0, 20.0), 4.0, 0.0, [1.0; 4]);
        let b = rect(Vec2::new(8.0, 18.0), Vec2::new(12.0, 22.0), [1.0; 4]);
        for (va, vb) in a.iter().zip(&b) {
            assert!(approx(va.position, vb.position));
        }
    }

    #[test]
    fn test_rotated_rect_corners_on_circle() {
        let verts = rotated_rect(Vec2::ZERO, 2.0, 0.7, [1.0; 4]);
        for v in verts {
            let r = Vec2::from(v.position).length();
            assert!((r - 2f32.sqrt()).abs() < 1e-4);
        }
    }

    #[test]
    fn test_scene_grows_with_blocks() {
        let settings = Settings::default();
        let mut state = GameState::new(1);
        let empty = scene(&state, &settings).len();

        let id = state.next_entity_id();
        state.blocks.push(Block::new(
            id,
            Vec2::new(100.0, 100.0),
            Vec2::ZERO,
            BlockColor::Green,
        ));
        assert_eq!(scene(&state, &settings).len(), empty + 12);
    }

    #[test]
    fn test_particles_follow_settings() {
        let mut state = GameState::new(1);
        for _ in 0..10 {
            state.particles.push(Particle {
                pos: Vec2::new(50.0, 50.0),
                vel: Vec2::ZERO,
                color: BlockColor::Red,
                life: 1.0,
                size: 4.0,
            });
        }
        let on = Settings::from_preset(QualityPreset::High);
        let off = Settings {
            particles: false,
            ..on.clone()
        };
        assert_eq!(scene(&state, &on).len(), scene(&state, &off).len() + 60);
    }

    #[test]
    fn test_overlay_when_paused() {
        let settings = Settings::default();
        let mut state = GameState::new(1);
        state.phase = GamePhase::Playing;
        let playing = scene(&state, &settings).len();
        state.phase = GamePhase::Paused;
        assert_eq!(scene(&state, &settings).len(), playing + 6);
    }
}
