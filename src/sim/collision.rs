//! Collision detection between the player disc, falling blocks and the
//! playfield edges.
//!
//! Everything is axis-aligned: the disc is treated as its bounding square
//! and a rotated block as the box enclosing its current rotation.

use super::state::{Block, Player};
use crate::consts::WORLD_HEIGHT;

/// Outcome of a player/block contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Colors match: score and destroy the block
    Match,
    /// Colors differ: the run ends
    Mismatch,
}

/// Whether the player's box overlaps the block's box
#[inline]
pub fn player_block_contact(player: &Player, block: &Block) -> bool {
    player.aabb().intersects(&block.aabb())
}

/// Classify a contact, or `None` if the two don't touch
pub fn resolve_contact(player: &Player, block: &Block) -> Option<Contact> {
    if !player_block_contact(player, block) {
        return None;
    }
    if player.color == block.color {
        Some(Contact::Match)
    } else {
        Some(Contact::Mismatch)
    }
}

/// Bounce a drifting block off the side walls
///
/// Reflects horizontal velocity when the block's box crosses an edge while
/// moving outward, and pushes it back inside. Returns true on a bounce.
pub fn wall_bounce(block: &mut Block, world_width: f32) -> bool {
    let aabb = block.aabb();
    if aabb.min.x < 0.0 {
        block.pos.x -= aabb.min.x;
        if block.vel.x < 0.0 {
            block.vel.x = -block.vel.x;
            return true;
        }
    } else if aabb.max.x > world_width {
        block.pos.x -= aabb.max.x - world_width;
        if block.vel.x > 0.0 {
            block.vel.x = -block.vel.x;
            return true;
        }
    }
    false
}

/// Block has fallen completely past the bottom edge
#[inline]
pub fn is_below_screen(block: &Block) -> bool {
    block.aabb().min.y > WORLD_HEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::color::BlockColor;
    use glam::Vec2;
    use proptest::prelude::*;

    fn block_at(x: f32, y: f32, color: BlockColor) -> Block {
        Block::new(1, Vec2::new(x, y), Vec2::ZERO, color)
    }

    #[test]
    fn test_contact_match_and_mismatch() {
        let player = Player::default();
        let touching = block_at(player.x, PLAYER_Y - PLAYER_RADIUS - BLOCK_SIZE / 2.0 + 1.0, BlockColor::Red);
        assert_eq!(resolve_contact(&player, &touching), Some(Contact::Match));

        let wrong = Block { color: BlockColor::Blue, ..touching.clone() };
        assert_eq!(resolve_contact(&player, &wrong), Some(Contact::Mismatch));
    }

    #[test]
    fn test_no_contact_when_apart() {
        let player = Player::default();
        let far = block_at(player.x, 100.0, BlockColor::Red);
        assert_eq!(resolve_contact(&player, &far), None);

        let beside = block_at(player.x + PLAYER_RADIUS + BLOCK_SIZE, PLAYER_Y, BlockColor::Red);
        assert!(!player_block_contact(&player, &beside));
    }

    #[test]
    fn test_rotation_widens_contact() {
        let player = Player::default();
        // Just out of reach when axis-aligned
        let gap = PLAYER_RADIUS + BLOCK_SIZE / 2.0 + 5.0;
        let mut block = block_at(player.x + gap, PLAYER_Y, BlockColor::Red);
        assert!(!player_block_contact(&player, &block));
        block.angle = std::f32::consts::FRAC_PI_4;
        assert!(player_block_contact(&player, &block));
    }

    #[test]
    fn test_wall_bounce_left_and_right() {
        let mut block = block_at(10.0, 100.0, BlockColor::Green);
        block.vel = Vec2::new(-50.0, 100.0);
        assert!(wall_bounce(&mut block, WORLD_WIDTH));
        assert_eq!(block.vel.x, 50.0);
        assert!(block.aabb().min.x >= -1e-4);

        let mut block = block_at(WORLD_WIDTH - 5.0, 100.0, BlockColor::Green);
        block.vel = Vec2::new(50.0, 100.0);
        assert!(wall_bounce(&mut block, WORLD_WIDTH));
        assert_eq!(block.vel.x, -50.0);
        assert!(block.aabb().max.x <= WORLD_WIDTH + 1e-4);
    }

    #[test]
    fn test_no_bounce_inside() {
        let mut block = block_at(WORLD_WIDTH / 2.0, 100.0, BlockColor::Green);
        block.vel = Vec2::new(50.0, 100.0);
        assert!(!wall_bounce(&mut block, WORLD_WIDTH));
        assert_eq!(block.vel.x, 50.0);
    }

    #[test]
    fn test_below_screen() {
        let visible = block_at(100.0, WORLD_HEIGHT, BlockColor::Red);
        assert!(!is_below_screen(&visible));
        let gone = block_at(100.0, WORLD_HEIGHT + BLOCK_SIZE, BlockColor::Red);
        assert!(is_below_screen(&gone));
    }

    proptest! {
        #[test]
        fn prop_bounce_keeps_block_in_bounds(
            x in -100.0f32..460.0,
            vx in -200.0f32..200.0,
            angle in 0.0f32..std::f32::consts::TAU,
        ) {
            let mut block = block_at(x, 200.0, BlockColor::Red);
            block.vel.x = vx;
            block.angle = angle;
            wall_bounce(&mut block, WORLD_WIDTH);
            let aabb = block.aabb();
            prop_assert!(aabb.min.x >= -1e-3);
            prop_assert!(aabb.max.x <= WORLD_WIDTH + 1e-3);
        }

        #[test]
        fn prop_contact_is_symmetric_in_color(x in 0.0f32..360.0, y in 0.0f32..640.0) {
            let player = Player::default();
            let block = block_at(x, y, BlockColor::Red);
            let red = resolve_contact(&player, &block).is_some();
            let blue = resolve_contact(&player, &Block { color: BlockColor::Blue, ..block.clone() }).is_some();
            prop_assert_eq!(red, blue);
        }
    }
}
