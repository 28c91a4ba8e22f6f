//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use super::collision::{Contact, is_below_screen, resolve_contact, wall_bounce};
use super::particles;
use super::spawn::spawn_block;
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;
use crate::tuning::{LevelTuning, Tuning};

/// Delay before the first block of a level appears (seconds)
const LEVEL_START_DELAY: f32 = 0.5;
/// Autopilot horizontal speed (units per second)
const AUTOPILOT_SPEED: f32 = 900.0;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Target player x (from drag position), in world units
    pub drag_x: Option<f32>,
    /// Cycle the player's color (tap)
    pub cycle_color: bool,
    /// Leave the Ready screen
    pub start: bool,
    /// Pause toggle
    pub pause: bool,
    /// Continue past the level-complete screen
    pub advance: bool,
    /// Start a fresh run
    pub restart: bool,
    /// Idle/demo mode - AI plays the game
    pub autopilot: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, tuning: &Tuning, input: &TickInput, dt: f32) {
    if input.restart {
        state.restart();
        log::info!("Run restarted with seed {}", state.seed);
        return;
    }

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                state.events.push(GameEvent::Paused);
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                state.events.push(GameEvent::Resumed);
            }
            _ => {}
        }
    }

    // Paused freezes everything, particles included
    if state.phase == GamePhase::Paused {
        return;
    }

    let mut input = input.clone();
    if input.autopilot {
        autopilot(state, &mut input, dt);
    }
    let input = &input;

    state.time_ticks += 1;

    match state.phase {
        GamePhase::Ready => {
            apply_player_input(state, input);
            if input.start {
                state.phase = GamePhase::Playing;
                state.spawn_timer = 0.0;
                state.events.push(GameEvent::Started);
                state.events.push(GameEvent::LevelStarted { level: state.level });
                log::info!("Run started (seed {})", state.seed);
            }
        }

        GamePhase::Playing => {
            apply_player_input(state, input);
            let level = tuning.level(state.level);
            update_playing(state, &level, tuning.burst_particles, dt);
        }

        GamePhase::LevelComplete => {
            if input.advance {
                state.level += 1;
                state.level_score = 0;
                state.spawn_timer = LEVEL_START_DELAY;
                state.phase = GamePhase::Playing;
                state.events.push(GameEvent::LevelStarted { level: state.level });
                log::info!("Level {} started", state.level);
            }
        }

        GamePhase::GameOver | GamePhase::Paused => {}
    }

    // Keep bursts animating on the overlays too
    particles::update(&mut state.particles, dt);
}

/// Drag and color cycling
fn apply_player_input(state: &mut GameState, input: &TickInput) {
    if let Some(x) = input.drag_x {
        state.player.drag_to(x);
    }
    if input.cycle_color {
        let color = state.player.cycle_color();
        state.events.push(GameEvent::ColorChanged { color });
    }
}

/// One Playing step: spawn, move, collide, progress
fn update_playing(state: &mut GameState, level: &LevelTuning, burst_count: u32, dt: f32) {
    // --- SPAWN ---
    state.spawn_timer -= dt;
    if state.spawn_timer <= 0.0 {
        spawn_block(state, level);
        state.spawn_timer = (state.spawn_timer + level.spawn_interval).max(0.0);
    }

    // --- KINEMATICS ---
    for block in &mut state.blocks {
        block.integrate(dt);
        if block.vel.x != 0.0 {
            wall_bounce(block, WORLD_WIDTH);
        }
    }

    // --- COLLISIONS (stable id order) ---
    state.normalize_order();
    let mut matched = Vec::new();
    let mut mismatch = None;
    for block in &state.blocks {
        match resolve_contact(&state.player, block) {
            Some(Contact::Match) => matched.push(block.id),
            Some(Contact::Mismatch) => {
                mismatch = Some(block.color);
                break;
            }
            None => {}
        }
    }

    for id in matched {
        let Some(idx) = state.blocks.iter().position(|b| b.id == id) else {
            continue;
        };
        let block = state.blocks.remove(idx);
        state.score += 1;
        state.level_score += 1;

        let seed = (state.time_ticks as u32).wrapping_add(block.id);
        particles::burst(&mut state.particles, seed, block.pos, block.color, burst_count);

        state.events.push(GameEvent::Scored {
            score: state.score,
            color: block.color,
            pos: block.pos,
        });
    }

    if let Some(block_color) = mismatch {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::Mismatch {
            player: state.player.color,
            block: block_color,
        });
        state.events.push(GameEvent::GameOver {
            score: state.score,
            level: state.level,
        });
        log::info!(
            "Game over: {} hit {} (score {}, level {})",
            state.player.color.as_str(),
            block_color.as_str(),
            state.score,
            state.level
        );
        return;
    }

    // Missed blocks just leave the screen
    state.blocks.retain(|b| !is_below_screen(b));

    // --- PROGRESSION ---
    if state.level_score >= level.points_to_clear {
        state.phase = GamePhase::LevelComplete;
        state.blocks.clear();
        state.events.push(GameEvent::LevelComplete { level: state.level });
        log::info!("Level {} complete (score {})", state.level, state.score);
    }
}

/// Demo AI: chase the lowest block still above the disc and match its color
fn autopilot(state: &GameState, input: &mut TickInput, dt: f32) {
    match state.phase {
        GamePhase::Ready => input.start = true,
        GamePhase::LevelComplete => input.advance = true,
        _ => {}
    }

    let player_bottom = PLAYER_Y + state.player.radius;
    let target = state
        .blocks
        .iter()
        .filter(|b| b.aabb().min.y < player_bottom)
        .max_by(|a, b| {
            a.pos
                .y
                .partial_cmp(&b.pos.y)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    if let Some(block) = target {
        let max_step = AUTOPILOT_SPEED * dt;
        let step = (block.pos.x - state.player.x).clamp(-max_step, max_step);
        input.drag_x = Some(state.player.x + step);
        input.cycle_color = state.player.color != block.color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::color::BlockColor;
    use crate::sim::state::Block;
    use glam::Vec2;

    fn started(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        let input = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut state, &Tuning::default(), &input, SIM_DT);
        state.drain_events();
        state
    }

    /// Place a block just above the player, about to touch
    fn block_above_player(state: &mut GameState, color: BlockColor) -> u32 {
        let id = state.next_entity_id();
        let y = PLAYER_Y - PLAYER_RADIUS - BLOCK_SIZE / 2.0 - 1.0;
        state
            .blocks
            .push(Block::new(id, Vec2::new(state.player.x, y), Vec2::new(0.0, 160.0), color));
        id
    }

    #[test]
    fn test_tick_ready_to_playing() {
        let mut state = GameState::new(12345);
        let tuning = Tuning::default();
        tick(&mut state, &tuning, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Ready);
        assert!(state.blocks.is_empty());

        let input = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut state, &tuning, &input, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.events.contains(&GameEvent::Started));

        // First block spawns on the next Playing tick
        tick(&mut state, &tuning, &TickInput::default(), SIM_DT);
        assert_eq!(state.blocks.len(), 1);
    }

    #[test]
    fn test_tick_pause() {
        let mut state = started(12345);
        let tuning = Tuning::default();
        tick(&mut state, &tuning, &TickInput::default(), SIM_DT);
        let ticks = state.time_ticks;
        let block_y = state.blocks[0].pos.y;

        let input = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &tuning, &input, SIM_DT);
        assert_eq!(state.phase, GamePhase::Paused);

        // Nothing moves while paused
        for _ in 0..10 {
            tick(&mut state, &tuning, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.time_ticks, ticks);
        assert_eq!(state.blocks[0].pos.y, block_y);

        // Unpause
        tick(&mut state, &tuning, &input, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.blocks[0].pos.y > block_y);
    }

    #[test]
    fn test_match_scores_and_bursts() {
        let mut state = started(1);
        state.spawn_timer = 100.0;
        let color = state.player.color;
        let id = block_above_player(&mut state, color);

        tick(&mut state, &Tuning::default(), &TickInput::default(), SIM_DT);

        assert_eq!(state.score, 1);
        assert_eq!(state.level_score, 1);
        assert!(state.blocks.iter().all(|b| b.id != id));
        assert!(!state.particles.is_empty());
        assert!(matches!(
            state.events.as_slice(),
            [GameEvent::Scored { score: 1, .. }]
        ));
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_mismatch_ends_run() {
        let mut state = started(2);
        state.spawn_timer = 100.0;
        let wrong = state.player.color.next();
        block_above_player(&mut state, wrong);

        tick(&mut state, &Tuning::default(), &TickInput::default(), SIM_DT);

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.score, 0);
        assert!(state.events.contains(&GameEvent::GameOver { score: 0, level: 1 }));

        // Frozen afterwards; only the frame counter moves
        let y = state.blocks[0].pos.y;
        let ticks = state.time_ticks;
        tick(&mut state, &Tuning::default(), &TickInput::default(), SIM_DT);
        assert_eq!(state.blocks[0].pos.y, y);
        assert_eq!(state.blocks.len(), 1);
        assert_eq!(state.score, 0);
        assert_eq!(state.time_ticks, ticks + 1);
    }

    #[test]
    fn test_simultaneous_contacts_resolve_in_id_order() {
        let mut state = started(9);
        state.spawn_timer = 100.0;
        let own = state.player.color;
        let colors = [own, own.next(), own];
        let ids: Vec<u32> = colors.iter().map(|_| state.next_entity_id()).collect();
        let y = PLAYER_Y - PLAYER_RADIUS - BLOCK_SIZE / 2.0 - 1.0;
        // Insert out of id order; resolution must not depend on Vec order
        for (&id, &color) in ids.iter().zip(&colors).rev() {
            state.blocks.push(Block::new(
                id,
                Vec2::new(state.player.x, y),
                Vec2::new(0.0, 160.0),
                color,
            ));
        }

        tick(&mut state, &Tuning::default(), &TickInput::default(), SIM_DT);

        // First match scores, the mismatch ends the run, the last match never counts
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.score, 1);
        let remaining: Vec<u32> = state.blocks.iter().map(|b| b.id).collect();
        assert_eq!(remaining, vec![ids[1], ids[2]]);
        assert!(matches!(
            state.events.as_slice(),
            [
                GameEvent::Scored { score: 1, .. },
                GameEvent::Mismatch { .. },
                GameEvent::GameOver { score: 1, level: 1 }
            ]
        ));
    }

    #[test]
    fn test_cycle_color_before_contact_saves_the_run() {
        let mut state = started(3);
        state.spawn_timer = 100.0;
        let needed = state.player.color.next();
        block_above_player(&mut state, needed);

        let input = TickInput {
            cycle_color: true,
            ..Default::default()
        };
        tick(&mut state, &Tuning::default(), &input, SIM_DT);
        assert_eq!(state.player.color, needed);
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_drag_moves_player_away_from_block() {
        let mut state = started(4);
        state.spawn_timer = 100.0;
        let wrong = state.player.color.next();
        block_above_player(&mut state, wrong);

        let input = TickInput {
            drag_x: Some(PLAYER_RADIUS),
            ..Default::default()
        };
        tick(&mut state, &Tuning::default(), &input, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.x, PLAYER_RADIUS);
    }

    #[test]
    fn test_missed_block_removed_without_penalty() {
        let mut state = started(5);
        state.spawn_timer = 100.0;
        let id = state.next_entity_id();
        state.blocks.push(Block::new(
            id,
            Vec2::new(20.0, WORLD_HEIGHT + BLOCK_SIZE / 2.0 - 1.0),
            Vec2::new(0.0, 300.0),
            BlockColor::Blue,
        ));
        state.player.drag_to(WORLD_WIDTH);
        tick(&mut state, &Tuning::default(), &TickInput::default(), SIM_DT);
        assert!(state.blocks.is_empty());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_level_complete_and_advance() {
        let tuning = Tuning::default();
        let mut state = started(6);
        state.spawn_timer = 100.0;
        state.level_score = tuning.level(1).points_to_clear - 1;
        let color = state.player.color;
        block_above_player(&mut state, color);

        tick(&mut state, &tuning, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::LevelComplete);
        assert!(state.blocks.is_empty());
        assert!(state.events.contains(&GameEvent::LevelComplete { level: 1 }));

        // Waits for the player
        tick(&mut state, &tuning, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::LevelComplete);

        let input = TickInput {
            advance: true,
            ..Default::default()
        };
        tick(&mut state, &tuning, &input, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.level, 2);
        assert_eq!(state.level_score, 0);
    }

    #[test]
    fn test_restart_from_game_over() {
        let mut state = started(7);
        state.phase = GamePhase::GameOver;
        state.score = 5;
        let input = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &Tuning::default(), &input, SIM_DT);
        assert_eq!(state.phase, GamePhase::Ready);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_drifting_blocks_stay_on_screen() {
        let tuning = Tuning::default();
        let mut state = started(8);
        state.level = 6;
        state.player.drag_to(0.0);
        for _ in 0..600 {
            tick(&mut state, &tuning, &TickInput::default(), SIM_DT);
            if state.phase != GamePhase::Playing {
                break;
            }
            for block in &state.blocks {
                let aabb = block.aabb();
                assert!(aabb.min.x >= -1e-3 && aabb.max.x <= WORLD_WIDTH + 1e-3);
            }
        }
    }

    #[test]
    fn test_autopilot_clears_first_level() {
        let tuning = Tuning::default();
        let mut state = GameState::new(2024);
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..3600 {
            tick(&mut state, &tuning, &input, SIM_DT);
            if state.phase == GamePhase::LevelComplete {
                break;
            }
        }
        assert!(state.score >= tuning.level(1).points_to_clear as u64);
    }

    #[test]
    fn test_determinism() {
        let tuning = Tuning::default();
        let mut state1 = GameState::new(99999);
        let mut state2 = GameState::new(99999);

        let inputs = [
            TickInput {
                start: true,
                ..Default::default()
            },
            TickInput {
                drag_x: Some(40.0),
                ..Default::default()
            },
            TickInput {
                cycle_color: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for _ in 0..200 {
            for input in &inputs {
                tick(&mut state1, &tuning, input, SIM_DT);
                tick(&mut state2, &tuning, input, SIM_DT);
            }
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.phase, state2.phase);
        assert_eq!(state1.blocks.len(), state2.blocks.len());
        for (a, b) in state1.blocks.iter().zip(&state2.blocks) {
            assert_eq!(a.pos, b.pos);
        }
    }
}
