//! Platform feedback layer
//!
//! Turns simulation events into sound and vibration. The host (browser or a
//! test double) implements `Feedback`; `dispatch` decides what to trigger.

pub mod sound;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use sound::{SoundEffect, Voice, Waveform};

use crate::settings::Settings;
use crate::sim::GameEvent;

/// Vibration strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Haptic {
    Light,
    Medium,
    Heavy,
}

impl Haptic {
    /// Vibration length in milliseconds
    pub fn duration_ms(self) -> u32 {
        match self {
            Haptic::Light => 10,
            Haptic::Medium => 25,
            Haptic::Heavy => 80,
        }
    }

    /// One step weaker (Light stays Light)
    pub fn softened(self) -> Self {
        match self {
            Haptic::Heavy => Haptic::Medium,
            _ => Haptic::Light,
        }
    }
}

/// Host audio/haptics
pub trait Feedback {
    /// Play an effect at `volume` (0-1)
    fn play(&mut self, effect: SoundEffect, volume: f32);
    fn vibrate(&mut self, haptic: Haptic);
}

/// Feedback sink that does nothing (headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFeedback;

impl Feedback for NullFeedback {
    fn play(&mut self, _effect: SoundEffect, _volume: f32) {}
    fn vibrate(&mut self, _haptic: Haptic) {}
}

/// Sound and haptic for an event, if any
pub fn feedback_for(event: &GameEvent) -> (Option<SoundEffect>, Option<Haptic>) {
    match *event {
        GameEvent::ColorChanged { .. } => (Some(SoundEffect::ColorSwitch), Some(Haptic::Light)),
        GameEvent::Scored { color, .. } => (Some(SoundEffect::Score(color)), Some(Haptic::Light)),
        GameEvent::Mismatch { .. } => (Some(SoundEffect::Mismatch), Some(Haptic::Heavy)),
        GameEvent::LevelComplete { .. } => (Some(SoundEffect::LevelComplete), Some(Haptic::Medium)),
        GameEvent::LevelStarted { .. } => (Some(SoundEffect::LevelStart), None),
        GameEvent::GameOver { .. } => (Some(SoundEffect::GameOver), None),
        GameEvent::Started | GameEvent::Paused | GameEvent::Resumed => (None, None),
    }
}

/// Trigger feedback for a batch of events, honoring the user's toggles
pub fn dispatch(events: &[GameEvent], settings: &Settings, feedback: &mut dyn Feedback) {
    let volume = settings.effective_volume();
    for event in events {
        let (effect, haptic) = feedback_for(event);
        if let Some(effect) = effect {
            if volume > 0.0 {
                feedback.play(effect, volume);
            }
        }
        if let Some(haptic) = haptic {
            if settings.haptics {
                let haptic = if settings.reduced_motion {
                    haptic.softened()
                } else {
                    haptic
                };
                feedback.vibrate(haptic);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::BlockColor;
    use glam::Vec2;

    #[derive(Default)]
    struct Recorder {
        sounds: Vec<(SoundEffect, f32)>,
        haptics: Vec<Haptic>,
    }

    impl Feedback for Recorder {
        fn play(&mut self, effect: SoundEffect, volume: f32) {
            self.sounds.push((effect, volume));
        }
        fn vibrate(&mut self, haptic: Haptic) {
            self.haptics.push(haptic);
        }
    }

    fn run_events() -> Vec<GameEvent> {
        vec![
            GameEvent::Started,
            GameEvent::Scored {
                score: 1,
                color: BlockColor::Blue,
                pos: Vec2::ZERO,
            },
            GameEvent::Mismatch {
                player: BlockColor::Red,
                block: BlockColor::Green,
            },
            GameEvent::GameOver { score: 1, level: 1 },
        ]
    }

    #[test]
    fn test_dispatch_maps_events() {
        let mut rec = Recorder::default();
        dispatch(&run_events(), &Settings::default(), &mut rec);
        let effects: Vec<SoundEffect> = rec.sounds.iter().map(|(e, _)| *e).collect();
        assert_eq!(
            effects,
            vec![
                SoundEffect::Score(BlockColor::Blue),
                SoundEffect::Mismatch,
                SoundEffect::GameOver
            ]
        );
        assert_eq!(rec.haptics, vec![Haptic::Light, Haptic::Heavy]);
    }

    #[test]
    fn test_dispatch_respects_toggles() {
        let settings = Settings {
            sound: false,
            haptics: false,
            ..Settings::default()
        };
        let mut rec = Recorder::default();
        dispatch(&run_events(), &settings, &mut rec);
        assert!(rec.sounds.is_empty());
        assert!(rec.haptics.is_empty());
    }

    #[test]
    fn test_reduced_motion_softens_haptics() {
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        let mut rec = Recorder::default();
        dispatch(&run_events(), &settings, &mut rec);
        assert_eq!(rec.haptics, vec![Haptic::Light, Haptic::Medium]);
    }

    #[test]
    fn test_volume_passed_through() {
        let settings = Settings {
            master_volume: 0.5,
            sfx_volume: 0.5,
            ..Settings::default()
        };
        let mut rec = Recorder::default();
        dispatch(&run_events(), &settings, &mut rec);
        assert!(rec.sounds.iter().all(|(_, v)| (*v - 0.25).abs() < 1e-6));
    }
}
