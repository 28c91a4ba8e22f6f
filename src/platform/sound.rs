//! Procedural sound effect descriptions
//!
//! Each effect is a handful of oscillator voices with an exponential decay.
//! The Web Audio backend plays them; keeping them as data makes the mix
//! testable off the browser.

use crate::sim::BlockColor;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Matched a block (pitch depends on the color)
    Score(BlockColor),
    /// Player tapped to change color
    ColorSwitch,
    /// Wrong color hit the disc
    Mismatch,
    LevelComplete,
    LevelStart,
    GameOver,
    /// New leaderboard entry
    HighScore,
}

/// Oscillator waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

/// One oscillator with a gain envelope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub waveform: Waveform,
    /// Starting frequency (Hz)
    pub freq: f32,
    /// Exponential sweep target, if any
    pub sweep_to: Option<f32>,
    /// Peak gain before volume scaling
    pub gain: f32,
    /// Start offset (seconds)
    pub delay: f64,
    /// Decay length (seconds)
    pub duration: f64,
}

impl Voice {
    const fn new(waveform: Waveform, freq: f32, gain: f32, duration: f64) -> Self {
        Self {
            waveform,
            freq,
            sweep_to: None,
            gain,
            delay: 0.0,
            duration,
        }
    }

    const fn sweep(mut self, to: f32) -> Self {
        self.sweep_to = Some(to);
        self
    }

    const fn delayed(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }
}

/// Arpeggio of equal voices
fn arpeggio(waveform: Waveform, freqs: &[f32], step: f64, gain: f32, duration: f64) -> Vec<Voice> {
    freqs
        .iter()
        .enumerate()
        .map(|(i, &f)| Voice::new(waveform, f, gain, duration).delayed(i as f64 * step))
        .collect()
}

impl SoundEffect {
    /// Voices making up this effect
    pub fn voices(self) -> Vec<Voice> {
        match self {
            SoundEffect::Score(color) => {
                // Pentatonic-ish steps per color keep repeated scores musical
                let base = [523.0, 587.0, 659.0, 784.0][color.index()];
                vec![
                    Voice::new(Waveform::Triangle, base, 0.3, 0.15),
                    Voice::new(Waveform::Sine, base * 2.0, 0.15, 0.12).delayed(0.03),
                ]
            }
            SoundEffect::ColorSwitch => {
                vec![Voice::new(Waveform::Sine, 300.0, 0.2, 0.06).sweep(450.0)]
            }
            SoundEffect::Mismatch => vec![
                Voice::new(Waveform::Sawtooth, 180.0, 0.45, 0.4).sweep(40.0),
                Voice::new(Waveform::Square, 1200.0, 0.15, 0.1),
                Voice::new(Waveform::Sine, 60.0, 0.35, 0.15),
            ],
            SoundEffect::LevelComplete => {
                arpeggio(Waveform::Triangle, &[400.0, 500.0, 600.0, 800.0], 0.1, 0.3, 0.4)
            }
            SoundEffect::LevelStart => {
                vec![Voice::new(Waveform::Triangle, 200.0, 0.3, 0.2).sweep(600.0)]
            }
            SoundEffect::GameOver => {
                arpeggio(Waveform::Sine, &[400.0, 350.0, 300.0, 200.0], 0.2, 0.3, 0.3)
            }
            SoundEffect::HighScore => arpeggio(
                Waveform::Triangle,
                &[500.0, 600.0, 700.0, 800.0, 1000.0],
                0.08,
                0.25,
                0.25,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_effect_has_audible_voices() {
        let mut effects = vec![
            SoundEffect::ColorSwitch,
            SoundEffect::Mismatch,
            SoundEffect::LevelComplete,
            SoundEffect::LevelStart,
            SoundEffect::GameOver,
            SoundEffect::HighScore,
        ];
        effects.extend(BlockColor::ALL.iter().map(|&c| SoundEffect::Score(c)));
        for effect in effects {
            let voices = effect.voices();
            assert!(!voices.is_empty(), "{:?}", effect);
            for v in voices {
                assert!(v.freq > 20.0 && v.gain > 0.0 && v.gain <= 1.0 && v.duration > 0.0);
            }
        }
    }

    #[test]
    fn test_score_pitch_differs_by_color() {
        let freqs: Vec<f32> = BlockColor::ALL
            .iter()
            .map(|&c| SoundEffect::Score(c).voices()[0].freq)
            .collect();
        for i in 1..freqs.len() {
            assert!(freqs[i] > freqs[i - 1]);
        }
    }

    #[test]
    fn test_game_over_is_a_falling_arpeggio() {
        let voices = SoundEffect::GameOver.voices();
        assert_eq!(voices.len(), 4);
        for pair in voices.windows(2) {
            assert!(pair[1].freq < pair[0].freq);
            assert!(pair[1].delay > pair[0].delay);
        }
    }
}
