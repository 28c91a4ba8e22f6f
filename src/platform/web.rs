//! Browser feedback: Web Audio oscillators and `navigator.vibrate`
//!
//! Procedurally generated sound effects, no audio files needed.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use super::{Feedback, Haptic, SoundEffect, Voice, Waveform};

/// Web Audio + vibration backend
pub struct WebFeedback {
    ctx: Option<AudioContext>,
}

impl Default for WebFeedback {
    fn default() -> Self {
        Self::new()
    }
}

impl WebFeedback {
    pub fn new() -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self { ctx }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Create an oscillator wired through a gain node to the output
    fn create_osc(
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    fn play_voice(ctx: &AudioContext, voice: &Voice, vol: f32) {
        let osc_type = match voice.waveform {
            Waveform::Sine => OscillatorType::Sine,
            Waveform::Square => OscillatorType::Square,
            Waveform::Triangle => OscillatorType::Triangle,
            Waveform::Sawtooth => OscillatorType::Sawtooth,
        };
        let Some((osc, gain)) = Self::create_osc(ctx, voice.freq, osc_type) else {
            return;
        };
        let t = ctx.current_time() + voice.delay;
        let end = t + voice.duration;

        gain.gain().set_value_at_time(vol * voice.gain, t).ok();
        gain.gain().exponential_ramp_to_value_at_time(0.01, end).ok();
        if let Some(to) = voice.sweep_to {
            osc.frequency().set_value_at_time(voice.freq, t).ok();
            osc.frequency().exponential_ramp_to_value_at_time(to, end).ok();
        }

        osc.start_with_when(t).ok();
        osc.stop_with_when(end + 0.02).ok();
    }
}

impl Feedback for WebFeedback {
    fn play(&mut self, effect: SoundEffect, volume: f32) {
        if volume <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        for voice in effect.voices() {
            Self::play_voice(ctx, &voice, volume);
        }
    }

    fn vibrate(&mut self, haptic: Haptic) {
        if let Some(window) = web_sys::window() {
            // Unsupported on desktop and iOS Safari; returns false there
            let _ = window.navigator().vibrate_with_duration(haptic.duration_ms());
        }
    }
}
