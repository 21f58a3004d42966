//! Audio cues using the Web Audio API
//!
//! Procedurally generated 8-bit style menu sounds - no external files.
//! Every call is fire-and-forget: oscillator into a gain envelope into
//! the destination, errors dropped per call.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::scene::Cue;
use crate::settings::Settings;

/// Audio manager for the menu cues
pub struct AudioManager {
    ctx: Option<AudioContext>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // Try to create audio context (may fail outside a secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Adopt the persisted preferences
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.master_volume = settings.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
        self.muted = !settings.audio_enabled;
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a menu cue
    pub fn play(&self, cue: Cue) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require a user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match cue {
            Cue::Hover => self.play_hover(ctx, vol),
            Cue::Click => self.play_click(ctx, vol),
            Cue::MenuOpen => self.play_menu_open(ctx, vol),
            Cue::MenuBack => self.play_menu_back(ctx, vol),
        }
    }

    // === Tone primitives ===

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
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

    /// One tone: gain decays exponentially over the duration, frequency
    /// optionally ramps linearly to `pitch_end`
    fn play_tone(
        &self,
        ctx: &AudioContext,
        delay: f64,
        freq: f32,
        duration: f64,
        shape: OscillatorType,
        volume: f32,
        pitch_end: Option<f32>,
    ) {
        let Some((osc, gain)) = self.create_osc(ctx, freq, shape) else {
            return;
        };
        let t = ctx.current_time() + delay;

        gain.gain().set_value_at_time(volume, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.001, t + duration)
            .ok();

        osc.frequency().set_value_at_time(freq, t).ok();
        if let Some(end) = pitch_end {
            osc.frequency()
                .linear_ramp_to_value_at_time(end, t + duration)
                .ok();
        }

        osc.start_with_when(t).ok();
        osc.stop_with_when(t + duration).ok();
    }

    // === Cues ===

    /// Soft hover tick
    fn play_hover(&self, ctx: &AudioContext, vol: f32) {
        self.play_tone(ctx, 0.0, 660.0, 0.05, OscillatorType::Square, vol * 0.08, Some(720.0));
    }

    /// Quick descending blip with a low tap behind it
    fn play_click(&self, ctx: &AudioContext, vol: f32) {
        self.play_tone(ctx, 0.0, 880.0, 0.08, OscillatorType::Square, vol * 0.2, Some(440.0));
        self.play_tone(ctx, 0.06, 220.0, 0.06, OscillatorType::Square, vol * 0.1, None);
    }

    /// Ascending fanfare
    fn play_menu_open(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [262.0, 330.0, 392.0, 523.0].iter().enumerate() {
            let delay = i as f64 * 0.06;
            self.play_tone(ctx, delay, *freq, 0.12, OscillatorType::Square, vol * 0.15, None);
        }
    }

    /// Descending retreat
    fn play_menu_back(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [523.0, 392.0, 330.0, 262.0].iter().enumerate() {
            let delay = i as f64 * 0.05;
            self.play_tone(ctx, delay, *freq, 0.1, OscillatorType::Square, vol * 0.12, None);
        }
    }
}
