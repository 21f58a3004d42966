//! Scripted loading-screen sequence
//!
//! Two sequential phases, both scheduled against wall-clock milliseconds
//! so their durations do not depend on the display refresh:
//!
//! - Progress: a pixel-block bar fills over a randomized 3-4 s window.
//!   The underlying target follows an eased schedule; the displayed value
//!   chases it with per-tick exponential smoothing, which is what makes
//!   the bar glide instead of stutter.
//! - Hold: a full-screen overlay with a blinking title, held for another
//!   randomized 3-4 s window, then faded out.
//!
//! Two clocks on purpose: `update_clock(now_ms)` drives the phase
//! schedule, `tick()` drives smoothing, crossfades and blink. The shell
//! calls both once per frame.

use std::f32::consts::TAU;

use rand::Rng;
use rand_pcg::Pcg32;

use crate::{ease_out_pow, lerp};

pub const BAR_W: f32 = 400.0;
pub const BAR_H: f32 = 28.0;
pub const BLOCK_W: f32 = 12.0;
pub const BLOCK_GAP: f32 = 2.0;

/// Both randomized windows draw uniformly from [MIN, MIN + SPAN)
const WINDOW_MIN_MS: f64 = 3000.0;
const WINDOW_SPAN_MS: f64 = 1000.0;
/// Dwell at 100% before the crossfade starts
const SNAP_PAUSE_MS: f64 = 400.0;

/// Displayed progress chases the target by this factor per tick
const SMOOTHING: f32 = 0.06;

const BAR_FADE_IN_TICKS: u32 = 20;
const BAR_FADE_OUT_TICKS: u32 = 20;
const OVERLAY_FADE_IN_TICKS: u32 = 25;
const OVERLAY_FADE_OUT_TICKS: u32 = 30;

/// Title blink advances this much phase per tick (full cycle = 40 ticks)
const BLINK_PHASE_STEP: f32 = TAU / 40.0;

pub const LOADING_TIPS: [&str; 5] = [
    "AVOID THE ROCKS",
    "COLLECT COINS",
    "SAVE YOUR ENERGY",
    "SPEED IS KEY",
    "STAY ALIVE!",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingPhase {
    /// Bar filling toward the eased target
    Bar,
    /// Bar pinned at 100%, waiting out the snap pause
    Snap,
    /// Bar fading out while the overlay fades in
    Cross,
    /// Overlay held, title blinking
    Hold,
    /// Overlay fading out
    FadeOut,
    /// Sequence finished; owner should discard it
    Done,
}

/// One filled block of the segmented progress bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarBlock {
    pub x: f32,
    pub w: f32,
    /// Alternating shade flag for the two-tone segmented look
    pub bright: bool,
}

#[derive(Debug, Clone)]
pub struct LoadingSequence {
    phase: LoadingPhase,
    /// Wall-clock anchor of the current wall-clock-driven phase
    phase_started_ms: f64,
    bar_total_ms: f64,
    hold_total_ms: f64,
    /// Eased schedule target in [0, 1]
    target: f32,
    /// Displayed (smoothed) progress in [0, 1]
    progress: f32,
    bar_alpha: f32,
    overlay_alpha: f32,
    blink_phase: f32,
    fade_ticks: u32,
    tip_index: usize,
}

impl LoadingSequence {
    pub fn new(now_ms: f64, rng: &mut Pcg32) -> Self {
        Self {
            phase: LoadingPhase::Bar,
            phase_started_ms: now_ms,
            bar_total_ms: WINDOW_MIN_MS + rng.random::<f64>() * WINDOW_SPAN_MS,
            hold_total_ms: WINDOW_MIN_MS + rng.random::<f64>() * WINDOW_SPAN_MS,
            target: 0.0,
            progress: 0.0,
            bar_alpha: 0.0,
            overlay_alpha: 0.0,
            blink_phase: 0.0,
            fade_ticks: 0,
            tip_index: rng.random_range(0..LOADING_TIPS.len()),
        }
    }

    /// Advance the wall-clock schedule
    pub fn update_clock(&mut self, now_ms: f64) {
        let elapsed = now_ms - self.phase_started_ms;
        match self.phase {
            LoadingPhase::Bar => {
                let raw = (elapsed / self.bar_total_ms).min(1.0) as f32;
                self.target = eased_target(raw);
                if raw >= 1.0 {
                    self.target = 1.0;
                    self.phase = LoadingPhase::Snap;
                    self.phase_started_ms = now_ms;
                }
            }
            LoadingPhase::Snap => {
                if elapsed >= SNAP_PAUSE_MS {
                    // Snap the displayed bar to full before it leaves
                    self.progress = 1.0;
                    self.phase = LoadingPhase::Cross;
                }
            }
            LoadingPhase::Cross => {
                // Crossfade itself is tick-driven; stamp the hold anchor
                // once both fades have landed
                if self.bar_alpha <= 0.0 && self.overlay_alpha >= 1.0 {
                    self.phase = LoadingPhase::Hold;
                    self.phase_started_ms = now_ms;
                    self.blink_phase = 0.0;
                }
            }
            LoadingPhase::Hold => {
                if elapsed >= self.hold_total_ms {
                    self.phase = LoadingPhase::FadeOut;
                }
            }
            LoadingPhase::FadeOut | LoadingPhase::Done => {}
        }
    }

    /// Advance the tick-driven visuals
    pub fn tick(&mut self) {
        match self.phase {
            LoadingPhase::Bar | LoadingPhase::Snap => {
                if self.fade_ticks < BAR_FADE_IN_TICKS {
                    self.fade_ticks += 1;
                    self.bar_alpha = self.fade_ticks as f32 / BAR_FADE_IN_TICKS as f32;
                }
                self.progress = lerp(self.progress, self.target, SMOOTHING);
            }
            LoadingPhase::Cross => {
                self.bar_alpha = (self.bar_alpha - 1.0 / BAR_FADE_OUT_TICKS as f32).max(0.0);
                self.overlay_alpha =
                    (self.overlay_alpha + 1.0 / OVERLAY_FADE_IN_TICKS as f32).min(1.0);
            }
            LoadingPhase::Hold => {
                self.blink_phase += BLINK_PHASE_STEP;
            }
            LoadingPhase::FadeOut => {
                self.overlay_alpha -= 1.0 / OVERLAY_FADE_OUT_TICKS as f32;
                if self.overlay_alpha <= 0.0 {
                    self.overlay_alpha = 0.0;
                    self.phase = LoadingPhase::Done;
                }
            }
            LoadingPhase::Done => {}
        }
    }

    pub fn phase(&self) -> LoadingPhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == LoadingPhase::Done
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn bar_alpha(&self) -> f32 {
        self.bar_alpha
    }

    pub fn overlay_alpha(&self) -> f32 {
        self.overlay_alpha
    }

    /// Continuous sinusoidal title blink, never fully dark
    pub fn blink_alpha(&self) -> f32 {
        0.6 + 0.4 * self.blink_phase.sin()
    }

    pub fn percent_label(&self) -> String {
        format!("{}%", (self.progress * 100.0).round() as u32)
    }

    pub fn tip(&self) -> &'static str {
        LOADING_TIPS[self.tip_index]
    }

    /// Phase-1 window length; exposed for the duration-envelope property
    pub fn bar_total_ms(&self) -> f64 {
        self.bar_total_ms
    }
}

/// Eased bar target: decelerating ramp to 92%, then a linear finish
fn eased_target(raw: f32) -> f32 {
    if raw < 0.85 {
        ease_out_pow(raw / 0.85, 2.5) * 0.92
    } else {
        0.92 + (raw - 0.85) / 0.15 * 0.08
    }
}

/// Filled blocks for the segmented bar at the given progress
pub fn bar_blocks(progress: f32) -> Vec<BarBlock> {
    let fill_w = (BAR_W * progress.clamp(0.0, 1.0)).floor();
    let mut blocks = Vec::new();
    let mut x = 0.0;
    while x < fill_w {
        let w = BLOCK_W.min(fill_w - x);
        let index = (x / (BLOCK_W + BLOCK_GAP)).floor() as u32;
        blocks.push(BarBlock {
            x,
            w,
            bright: index % 2 == 0,
        });
        x += BLOCK_W + BLOCK_GAP;
    }
    blocks
}

/// White sheen ramping in over the bar's last 5%
pub fn bar_highlight_alpha(progress: f32) -> f32 {
    if progress > 0.95 {
        (progress - 0.95) / 0.05 * 0.3
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn sequence(seed: u64) -> LoadingSequence {
        let mut rng = Pcg32::seed_from_u64(seed);
        LoadingSequence::new(0.0, &mut rng)
    }

    /// Drive one frame: wall clock first, then the tick, as the shell does
    fn step(seq: &mut LoadingSequence, now_ms: &mut f64) {
        *now_ms += FRAME_MS;
        seq.update_clock(*now_ms);
        seq.tick();
    }

    #[test]
    fn test_progress_monotone_in_phase_one() {
        let mut seq = sequence(42);
        let mut now = 0.0;
        let mut last = 0.0;
        while seq.phase() == LoadingPhase::Bar || seq.phase() == LoadingPhase::Snap {
            step(&mut seq, &mut now);
            assert!(seq.progress() >= last, "regressed at {now}ms");
            assert!(seq.progress() <= 1.0);
            last = seq.progress();
        }
    }

    #[test]
    fn test_progress_is_exactly_one_when_hold_begins() {
        let mut seq = sequence(7);
        let mut now = 0.0;
        while seq.phase() != LoadingPhase::Hold {
            step(&mut seq, &mut now);
            assert!(now < 20_000.0, "never reached hold");
        }
        assert_eq!(seq.progress(), 1.0);
        assert!(seq.bar_alpha() <= 0.0);
        assert!(seq.overlay_alpha() >= 1.0);
    }

    #[test]
    fn test_sequence_runs_to_done() {
        let mut seq = sequence(1234);
        let mut now = 0.0;
        let mut frames = 0;
        while !seq.is_done() {
            step(&mut seq, &mut now);
            frames += 1;
            assert!(frames < 2000, "sequence never completed");
        }
        // Bar window + snap + crossfade + hold window + fade out
        assert!(now >= WINDOW_MIN_MS * 2.0 + SNAP_PAUSE_MS);
        assert_eq!(seq.overlay_alpha(), 0.0);
    }

    #[test]
    fn test_blink_alpha_stays_in_band() {
        let mut seq = sequence(9);
        let mut now = 0.0;
        while seq.phase() != LoadingPhase::Hold {
            step(&mut seq, &mut now);
        }
        for _ in 0..200 {
            step(&mut seq, &mut now);
            if seq.phase() != LoadingPhase::Hold {
                break;
            }
            let a = seq.blink_alpha();
            assert!((0.2..=1.0).contains(&a));
        }
    }

    #[test]
    fn test_eased_target_continuous_at_knee() {
        let below = eased_target(0.849_99);
        let above = eased_target(0.850_01);
        assert!((below - 0.92).abs() < 1e-3);
        assert!((above - 0.92).abs() < 1e-3);
        assert!(above >= below);
    }

    #[test]
    fn test_bar_blocks_geometry() {
        let blocks = bar_blocks(1.0);
        assert_eq!(blocks[0].x, 0.0);
        for pair in blocks.windows(2) {
            assert_eq!(pair[1].x - pair[0].x, BLOCK_W + BLOCK_GAP);
            assert_ne!(pair[0].bright, pair[1].bright);
        }
        for block in &blocks {
            assert!(block.w <= BLOCK_W);
        }
        // Last block is clipped to the fill width
        let covered = blocks.last().unwrap().x + blocks.last().unwrap().w;
        assert!(covered <= BAR_W);

        assert!(bar_blocks(0.0).is_empty());
    }

    #[test]
    fn test_bar_highlight_ramps_in_final_stretch() {
        assert_eq!(bar_highlight_alpha(0.5), 0.0);
        assert_eq!(bar_highlight_alpha(0.95), 0.0);
        assert!(bar_highlight_alpha(0.99) > 0.0);
        assert!((bar_highlight_alpha(1.0) - 0.3).abs() < 1e-4);
    }

    proptest! {
        #[test]
        fn prop_window_durations_within_envelope(seed in any::<u64>()) {
            let seq = sequence(seed);
            prop_assert!(seq.bar_total_ms() >= WINDOW_MIN_MS);
            prop_assert!(seq.bar_total_ms() < WINDOW_MIN_MS + WINDOW_SPAN_MS);
        }

        #[test]
        fn prop_phase_one_ends_on_schedule(seed in any::<u64>()) {
            let mut seq = sequence(seed);
            let total = seq.bar_total_ms();
            let mut now = 0.0;
            while seq.phase() == LoadingPhase::Bar {
                now += FRAME_MS;
                seq.update_clock(now);
                seq.tick();
                prop_assert!(now < total + 2.0 * FRAME_MS);
            }
            // Leaves the bar phase within one frame of the drawn window
            prop_assert!(now >= total);
        }
    }
}
