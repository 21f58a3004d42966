//! Pixel Valley - a pixel-art parallax menu demo
//!
//! Core modules:
//! - `scene`: Deterministic per-frame state (parallax, flocks, menu, loading)
//! - `sprite`: Walk-cycle frame sources (procedural baking, sheet slicing)
//! - `renderer`: Retained scene-graph adapter over the canvas 2D context
//! - `platform`: Browser plumbing (clock, asset loading, rAF)
//! - `settings`: User preferences persisted to LocalStorage

pub mod assets;
pub mod scene;
pub mod settings;
pub mod sprite;

#[cfg(target_arch = "wasm32")]
pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod platform;
#[cfg(target_arch = "wasm32")]
pub mod renderer;

pub use settings::Settings;

/// Demo configuration constants
pub mod consts {
    /// Base horizontal scroll applied to every parallax layer per tick,
    /// multiplied by the layer's own speed factor
    pub const BASE_SCROLL_SPEED: f32 = 1.2;

    /// Fraction of the viewport height where flock members' feet rest
    pub const GROUND_FRACTION: f32 = 0.85;

    /// Nominal display refresh; animation speeds are authored in frames
    /// per second and converted to per-tick advances against this rate
    pub const TICK_HZ: f32 = 60.0;

    /// Viewport floor - the canvas never shrinks below this
    pub const MIN_VIEW_W: f32 = 320.0;
    pub const MIN_VIEW_H: f32 = 180.0;

    /// Sky-blue clear color shown while assets load
    pub const CLEAR_COLOR: u32 = 0x5cc8d8;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Quadratic ease-in-out over `p` in [0, 1]
#[inline]
pub fn ease_in_out_quad(p: f32) -> f32 {
    if p < 0.5 {
        2.0 * p * p
    } else {
        -1.0 + (4.0 - 2.0 * p) * p
    }
}

/// Decelerating ease: 1 - (1 - t)^power, for `t` in [0, 1]
#[inline]
pub fn ease_out_pow(t: f32, power: f32) -> f32 {
    1.0 - (1.0 - t).powf(power)
}
