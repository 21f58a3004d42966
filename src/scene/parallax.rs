//! Parallax background state
//!
//! Each layer is one tiled image spanning the viewport width. A layer is
//! scaled so its source height fills the viewport height, and its tile
//! offset decrements every tick by `base_speed * layer.speed` - higher
//! speed factors scroll faster, which reads as depth.
//!
//! The raw offset accumulates unbounded; tile repetition wraps it at draw
//! time, so the stored value stays an exact record of total travel.

use crate::assets::PARALLAX_SHEETS;

/// One scrolling background layer
#[derive(Debug, Clone)]
pub struct Layer {
    pub label: &'static str,
    /// Scroll speed factor relative to the base speed
    pub speed: f32,
    /// Source image size in pixels
    pub src_w: f32,
    pub src_h: f32,
    /// Display scale; source height * scale == viewport height
    pub scale: f32,
    /// Accumulated horizontal tile offset (negative = scrolled left)
    pub offset_x: f32,
}

/// Parallax scroller state for the whole layer stack
#[derive(Debug, Clone)]
pub struct ParallaxState {
    layers: Vec<Layer>,
    view_w: f32,
    view_h: f32,
    ready: bool,
}

impl ParallaxState {
    /// Create the scroller in its not-ready state; `attach_sources` flips
    /// it ready once the images have loaded
    pub fn new(view_w: f32, view_h: f32) -> Self {
        Self {
            layers: Vec::new(),
            view_w,
            view_h,
            ready: false,
        }
    }

    /// Finish async init with the loaded source dimensions, one `(w, h)`
    /// pair per manifest entry in manifest order
    pub fn attach_sources(&mut self, dims: &[(f32, f32)]) {
        debug_assert_eq!(dims.len(), PARALLAX_SHEETS.len());
        self.layers = PARALLAX_SHEETS
            .iter()
            .zip(dims)
            .map(|(def, &(src_w, src_h))| {
                let scale = self.view_h / src_h;
                log::info!(
                    "[bg] {}: src={}x{} scale={:.3}",
                    def.label,
                    src_w,
                    src_h,
                    scale
                );
                Layer {
                    label: def.label,
                    speed: def.speed,
                    src_w,
                    src_h,
                    scale,
                    offset_x: 0.0,
                }
            })
            .collect();
        self.ready = true;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn view_size(&self) -> (f32, f32) {
        (self.view_w, self.view_h)
    }

    /// Advance every layer by one tick
    pub fn update(&mut self, base_speed: f32) {
        if !self.ready {
            return;
        }
        for layer in &mut self.layers {
            layer.offset_x -= base_speed * layer.speed;
        }
    }

    /// Recompute every layer scale against the new viewport
    pub fn resize(&mut self, view_w: f32, view_h: f32) {
        self.view_w = view_w;
        self.view_h = view_h;
        if !self.ready {
            return;
        }
        for layer in &mut self.layers {
            layer.scale = view_h / layer.src_h;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_state() -> ParallaxState {
        let mut state = ParallaxState::new(1280.0, 720.0);
        state.attach_sources(&[(576.0, 324.0); 5]);
        state
    }

    #[test]
    fn test_not_ready_update_is_noop() {
        let mut state = ParallaxState::new(1280.0, 720.0);
        state.update(1.2);
        state.resize(640.0, 360.0);
        assert!(!state.is_ready());
        assert!(state.layers().is_empty());
    }

    #[test]
    fn test_offset_accumulates_speed_times_base() {
        let mut state = ready_state();
        let base = 1.2;
        let ticks = 250;
        for _ in 0..ticks {
            state.update(base);
        }
        for layer in state.layers() {
            let expected = -(base * layer.speed * ticks as f32);
            assert!(
                (layer.offset_x - expected).abs() < 1e-3,
                "{}: {} vs {}",
                layer.label,
                layer.offset_x,
                expected
            );
        }
    }

    #[test]
    fn test_depth_ordering_preserved() {
        let mut state = ready_state();
        for _ in 0..100 {
            state.update(1.2);
        }
        let sky = state.layers().iter().find(|l| l.label == "sky").unwrap();
        let fg = state
            .layers()
            .iter()
            .find(|l| l.label == "foreground")
            .unwrap();
        // Both scroll left; the foreground travels much farther
        assert!(sky.offset_x < 0.0);
        assert!(fg.offset_x < sky.offset_x);
    }

    #[test]
    fn test_scale_fills_viewport_height() {
        let state = ready_state();
        for layer in state.layers() {
            assert!((layer.src_h * layer.scale - 720.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_resize_idempotent() {
        let mut state = ready_state();
        state.resize(1920.0, 1080.0);
        let once: Vec<f32> = state.layers().iter().map(|l| l.scale).collect();
        state.resize(1920.0, 1080.0);
        let twice: Vec<f32> = state.layers().iter().map(|l| l.scale).collect();
        assert_eq!(once, twice);
        assert!((state.layers()[0].scale - 1080.0 / 324.0).abs() < 1e-5);
    }

    #[test]
    fn test_resize_preserves_offsets() {
        let mut state = ready_state();
        for _ in 0..40 {
            state.update(1.2);
        }
        let before: Vec<f32> = state.layers().iter().map(|l| l.offset_x).collect();
        state.resize(800.0, 600.0);
        let after: Vec<f32> = state.layers().iter().map(|l| l.offset_x).collect();
        assert_eq!(before, after);
    }
}
