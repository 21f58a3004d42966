//! Animated sprite flocks
//!
//! One controller covers all three flocks (horses, dodos, the shepherd);
//! the per-flock differences are tables on `FlockKind`. Members are plain
//! value records in a Vec - there is no pooling, just one state
//! transition: a member whose left edge passes the right margin resets to
//! just off the left edge, with its vertical row re-rolled for liveness.
//!
//! `pos.x` is always the member's LEFT edge in screen space. Flipped
//! flocks (art facing opposite its travel) render with a negated
//! horizontal scale anchored at the right edge; the kind owns both halves
//! of that pairing so they cannot drift apart.

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::TICK_HZ;

/// Members wrap once their left edge passes `view_w + WRAP_MARGIN`...
const WRAP_MARGIN: f32 = 20.0;
/// ...and re-enter with their right edge this far off the left side
const RESET_GAP: f32 = 10.0;

/// Which flock this controller drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlockKind {
    Horses,
    Dodos,
    Shepherd,
}

impl FlockKind {
    pub fn count(self) -> usize {
        match self {
            FlockKind::Horses => 6,
            FlockKind::Dodos => 7,
            FlockKind::Shepherd => 1,
        }
    }

    /// Base display scale applied to the source frame
    pub fn scale(self) -> f32 {
        match self {
            FlockKind::Horses => 3.0,
            FlockKind::Dodos => 3.5,
            FlockKind::Shepherd => 3.0,
        }
    }

    /// Walk-cycle playback rate
    pub fn fps(self) -> f32 {
        match self {
            FlockKind::Horses => 12.0,
            FlockKind::Dodos => 8.0,
            FlockKind::Shepherd => 10.0,
        }
    }

    pub fn base_speed(self) -> f32 {
        match self {
            FlockKind::Horses => 2.8,
            FlockKind::Dodos => 2.4,
            FlockKind::Shepherd => 2.0,
        }
    }

    /// True when the source art faces opposite the direction of travel
    pub fn flipped(self) -> bool {
        matches!(self, FlockKind::Shepherd)
    }

    /// Horizontal anchor paired with the flip: right edge for flipped
    /// sprites, left edge otherwise
    pub fn anchor_x(self) -> f32 {
        if self.flipped() { 1.0 } else { 0.0 }
    }

    /// The shepherd snaps to the new ground line immediately on resize;
    /// the herds wait for their next wrap
    pub fn repositions_on_resize(self) -> bool {
        matches!(self, FlockKind::Shepherd)
    }

    /// Deterministic per-index size variance
    fn size_variance(self, i: usize) -> f32 {
        match self {
            FlockKind::Horses => 0.85 + (i % 3) as f32 * 0.12,
            FlockKind::Dodos => 0.80 + (i % 4) as f32 * 0.12,
            FlockKind::Shepherd => 1.0,
        }
    }

    /// Deterministic per-index speed variance
    fn speed_variance(self, i: usize) -> f32 {
        match self {
            FlockKind::Horses => 0.85 + (i % 4) as f32 * 0.1,
            FlockKind::Dodos => 0.85 + (i % 4) as f32 * 0.09,
            FlockKind::Shepherd => 1.0,
        }
    }

    /// Extra X shift layered on the even spawn spacing so the flock does
    /// not march in lockstep
    fn spawn_stagger(self, i: usize) -> f32 {
        match self {
            FlockKind::Horses => (i * 37 % 40) as f32 - 20.0,
            FlockKind::Dodos => -((i % 3) as f32 * 60.0),
            FlockKind::Shepherd => 0.0,
        }
    }

    /// Signed Y offset from the ground line at spawn, per row
    fn spawn_row_offset(self, i: usize) -> f32 {
        match self {
            FlockKind::Horses => -((i % 3) as f32 * 4.0),
            FlockKind::Dodos => (i % 3) as f32 * 5.0,
            FlockKind::Shepherd => 0.0,
        }
    }

    /// Signed Y offset applied when a member wraps; `None` leaves Y alone
    fn wrap_row_offset(self, row: u32) -> Option<f32> {
        match self {
            FlockKind::Horses => Some(-(row as f32 * 6.0)),
            FlockKind::Dodos => Some(row as f32 * 5.0),
            FlockKind::Shepherd => None,
        }
    }
}

/// One flock member - a homogeneous value record, not an entity
#[derive(Debug, Clone)]
pub struct FlockMember {
    /// Left edge of the sprite in screen space
    pub pos: Vec2,
    /// Horizontal advance per tick
    pub speed: f32,
    /// Absolute display scale (kind scale * size variance)
    pub scale: f32,
    /// Fractional walk-cycle position; truncates to the frame index
    pub frame_pos: f32,
}

/// Flock controller state
#[derive(Debug, Clone)]
pub struct FlockState {
    kind: FlockKind,
    members: Vec<FlockMember>,
    view_w: f32,
    ground_y: f32,
    /// Source frame size before member scaling
    frame_w: f32,
    frame_h: f32,
    frame_count: usize,
    rng: Pcg32,
}

impl FlockState {
    pub fn new(
        kind: FlockKind,
        view_w: f32,
        ground_y: f32,
        frame_w: f32,
        frame_h: f32,
        frame_count: usize,
        seed: u64,
    ) -> Self {
        let mut state = Self {
            kind,
            members: Vec::with_capacity(kind.count()),
            view_w,
            ground_y,
            frame_w,
            frame_h,
            frame_count,
            rng: Pcg32::seed_from_u64(seed),
        };
        state.spawn();
        state
    }

    fn spawn(&mut self) {
        let kind = self.kind;
        let count = kind.count();
        let spacing = self.view_w / count as f32;

        for i in 0..count {
            let scale = kind.scale() * kind.size_variance(i);
            let w = self.frame_w * scale;
            let h = self.frame_h * scale;

            let x = -w + spacing * i as f32 + kind.spawn_stagger(i);
            let y = self.ground_y - h + kind.spawn_row_offset(i);

            // Stagger the walk-cycle phase across the flock
            let frame_pos = (i as f32 / count as f32 * self.frame_count as f32).floor();

            self.members.push(FlockMember {
                pos: Vec2::new(x, y),
                speed: kind.base_speed() * kind.speed_variance(i),
                scale,
                frame_pos,
            });
        }
    }

    pub fn kind(&self) -> FlockKind {
        self.kind
    }

    pub fn members(&self) -> &[FlockMember] {
        &self.members
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Current frame index for a member
    pub fn frame_index(&self, member: &FlockMember) -> usize {
        member.frame_pos as usize % self.frame_count
    }

    /// Scaled sprite size for a member
    pub fn display_size(&self, member: &FlockMember) -> (f32, f32) {
        (self.frame_w * member.scale, self.frame_h * member.scale)
    }

    /// Advance every member by one tick: animation, travel, wrap
    pub fn update(&mut self) {
        let step = self.kind.fps() / TICK_HZ;
        let frame_span = self.frame_count as f32;
        let kind = self.kind;

        for member in &mut self.members {
            member.frame_pos = (member.frame_pos + step) % frame_span;
            member.pos.x += member.speed;

            let w = self.frame_w * member.scale;
            if member.pos.x > self.view_w + WRAP_MARGIN {
                member.pos.x = -w - RESET_GAP;
                let row = self.rng.random_range(0..3u32);
                if let Some(offset) = kind.wrap_row_offset(row) {
                    let h = self.frame_h * member.scale;
                    member.pos.y = self.ground_y - h + offset;
                }
            }
        }
    }

    /// Update stored bounds; members pick the new ground line up on their
    /// next wrap, except kinds that reposition immediately
    pub fn resize(&mut self, view_w: f32, ground_y: f32) {
        self.view_w = view_w;
        self.ground_y = ground_y;
        if self.kind.repositions_on_resize() {
            for member in &mut self.members {
                let h = self.frame_h * member.scale;
                member.pos.y = ground_y - h;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn horses() -> FlockState {
        FlockState::new(FlockKind::Horses, 1280.0, 500.0, 88.0, 56.0, 8, 7)
    }

    #[test]
    fn test_spawn_within_bounds() {
        for kind in [FlockKind::Horses, FlockKind::Dodos, FlockKind::Shepherd] {
            let state = FlockState::new(kind, 1280.0, 500.0, 64.0, 48.0, 8, 1);
            assert_eq!(state.members().len(), kind.count());
            for member in state.members() {
                assert!(member.pos.x >= -1280.0 && member.pos.x <= 1280.0);
                assert!(member.pos.y <= 500.0);
            }
        }
    }

    #[test]
    fn test_wrap_resets_to_left_of_origin() {
        let mut state = horses();
        // Drive each member past the right margin and verify the very next
        // update that crosses it lands off the left edge
        for _ in 0..2000 {
            let before: Vec<f32> = state.members().iter().map(|m| m.pos.x).collect();
            state.update();
            for (member, prev) in state.members().iter().zip(&before) {
                if member.pos.x < *prev {
                    // Wrapped this tick
                    assert!(member.pos.x < 0.0);
                    let (w, _) = state.display_size(member);
                    assert!((member.pos.x - (-w - RESET_GAP)).abs() < 1e-3);
                } else {
                    assert!((member.pos.x - (prev + member.speed)).abs() < 1e-3);
                }
            }
        }
    }

    #[test]
    fn test_every_member_wraps_within_thousand_ticks() {
        let mut state = horses();
        let mut wrapped = vec![false; state.members().len()];
        for _ in 0..1000 {
            let before: Vec<f32> = state.members().iter().map(|m| m.pos.x).collect();
            state.update();
            for (i, member) in state.members().iter().enumerate() {
                if member.pos.x < before[i] {
                    wrapped[i] = true;
                }
            }
        }
        assert!(wrapped.iter().all(|&w| w), "wraps: {wrapped:?}");
    }

    #[test]
    fn test_feet_stay_at_or_above_ground() {
        let mut state = horses();
        for _ in 0..1500 {
            state.update();
            for member in state.members() {
                let (_, h) = state.display_size(member);
                // Horses stack upward from the ground line
                assert!(member.pos.y + h <= 500.0 + 1e-3);
            }
        }
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let mut a = horses();
        let mut b = horses();
        for _ in 0..1200 {
            a.update();
            b.update();
        }
        for (ma, mb) in a.members().iter().zip(b.members()) {
            assert_eq!(ma.pos, mb.pos);
            assert_eq!(ma.frame_pos, mb.frame_pos);
        }
    }

    #[test]
    fn test_resize_defers_for_herds() {
        let mut state = horses();
        let before: Vec<Vec2> = state.members().iter().map(|m| m.pos).collect();
        state.resize(1920.0, 900.0);
        let after: Vec<Vec2> = state.members().iter().map(|m| m.pos).collect();
        assert_eq!(before, after);

        // Repeating the same resize changes nothing further
        state.resize(1920.0, 900.0);
        let again: Vec<Vec2> = state.members().iter().map(|m| m.pos).collect();
        assert_eq!(after, again);
    }

    #[test]
    fn test_resize_repositions_shepherd_immediately() {
        let mut state = FlockState::new(FlockKind::Shepherd, 1280.0, 500.0, 40.0, 52.0, 6, 3);
        state.resize(1280.0, 700.0);
        let member = &state.members()[0];
        let (_, h) = state.display_size(member);
        assert!((member.pos.y - (700.0 - h)).abs() < 1e-3);
    }

    #[test]
    fn test_flip_pairs_with_right_anchor() {
        for kind in [FlockKind::Horses, FlockKind::Dodos, FlockKind::Shepherd] {
            if kind.flipped() {
                assert_eq!(kind.anchor_x(), 1.0);
            } else {
                assert_eq!(kind.anchor_x(), 0.0);
            }
        }
    }

    #[test]
    fn test_frame_index_advances_at_fps() {
        let mut state = horses();
        let start = state.members()[0].frame_pos;
        for _ in 0..5 {
            state.update();
        }
        let expected = (start + 5.0 * 12.0 / 60.0) % 8.0;
        assert!((state.members()[0].frame_pos - expected).abs() < 1e-4);
    }
}
