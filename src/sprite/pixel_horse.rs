//! Procedural pixel-art horse frames
//!
//! Bakes an 8-frame walk cycle into RGBA bitmaps on a 22x14 logical-pixel
//! grid at 4x magnification. The figure is layered rectangles; the tail
//! sways on a sine of the cycle phase and each leg runs the same sine at
//! its own phase offset - front/back pairs half a cycle apart, left/right
//! pairs a quarter cycle apart - which is what produces the gait.
//!
//! Pure CPU work, no platform types; the shell uploads the bitmaps once.

use super::FrameBitmap;

pub const LOGICAL_W: u32 = 22;
pub const LOGICAL_H: u32 = 14;
/// One logical pixel renders as a 4x4 block
pub const MAGNIFICATION: u32 = 4;
pub const FRAME_COUNT: usize = 8;

mod palette {
    pub const BODY: u32 = 0x7a3b10;
    pub const DARK: u32 = 0x4e2508;
    pub const LEGS: u32 = 0x5c2d0c;
    pub const MANE: u32 = 0x2a1204;
    pub const TAIL: u32 = 0x3d1c06;
    pub const EYE: u32 = 0x111111;
    pub const NOSE: u32 = 0x5a2a10;
    pub const HOOF: u32 = 0x1a0e04;
    pub const BACK_HIGHLIGHT: u32 = 0x9e5520;
    pub const EAR_INNER: u32 = 0xaa4422;
}

/// Per-leg gait table: x position, phase offset, front pair flag
const LEG_TABLE: [(i32, f32, bool); 4] = [
    (12, 0.00, true),
    (14, 0.50, true),
    (7, 0.25, false),
    (9, 0.75, false),
];

/// Bake the full walk cycle
pub fn generate_frames() -> Vec<FrameBitmap> {
    (0..FRAME_COUNT).map(bake_frame).collect()
}

fn bake_frame(frame: usize) -> FrameBitmap {
    let t = frame as f32 / FRAME_COUNT as f32;
    let mut raster = Raster::new();

    // Body
    raster.rect(palette::BODY, 5, 4, 11, 5);
    raster.rect(palette::DARK, 5, 8, 11, 1); // belly shadow
    raster.rect(palette::BACK_HIGHLIGHT, 6, 4, 9, 1);

    // Rump
    raster.rect(palette::BODY, 4, 5, 2, 3);

    // Neck
    raster.rect(palette::BODY, 14, 2, 3, 4);
    raster.rect(palette::BODY, 15, 1, 2, 2);

    // Head
    raster.rect(palette::BODY, 16, 1, 5, 4);
    raster.rect(palette::BODY, 17, 0, 4, 2); // forehead
    raster.rect(palette::NOSE, 20, 3, 2, 2); // snout
    raster.rect(palette::DARK, 21, 4, 1, 1); // nostril
    raster.rect(palette::EYE, 18, 1, 1, 1);
    raster.rect(palette::BODY, 17, -1, 2, 2); // ear base, clipped at the top
    raster.rect(palette::EAR_INNER, 17, -1, 1, 1);

    // Mane
    raster.rect(palette::MANE, 14, 0, 4, 3);
    raster.rect(palette::MANE, 15, 1, 2, 4);

    // Tail sways with the cycle
    let tail_y = 4 + ((t * std::f32::consts::TAU).sin() * 1.5).round() as i32;
    raster.rect(palette::TAIL, 2, tail_y, 3, 1);
    raster.rect(palette::TAIL, 1, tail_y + 1, 3, 2);
    raster.rect(palette::TAIL, 0, tail_y + 2, 2, 3);

    draw_legs(&mut raster, t);

    raster.into_bitmap()
}

fn draw_legs(raster: &mut Raster, t: f32) {
    for (x_base, phase, is_front) in LEG_TABLE {
        let angle = ((t + phase) * std::f32::consts::TAU).sin();
        let is_extended = angle > 0.0;
        let reach = if is_front { 2.5 } else { 2.0 };
        let x_shift = (angle * reach).round() as i32;
        let y_shift = angle.round().abs() as i32;

        // Upper leg
        let ux = x_base + x_shift;
        let uy = 9 - y_shift;
        raster.rect(palette::LEGS, ux, uy, 1, 3);

        // Lower leg kicks forward when extended, trails when lifted
        let lx = ux + if is_extended { 1 } else { -1 };
        let ly = uy + 2;
        raster.rect(palette::LEGS, lx, ly, 1, 2);

        // Hoof
        let hx = lx + if is_extended { 0 } else { -1 };
        let hy = ly + 2;
        raster.rect(palette::HOOF, hx, hy, 2, 1);
    }
}

/// Fixed-size RGBA raster addressed in logical pixels
struct Raster {
    pixels: Vec<u8>,
}

impl Raster {
    const W: i32 = (LOGICAL_W * MAGNIFICATION) as i32;
    const H: i32 = (LOGICAL_H * MAGNIFICATION) as i32;

    fn new() -> Self {
        Self {
            pixels: vec![0; (Self::W * Self::H * 4) as usize],
        }
    }

    /// Fill a rectangle given in logical-pixel units, clipped to the
    /// canvas (the ear deliberately pokes past the top edge)
    fn rect(&mut self, color: u32, x: i32, y: i32, w: i32, h: i32) {
        let m = MAGNIFICATION as i32;
        let x0 = (x * m).clamp(0, Self::W);
        let y0 = (y * m).clamp(0, Self::H);
        let x1 = ((x + w) * m).clamp(0, Self::W);
        let y1 = ((y + h) * m).clamp(0, Self::H);

        let r = (color >> 16) as u8;
        let g = (color >> 8) as u8;
        let b = color as u8;
        for py in y0..y1 {
            for px in x0..x1 {
                let i = ((py * Self::W + px) * 4) as usize;
                self.pixels[i] = r;
                self.pixels[i + 1] = g;
                self.pixels[i + 2] = b;
                self.pixels[i + 3] = 0xff;
            }
        }
    }

    fn into_bitmap(self) -> FrameBitmap {
        FrameBitmap {
            width: Self::W as u32,
            height: Self::H as u32,
            rgba: self.pixels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logical_pixel(frame: &FrameBitmap, x: u32, y: u32) -> [u8; 4] {
        let px = x * MAGNIFICATION;
        let py = y * MAGNIFICATION;
        let i = ((py * frame.width + px) * 4) as usize;
        frame.rgba[i..i + 4].try_into().unwrap()
    }

    fn has_color(frame: &FrameBitmap, color: u32) -> bool {
        let rgba = [(color >> 16) as u8, (color >> 8) as u8, color as u8, 0xff];
        frame.rgba.chunks_exact(4).any(|p| p == rgba)
    }

    #[test]
    fn test_bakes_eight_frames_of_fixed_size() {
        let frames = generate_frames();
        assert_eq!(frames.len(), FRAME_COUNT);
        for frame in &frames {
            assert_eq!(frame.width, LOGICAL_W * MAGNIFICATION);
            assert_eq!(frame.height, LOGICAL_H * MAGNIFICATION);
            assert_eq!(frame.rgba.len(), (frame.width * frame.height * 4) as usize);
        }
    }

    #[test]
    fn test_baking_is_deterministic() {
        assert_eq!(generate_frames(), generate_frames());
    }

    #[test]
    fn test_body_and_eye_are_static_across_frames() {
        let frames = generate_frames();
        for frame in &frames {
            // Body interior and eye never move
            assert_eq!(logical_pixel(frame, 10, 6)[..3], [0x7a, 0x3b, 0x10]);
            assert_eq!(logical_pixel(frame, 18, 1)[..3], [0x11, 0x11, 0x11]);
        }
    }

    #[test]
    fn test_tail_and_legs_animate() {
        let frames = generate_frames();
        // Opposite ends of the cycle must differ somewhere
        assert_ne!(frames[0], frames[2]);
        assert_ne!(frames[2], frames[6]);
    }

    #[test]
    fn test_every_frame_has_hooves() {
        for frame in generate_frames() {
            assert!(has_color(&frame, 0x1a0e04));
        }
    }

    #[test]
    fn test_background_is_transparent() {
        let frame = &generate_frames()[0];
        // Top-left corner is empty sky
        assert_eq!(logical_pixel(frame, 0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_front_and_back_leg_pairs_oppose() {
        // Phase offsets within each pair sit half a cycle apart, and the
        // pairs interleave on quarter cycles
        assert_eq!(LEG_TABLE[0].1, 0.0);
        assert_eq!(LEG_TABLE[1].1, 0.5);
        assert_eq!(LEG_TABLE[2].1, 0.25);
        assert_eq!(LEG_TABLE[3].1, 0.75);
    }
}
