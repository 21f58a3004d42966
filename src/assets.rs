//! Static asset manifest
//!
//! URLs are relative to the served site root; the bundler copies the
//! `assets/` directory verbatim. Parallax list order is z-order, back to
//! front, and each entry carries its own scroll speed factor.

/// One parallax sheet: where to fetch it, how fast it scrolls, what to
/// call it in logs
#[derive(Debug, Clone, Copy)]
pub struct SheetDef {
    pub url: &'static str,
    pub speed: f32,
    pub label: &'static str,
}

pub const PARALLAX_SHEETS: [SheetDef; 5] = [
    SheetDef { url: "assets/background_valley-Sheet1.png", speed: 0.05, label: "sky" },
    SheetDef { url: "assets/background_valley-Sheet2.png", speed: 0.20, label: "far-mtn" },
    SheetDef { url: "assets/background_valley-Sheet3.png", speed: 0.40, label: "mid-mtn" },
    SheetDef { url: "assets/background_valley-Sheet4.png", speed: 0.70, label: "ground" },
    SheetDef { url: "assets/background_valley-Sheet5.png", speed: 1.10, label: "foreground" },
];

/// Dodo walk cycle: a single 4x3 sprite sheet (rows 1-2 hold the side-view
/// walk frames)
pub const DODO_SHEET_URL: &str = "assets/dodo.png";

/// Shepherd walk cycle: six standalone frame images
pub const SHEPHERD_FRAME_URLS: [&str; 6] = [
    "assets/shepherd/frame_0.png",
    "assets/shepherd/frame_1.png",
    "assets/shepherd/frame_2.png",
    "assets/shepherd/frame_3.png",
    "assets/shepherd/frame_4.png",
    "assets/shepherd/frame_5.png",
];
