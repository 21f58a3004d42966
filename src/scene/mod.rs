//! Deterministic scene state
//!
//! All per-frame demo logic lives here. This module must be pure and
//! deterministic:
//! - Advanced only by the render tick and an injected wall-clock sample
//! - Seeded RNG only
//! - No rendering or platform dependencies
//!
//! The wasm shell reads this state every frame and mirrors it into the
//! retained node tree; nothing in here touches the DOM.

pub mod flock;
pub mod loading;
pub mod menu;
pub mod parallax;

pub use flock::{FlockKind, FlockMember, FlockState};
pub use loading::{BarBlock, LoadingPhase, LoadingSequence};
pub use menu::{Cue, Difficulty, ItemAction, MenuCommand, MenuInput, MenuItem, MenuModel, Screen, ScreenId};
pub use parallax::{Layer, ParallaxState};
