//! Canvas rendering module
//!
//! A thin retained scene graph drawn through the 2D context. The real
//! engine underneath (compositing, rasterization) is the browser's; this
//! adapter only owns the node tree and its per-frame traversal.

pub mod stage;

pub use stage::{upload_bitmap, FrameSet, Node, NodeId, NodeKind, Stage, TextStyle};
