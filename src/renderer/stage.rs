//! Retained scene graph over the canvas 2D context
//!
//! Nodes live in an arena and form a tree from a single root. Each node
//! carries a transform (position, scale, anchor), an alpha that
//! multiplies down the tree, and a drawable kind. The shell mutates
//! transforms every frame and calls `draw` once per rAF tick.
//!
//! Pixel-art discipline: image smoothing is forced off, so scaled sprites
//! keep hard pixel edges.

use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, ImageData};

use crate::scene::loading;
use crate::sprite::{FrameBitmap, FrameRect};

/// Handle to a node in the stage arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

/// Text presentation, mirrored from the style the shell authors
#[derive(Debug, Clone)]
pub struct TextStyle {
    pub font_px: u32,
    pub weight: &'static str,
    pub family: &'static str,
    pub fill: u32,
    /// Outline color and width
    pub stroke: Option<(u32, f64)>,
    /// Drop shadow color and offset
    pub shadow: Option<(u32, f64)>,
}

impl TextStyle {
    fn font(&self) -> String {
        format!("{} {}px {}", self.weight, self.font_px, self.family)
    }
}

/// Animation frame storage behind one drawing interface: baked bitmaps
/// uploaded to offscreen canvases, sheet sub-rects of one image, or a
/// strip of standalone images
pub enum FrameSet {
    Baked(Vec<HtmlCanvasElement>),
    Sheet {
        image: HtmlImageElement,
        rects: Vec<FrameRect>,
    },
    Strip(Vec<HtmlImageElement>),
}

impl FrameSet {
    pub fn len(&self) -> usize {
        match self {
            FrameSet::Baked(frames) => frames.len(),
            FrameSet::Sheet { rects, .. } => rects.len(),
            FrameSet::Strip(frames) => frames.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Natural frame size in pixels
    pub fn frame_size(&self) -> (f64, f64) {
        match self {
            FrameSet::Baked(frames) => (frames[0].width() as f64, frames[0].height() as f64),
            FrameSet::Sheet { rects, .. } => (rects[0].w as f64, rects[0].h as f64),
            FrameSet::Strip(frames) => (
                frames[0].natural_width() as f64,
                frames[0].natural_height() as f64,
            ),
        }
    }
}

pub enum NodeKind {
    Group,
    /// An image tiled horizontally across `w` at `tile_scale`
    Tiling {
        image: HtmlImageElement,
        tile_scale: f64,
        offset_x: f64,
        w: f64,
        h: f64,
    },
    /// One frame of an animation frame set
    Sprite { frames: FrameSet, frame: usize },
    Text { content: String, style: TextStyle },
    /// Solid rectangle
    Fill { color: u32, w: f64, h: f64 },
    /// Segmented loading-bar fill; geometry comes from the scene module
    Bar { progress: f32 },
}

pub struct Node {
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub anchor_x: f64,
    pub anchor_y: f64,
    pub alpha: f32,
    pub visible: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            anchor_x: 0.0,
            anchor_y: 0.0,
            alpha: 1.0,
            visible: true,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// The render surface: a canvas, its 2D context and the node tree
pub struct Stage {
    ctx: CanvasRenderingContext2d,
    canvas: HtmlCanvasElement,
    nodes: Vec<Option<Node>>,
    root: NodeId,
    width: f64,
    height: f64,
    clear_color: u32,
}

impl Stage {
    pub fn new(
        canvas: HtmlCanvasElement,
        width: f64,
        height: f64,
        clear_color: u32,
    ) -> Result<Self, JsValue> {
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);
        let ctx = crate::platform::context_2d(&canvas)?;
        ctx.set_image_smoothing_enabled(false);

        let mut nodes = Vec::new();
        nodes.push(Some(Node::new(NodeKind::Group)));
        Ok(Self {
            ctx,
            canvas,
            nodes,
            root: NodeId(0),
            width,
            height,
            clear_color,
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Resize the backing store; smoothing resets with it
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.canvas.set_width(width as u32);
        self.canvas.set_height(height as u32);
        self.ctx.set_image_smoothing_enabled(false);
    }

    /// Create a node and attach it under `parent`
    pub fn add(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mut node = Node::new(kind);
        node.parent = Some(parent);
        self.nodes.push(Some(node));
        self.node_mut(parent).children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        self.nodes[id.0].as_ref().expect("stale node id")
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes[id.0].as_mut().expect("stale node id")
    }

    /// Detach a node and drop its whole subtree
    pub fn remove(&mut self, id: NodeId) {
        if let Some(parent) = self.node(id).parent {
            if let Some(p) = self.nodes[parent.0].as_mut() {
                p.children.retain(|&c| c != id);
            }
        }
        self.drop_subtree(id);
    }

    fn drop_subtree(&mut self, id: NodeId) {
        if let Some(node) = self.nodes[id.0].take() {
            for child in node.children {
                self.drop_subtree(child);
            }
        }
    }

    /// Measure a string under a style, for pointer hit boxes
    pub fn measure_text(&self, content: &str, style: &TextStyle) -> f64 {
        self.ctx.set_font(&style.font());
        self.ctx
            .measure_text(content)
            .map(|m| m.width())
            .unwrap_or(0.0)
    }

    /// Clear and redraw the whole tree
    pub fn draw(&self) {
        self.ctx.set_fill_style_str(&css_color(self.clear_color));
        self.ctx.fill_rect(0.0, 0.0, self.width, self.height);
        self.draw_node(self.root, 1.0);
    }

    fn draw_node(&self, id: NodeId, parent_alpha: f32) {
        let Some(node) = self.nodes[id.0].as_ref() else {
            return;
        };
        if !node.visible {
            return;
        }
        let alpha = parent_alpha * node.alpha;
        if alpha <= 0.0 {
            return;
        }

        self.ctx.save();
        let _ = self.ctx.translate(node.x, node.y);
        let _ = self.ctx.scale(node.scale_x, node.scale_y);
        self.ctx.set_global_alpha(alpha as f64);

        match &node.kind {
            NodeKind::Group => {}
            NodeKind::Tiling {
                image,
                tile_scale,
                offset_x,
                w,
                h,
            } => self.draw_tiling(image, *tile_scale, *offset_x, *w, *h),
            NodeKind::Sprite { frames, frame } => {
                self.draw_sprite(frames, *frame, node.anchor_x, node.anchor_y);
            }
            NodeKind::Text { content, style } => {
                self.draw_text(content, style, node.anchor_x, node.anchor_y);
            }
            NodeKind::Fill { color, w, h } => {
                self.ctx.set_fill_style_str(&css_color(*color));
                self.ctx
                    .fill_rect(-node.anchor_x * w, -node.anchor_y * h, *w, *h);
            }
            NodeKind::Bar { progress } => self.draw_bar(*progress, alpha),
        }

        for &child in &node.children {
            self.draw_node(child, alpha);
        }
        self.ctx.restore();
    }

    fn draw_tiling(&self, image: &HtmlImageElement, tile_scale: f64, offset_x: f64, w: f64, h: f64) {
        let tile_w = image.natural_width() as f64 * tile_scale;
        if tile_w <= 0.0 {
            return;
        }
        let mut x = offset_x % tile_w;
        if x > 0.0 {
            x -= tile_w;
        }
        while x < w {
            let _ = self
                .ctx
                .draw_image_with_html_image_element_and_dw_and_dh(image, x, 0.0, tile_w, h);
            x += tile_w;
        }
    }

    fn draw_sprite(&self, frames: &FrameSet, frame: usize, anchor_x: f64, anchor_y: f64) {
        let (w, h) = frames.frame_size();
        let dx = -anchor_x * w;
        let dy = -anchor_y * h;
        let frame = frame % frames.len();
        match frames {
            FrameSet::Baked(canvases) => {
                let _ = self
                    .ctx
                    .draw_image_with_html_canvas_element(&canvases[frame], dx, dy);
            }
            FrameSet::Sheet { image, rects } => {
                let r = rects[frame];
                let _ = self
                    .ctx
                    .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                        image, r.x as f64, r.y as f64, r.w as f64, r.h as f64, dx, dy, r.w as f64,
                        r.h as f64,
                    );
            }
            FrameSet::Strip(images) => {
                let _ = self
                    .ctx
                    .draw_image_with_html_image_element(&images[frame], dx, dy);
            }
        }
    }

    fn draw_text(&self, content: &str, style: &TextStyle, anchor_x: f64, anchor_y: f64) {
        self.ctx.set_font(&style.font());
        self.ctx.set_text_baseline("middle");
        let width = self
            .ctx
            .measure_text(content)
            .map(|m| m.width())
            .unwrap_or(0.0);
        let dx = -anchor_x * width;
        // Middle baseline; shift by the anchor's offset from center
        let dy = (0.5 - anchor_y) * style.font_px as f64;

        if let Some((color, offset)) = style.shadow {
            self.ctx.set_fill_style_str(&css_color(color));
            let _ = self.ctx.fill_text(content, dx + offset, dy + offset);
        }
        if let Some((color, width_px)) = style.stroke {
            self.ctx.set_stroke_style_str(&css_color(color));
            self.ctx.set_line_width(width_px);
            let _ = self.ctx.stroke_text(content, dx, dy);
        }
        self.ctx.set_fill_style_str(&css_color(style.fill));
        let _ = self.ctx.fill_text(content, dx, dy);
    }

    fn draw_bar(&self, progress: f32, alpha: f32) {
        const FILL: u32 = 0x44dd44;
        const FILL_MID: u32 = 0x22aa22;
        const SHINE: u32 = 0x88ff88;
        const DARK: u32 = 0x116611;
        let bar_h = loading::BAR_H as f64;

        for block in loading::bar_blocks(progress) {
            let (x, w) = (block.x as f64, block.w as f64);
            let color = if block.bright { FILL } else { FILL_MID };
            self.ctx.set_fill_style_str(&css_color(color));
            self.ctx.fill_rect(x, 0.0, w, bar_h);

            self.ctx.set_global_alpha((alpha * 0.5) as f64);
            self.ctx.set_fill_style_str(&css_color(SHINE));
            self.ctx.fill_rect(x, 0.0, w, 4.0);

            self.ctx.set_global_alpha((alpha * 0.7) as f64);
            self.ctx.set_fill_style_str(&css_color(DARK));
            self.ctx.fill_rect(x, bar_h - 4.0, w, 4.0);

            self.ctx.set_global_alpha(alpha as f64);
        }

        let highlight = loading::bar_highlight_alpha(progress);
        if highlight > 0.0 {
            self.ctx.set_global_alpha((alpha * highlight) as f64);
            self.ctx.set_fill_style_str("#ffffff");
            self.ctx
                .fill_rect(0.0, 0.0, loading::BAR_W as f64, bar_h);
            self.ctx.set_global_alpha(alpha as f64);
        }
    }
}

/// Upload a baked bitmap into an offscreen canvas the 2D context can blit
pub fn upload_bitmap(bitmap: &FrameBitmap) -> Result<HtmlCanvasElement, JsValue> {
    let canvas = crate::platform::document()?
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()?;
    canvas.set_width(bitmap.width);
    canvas.set_height(bitmap.height);

    let ctx = crate::platform::context_2d(&canvas)?;
    let data = ImageData::new_with_u8_clamped_array_and_sh(
        Clamped(bitmap.rgba.as_slice()),
        bitmap.width,
        bitmap.height,
    )?;
    ctx.put_image_data(&data, 0.0, 0.0)?;
    Ok(canvas)
}

fn css_color(color: u32) -> String {
    format!("#{color:06x}")
}
