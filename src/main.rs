//! Pixel Valley entry point
//!
//! Handles platform-specific initialization and runs the demo loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_demo {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{KeyboardEvent, MouseEvent};

    use pixel_valley::assets::{DODO_SHEET_URL, PARALLAX_SHEETS, SHEPHERD_FRAME_URLS};
    use pixel_valley::audio::AudioManager;
    use pixel_valley::consts::*;
    use pixel_valley::platform;
    use pixel_valley::renderer::{upload_bitmap, FrameSet, NodeId, NodeKind, Stage, TextStyle};
    use pixel_valley::scene::{
        FlockKind, FlockState, MenuCommand, MenuInput, MenuModel, ParallaxState, Screen, ScreenId,
    };
    use pixel_valley::settings::Settings;
    use pixel_valley::sprite::{generate_frames, BakedCycle, StripCycle, WalkCycle, DODO_SHEET_LAYOUT};

    const PIXEL_FONT: &str = "\"Courier New\", monospace";
    const TITLE_TEXT: &str = "2026";

    const TITLE_SIZE: u32 = 250;
    const ITEM_SIZE: u32 = 60;
    const ITEM_SPACING: f64 = 70.0;
    const ITEM_WEIGHT: &str = "700";
    // Items are left-aligned at a fixed column; the cursor glyph sits in
    // its own column to the left so the text never shifts
    const ITEMS_HALF_OFFSET: f64 = 90.0;
    const CURSOR_GAP: f64 = 36.0;

    mod palette {
        pub const TITLE_FILL: u32 = 0xf5a623;
        pub const TITLE_3D_A: u32 = 0x8b3a00;
        pub const TITLE_3D_B: u32 = 0x5a2200;
        pub const ITEM_NORMAL: u32 = 0xffffff;
        pub const ITEM_HOVER: u32 = 0xf5e642;
        pub const ITEM_SHADOW: u32 = 0x112200;
        pub const CURSOR: u32 = 0xf5e642;
        pub const CURSOR_SHADOW: u32 = 0x5a4a00;
        pub const OVERLAY_BG: u32 = 0x000000;
        pub const BAR_BG: u32 = 0x1a1a2e;
        pub const BAR_BORDER: u32 = 0x444466;
        pub const BAR_ACCENT: u32 = 0x44dd44;
        pub const PERCENT: u32 = 0xffffff;
        pub const TIP: u32 = 0xaaaaaa;
    }

    /// Component lifecycle checked whenever an async completion resumes
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Lifecycle {
        Loading,
        Ready,
        Destroyed,
    }

    /// One flock's scene state plus its sprite nodes, index-aligned
    struct FlockView {
        state: FlockState,
        nodes: Vec<NodeId>,
    }

    /// One menu item's text node and pointer hit box
    struct ItemView {
        text: NodeId,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    }

    struct ScreenView {
        root: NodeId,
        items: Vec<ItemView>,
        cursor: NodeId,
        start_y: f64,
    }

    /// Node handles for an active loading sequence's visual subtree
    struct LoadingView {
        root: NodeId,
        phase1: NodeId,
        bar: NodeId,
        percent: NodeId,
        overlay: NodeId,
        blink: NodeId,
    }

    struct Demo {
        lifecycle: Rc<Cell<Lifecycle>>,
        stage: Stage,
        settings: Settings,
        audio: AudioManager,
        parallax: ParallaxState,
        layer_nodes: Vec<NodeId>,
        flocks: Vec<FlockView>,
        menu: MenuModel,
        screen_views: Vec<ScreenView>,
        loading_view: Option<LoadingView>,
        ui_root: NodeId,
        view_w: f64,
        view_h: f64,
        /// Last item index the pointer hovered, to fire enter-style events
        hovered: Option<usize>,
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Pixel Valley starting...");

        if let Err(err) = init().await {
            log::error!("init failed: {err:?}");
        }
    }

    async fn init() -> Result<(), JsValue> {
        let (view_w, view_h) = platform::window_size()?;
        let (view_w, view_h) = (view_w as f64, view_h as f64);
        let canvas = platform::canvas("canvas")?;
        let mut stage = Stage::new(canvas, view_w, view_h, CLEAR_COLOR)?;

        // Containers in z-order: background, flocks, UI
        let background_root = stage.add(stage.root(), NodeKind::Group);
        let flock_root = stage.add(stage.root(), NodeKind::Group);
        let ui_root = stage.add(stage.root(), NodeKind::Group);

        // "Loading..." indicator while the PNGs fetch
        let boot_text = stage.add(
            stage.root(),
            NodeKind::Text {
                content: "Loading...".into(),
                style: TextStyle {
                    font_px: 22,
                    weight: "400",
                    family: PIXEL_FONT,
                    fill: 0xffffff,
                    stroke: None,
                    shadow: Some((0x000000, 2.0)),
                },
            },
        );
        {
            let node = stage.node_mut(boot_text);
            node.x = view_w / 2.0;
            node.y = view_h / 2.0;
            node.anchor_x = 0.5;
            node.anchor_y = 0.5;
        }
        stage.draw();

        let lifecycle = Rc::new(Cell::new(Lifecycle::Loading));
        setup_unload(lifecycle.clone());

        // Independent assets load in parallel; total time is the slowest
        let (sheets, dodo_sheet, shepherd_frames) = futures::join!(
            futures::future::try_join_all(
                PARALLAX_SHEETS.iter().map(|sheet| platform::load_image(sheet.url))
            ),
            platform::load_image(DODO_SHEET_URL),
            futures::future::try_join_all(
                SHEPHERD_FRAME_URLS.iter().map(|url| platform::load_image(url))
            ),
        );
        let sheets = sheets?;
        let dodo_sheet = dodo_sheet?;
        let shepherd_frames = shepherd_frames?;

        // A late load completion must not touch a torn-down stage
        if lifecycle.get() == Lifecycle::Destroyed {
            return Ok(());
        }

        let settings = Settings::load();
        let mut audio = AudioManager::new();
        audio.apply_settings(&settings);

        let seed = js_sys::Date::now() as u64;
        log::info!("Demo initialized with seed: {seed}");

        // Parallax layers become tiling nodes in manifest order
        let mut parallax = ParallaxState::new(view_w as f32, view_h as f32);
        let dims: Vec<(f32, f32)> = sheets
            .iter()
            .map(|img| (img.natural_width() as f32, img.natural_height() as f32))
            .collect();
        parallax.attach_sources(&dims);
        let layer_nodes: Vec<NodeId> = sheets
            .iter()
            .zip(parallax.layers())
            .map(|(image, layer)| {
                stage.add(
                    background_root,
                    NodeKind::Tiling {
                        image: image.clone(),
                        tile_scale: layer.scale as f64,
                        offset_x: 0.0,
                        w: view_w,
                        h: view_h,
                    },
                )
            })
            .collect();

        let ground_y = (view_h as f32 * GROUND_FRACTION).floor();

        // Horse frames bake procedurally; dodos slice a sheet; the
        // shepherd plays a strip of standalone frames
        let horse_cycle = BakedCycle {
            frames: generate_frames(),
        };
        let horse_canvases = horse_cycle
            .frames
            .iter()
            .map(upload_bitmap)
            .collect::<Result<Vec<_>, _>>()?;
        let dodo_cycle =
            DODO_SHEET_LAYOUT.slice(dodo_sheet.natural_width(), dodo_sheet.natural_height());
        let shepherd_cycle = StripCycle {
            count: shepherd_frames.len(),
            frame_w: shepherd_frames[0].natural_width() as f32,
            frame_h: shepherd_frames[0].natural_height() as f32,
        };

        let mut flocks = Vec::new();
        {
            let (w, h) = horse_cycle.frame_size();
            let state = FlockState::new(
                FlockKind::Horses,
                view_w as f32,
                ground_y,
                w,
                h,
                horse_cycle.frame_count(),
                seed,
            );
            flocks.push(build_flock(&mut stage, flock_root, state, || {
                FrameSet::Baked(horse_canvases.clone())
            }));
        }
        {
            let (w, h) = dodo_cycle.frame_size();
            let state = FlockState::new(
                FlockKind::Dodos,
                view_w as f32,
                ground_y,
                w,
                h,
                dodo_cycle.frame_count(),
                seed.wrapping_add(1),
            );
            flocks.push(build_flock(&mut stage, flock_root, state, || {
                FrameSet::Sheet {
                    image: dodo_sheet.clone(),
                    rects: dodo_cycle.rects.clone(),
                }
            }));
        }
        {
            let (w, h) = shepherd_cycle.frame_size();
            let state = FlockState::new(
                FlockKind::Shepherd,
                view_w as f32,
                ground_y,
                w,
                h,
                shepherd_cycle.frame_count(),
                seed.wrapping_add(2),
            );
            flocks.push(build_flock(&mut stage, flock_root, state, || {
                FrameSet::Strip(shepherd_frames.clone())
            }));
        }

        // Menu model plus one node subtree per screen
        let menu = MenuModel::new(seed.wrapping_add(3), settings.reduced_motion);
        let mut screen_views = Vec::new();
        for screen in menu.screens() {
            let (title_frac, items_frac) = match screen.id {
                ScreenId::Main => (0.22, 0.52),
                ScreenId::Difficulty => (0.18, 0.40),
            };
            screen_views.push(build_screen_view(
                &mut stage, ui_root, screen, view_w, view_h, title_frac, items_frac,
            ));
        }

        // Boot indicator comes down once everything is constructed
        stage.remove(boot_text);

        lifecycle.set(Lifecycle::Ready);
        let demo = Rc::new(RefCell::new(Demo {
            lifecycle,
            stage,
            settings,
            audio,
            parallax,
            layer_nodes,
            flocks,
            menu,
            screen_views,
            loading_view: None,
            ui_root,
            view_w,
            view_h,
            hovered: None,
        }));

        setup_keyboard(demo.clone());
        setup_pointer(demo.clone())?;
        setup_resize(demo.clone());

        start_loop(demo)?;
        log::info!("Pixel Valley running");
        Ok(())
    }

    // === Frame loop ===

    type SharedLoopClosure = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

    fn start_loop(demo: Rc<RefCell<Demo>>) -> Result<(), JsValue> {
        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        let g = f.clone();
        *g.borrow_mut() = Some(Closure::new(move |time: f64| {
            if frame(&demo, time) {
                let handle = f.borrow();
                let _ = platform::request_animation_frame(handle.as_ref().unwrap());
            }
        }));
        platform::request_animation_frame(g.borrow().as_ref().unwrap())?;
        Ok(())
    }

    /// One render tick; returns false once the demo is destroyed
    fn frame(demo: &Rc<RefCell<Demo>>, time: f64) -> bool {
        let mut d = demo.borrow_mut();
        if d.lifecycle.get() == Lifecycle::Destroyed {
            return false;
        }

        // Fixed order: background, flocks, UI
        d.parallax.update(BASE_SCROLL_SPEED);
        for flock in &mut d.flocks {
            flock.state.update();
        }
        d.menu.tick(time);

        d.handle_menu_commands();
        d.sync();
        d.stage.draw();
        true
    }

    impl Demo {
        fn handle_menu_commands(&mut self) {
            for command in self.menu.drain_events() {
                match command {
                    MenuCommand::PlayCue(cue) => self.audio.play(cue),
                    MenuCommand::LoadingStarted(difficulty) => {
                        log::info!("loading sequence started: {}", difficulty.label());
                        let tip = self.menu.loading().map(|seq| seq.tip()).unwrap_or("");
                        self.loading_view = Some(build_loading_view(
                            &mut self.stage,
                            self.ui_root,
                            self.view_w,
                            self.view_h,
                            tip,
                        ));
                    }
                    MenuCommand::LoadingFinished => {
                        if let Some(view) = self.loading_view.take() {
                            self.stage.remove(view.root);
                        }
                        log::info!("loading sequence finished - back to the menu");
                    }
                }
            }
        }

        /// Mirror scene state into the retained node tree
        fn sync(&mut self) {
            for (layer, &node_id) in self.parallax.layers().iter().zip(&self.layer_nodes) {
                if let NodeKind::Tiling { offset_x, .. } = &mut self.stage.node_mut(node_id).kind {
                    *offset_x = layer.offset_x as f64;
                }
            }

            for flock in &self.flocks {
                sync_flock(&mut self.stage, flock);
            }

            self.sync_menu();
            self.sync_loading();
        }

        fn sync_menu(&mut self) {
            let active = self.menu.active();
            for (screen, view) in self.menu.screens().iter().zip(&self.screen_views) {
                {
                    let root = self.stage.node_mut(view.root);
                    root.alpha = screen.alpha;
                    root.visible = screen.visible;
                }
                {
                    let cursor = self.stage.node_mut(view.cursor);
                    cursor.y = view.start_y + screen.cursor as f64 * ITEM_SPACING;
                    cursor.alpha = if screen.id == active && !self.menu.cursor_visible() {
                        0.0
                    } else {
                        1.0
                    };
                }
                for (i, item) in view.items.iter().enumerate() {
                    let fill = if i == screen.cursor {
                        palette::ITEM_HOVER
                    } else {
                        palette::ITEM_NORMAL
                    };
                    if let NodeKind::Text { style, .. } = &mut self.stage.node_mut(item.text).kind {
                        style.fill = fill;
                    }
                }
            }
        }

        fn sync_loading(&mut self) {
            let (Some(seq), Some(view)) = (self.menu.loading(), &self.loading_view) else {
                return;
            };
            self.stage.node_mut(view.phase1).alpha = seq.bar_alpha();
            self.stage.node_mut(view.overlay).alpha = seq.overlay_alpha();
            self.stage.node_mut(view.blink).alpha = seq.blink_alpha();
            if let NodeKind::Bar { progress } = &mut self.stage.node_mut(view.bar).kind {
                *progress = seq.progress();
            }
            if let NodeKind::Text { content, .. } = &mut self.stage.node_mut(view.percent).kind {
                *content = seq.percent_label();
            }
        }

        /// Pointer position against the active screen's item hit boxes
        fn item_under_pointer(&self, x: f64, y: f64) -> Option<usize> {
            let active = self.menu.active();
            let view_index = self
                .menu
                .screens()
                .iter()
                .position(|screen| screen.id == active)?;
            let view = &self.screen_views[view_index];
            view.items.iter().position(|item| {
                x >= item.x
                    && x <= item.x + item.w
                    && y >= item.y - item.h / 2.0
                    && y <= item.y + item.h / 2.0
            })
        }

        fn resize(&mut self) {
            let Ok((w, h)) = platform::window_size() else {
                return;
            };
            let (w, h) = (w as f64, h as f64);
            self.view_w = w;
            self.view_h = h;
            self.stage.resize(w, h);
            self.parallax.resize(w as f32, h as f32);

            for (layer, &node_id) in self.parallax.layers().iter().zip(&self.layer_nodes) {
                if let NodeKind::Tiling {
                    tile_scale,
                    w: node_w,
                    h: node_h,
                    ..
                } = &mut self.stage.node_mut(node_id).kind
                {
                    *tile_scale = layer.scale as f64;
                    *node_w = w;
                    *node_h = h;
                }
            }

            let ground_y = (h as f32 * GROUND_FRACTION).floor();
            for flock in &mut self.flocks {
                flock.state.resize(w as f32, ground_y);
            }
        }
    }

    fn sync_flock(stage: &mut Stage, flock: &FlockView) {
        let kind = flock.state.kind();
        for (member, &node_id) in flock.state.members().iter().zip(&flock.nodes) {
            let frame = flock.state.frame_index(member);
            let node = stage.node_mut(node_id);
            // pos.x is the left edge; the flipped sprite's negated scale
            // and right anchor land its mirrored image on the same edge
            node.x = member.pos.x as f64;
            node.y = member.pos.y as f64;
            node.anchor_x = kind.anchor_x() as f64;
            node.scale_x = if kind.flipped() {
                -(member.scale as f64)
            } else {
                member.scale as f64
            };
            node.scale_y = member.scale as f64;
            if let NodeKind::Sprite { frame: current, .. } = &mut node.kind {
                *current = frame;
            }
        }
    }

    fn build_flock(
        stage: &mut Stage,
        parent: NodeId,
        state: FlockState,
        make_frames: impl Fn() -> FrameSet,
    ) -> FlockView {
        let nodes = state
            .members()
            .iter()
            .map(|_| {
                stage.add(
                    parent,
                    NodeKind::Sprite {
                        frames: make_frames(),
                        frame: 0,
                    },
                )
            })
            .collect();
        FlockView { state, nodes }
    }

    // === Menu node construction ===

    fn text_style(font_px: u32, fill: u32) -> TextStyle {
        TextStyle {
            font_px,
            weight: ITEM_WEIGHT,
            family: PIXEL_FONT,
            fill,
            stroke: None,
            shadow: None,
        }
    }

    fn add_text(
        stage: &mut Stage,
        parent: NodeId,
        content: &str,
        style: TextStyle,
        x: f64,
        y: f64,
        anchor_x: f64,
        anchor_y: f64,
    ) -> NodeId {
        let id = stage.add(
            parent,
            NodeKind::Text {
                content: content.to_string(),
                style,
            },
        );
        let node = stage.node_mut(id);
        node.x = x;
        node.y = y;
        node.anchor_x = anchor_x;
        node.anchor_y = anchor_y;
        id
    }

    /// Extruded title: stacked depth layers, then an outlined face
    fn make_title(
        stage: &mut Stage,
        parent: NodeId,
        text: &str,
        font_px: u32,
        cx: f64,
        cy: f64,
        depth_layers: &[(u32, f64)],
    ) -> NodeId {
        let group = stage.add(parent, NodeKind::Group);
        for &(color, offset) in depth_layers {
            add_text(
                stage,
                group,
                text,
                text_style(font_px, color),
                cx + offset,
                cy + offset,
                0.5,
                0.5,
            );
        }
        let mut outline = text_style(font_px, palette::TITLE_FILL);
        outline.stroke = Some((0x000000, 6.0));
        add_text(stage, group, text, outline, cx, cy, 0.5, 0.5);
        add_text(
            stage,
            group,
            text,
            text_style(font_px, palette::TITLE_FILL),
            cx,
            cy,
            0.5,
            0.5,
        )
    }

    fn build_screen_view(
        stage: &mut Stage,
        ui_root: NodeId,
        screen: &Screen,
        view_w: f64,
        view_h: f64,
        title_frac: f64,
        items_frac: f64,
    ) -> ScreenView {
        let root = stage.add(ui_root, NodeKind::Group);
        {
            let node = stage.node_mut(root);
            node.alpha = screen.alpha;
            node.visible = screen.visible;
        }

        make_title(
            stage,
            root,
            TITLE_TEXT,
            TITLE_SIZE,
            view_w / 2.0,
            view_h * title_frac,
            &[
                (palette::TITLE_3D_B, 6.0),
                (palette::TITLE_3D_B, 5.0),
                (palette::TITLE_3D_A, 4.0),
                (palette::TITLE_3D_A, 3.0),
                (palette::TITLE_3D_A, 2.0),
            ],
        );

        let start_y = view_h * items_frac;
        let items_left = view_w / 2.0 - ITEMS_HALF_OFFSET;
        let cursor_x = items_left - CURSOR_GAP;

        let mut items = Vec::new();
        for (i, item) in screen.items.iter().enumerate() {
            let y = start_y + i as f64 * ITEM_SPACING;

            // Shadow behind, offset down-right
            add_text(
                stage,
                root,
                item.label,
                text_style(ITEM_SIZE, palette::ITEM_SHADOW),
                items_left + 2.0,
                y + 2.0,
                0.0,
                0.5,
            );
            let style = text_style(ITEM_SIZE, palette::ITEM_NORMAL);
            let w = stage.measure_text(item.label, &style);
            let text = add_text(stage, root, item.label, style, items_left, y, 0.0, 0.5);

            items.push(ItemView {
                text,
                x: items_left,
                y,
                w,
                h: ITEM_SIZE as f64,
            });
        }

        let mut cursor_style = text_style(ITEM_SIZE, palette::CURSOR);
        cursor_style.shadow = Some((palette::CURSOR_SHADOW, 2.0));
        let cursor = add_text(stage, root, "\u{25ba}", cursor_style, cursor_x, start_y, 1.0, 0.5);

        ScreenView {
            root,
            items,
            cursor,
            start_y,
        }
    }

    // === Loading sequence nodes ===

    fn add_fill(
        stage: &mut Stage,
        parent: NodeId,
        color: u32,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        alpha: f32,
    ) -> NodeId {
        let id = stage.add(parent, NodeKind::Fill { color, w, h });
        let node = stage.node_mut(id);
        node.x = x;
        node.y = y;
        node.alpha = alpha;
        id
    }

    fn build_loading_view(
        stage: &mut Stage,
        ui_root: NodeId,
        view_w: f64,
        view_h: f64,
        tip: &str,
    ) -> LoadingView {
        use pixel_valley::scene::loading::{BAR_H, BAR_W};

        let root = stage.add(ui_root, NodeKind::Group);

        // Phase 1: dark overlay, extruded headline, framed segmented bar
        let phase1 = stage.add(root, NodeKind::Group);
        stage.node_mut(phase1).alpha = 0.0;
        add_fill(stage, phase1, palette::OVERLAY_BG, 0.0, 0.0, view_w, view_h, 0.85);

        make_title(
            stage,
            phase1,
            "LOADING THE VALLEY...",
            36,
            view_w / 2.0,
            view_h * 0.35,
            &[
                (palette::TITLE_3D_B, 5.0),
                (palette::TITLE_3D_B, 4.0),
                (palette::TITLE_3D_A, 3.0),
                (palette::TITLE_3D_A, 2.0),
            ],
        );

        let bar_w = BAR_W as f64;
        let bar_h = BAR_H as f64;
        let bar_x = view_w / 2.0 - bar_w / 2.0;
        let bar_y = view_h * 0.55;

        // Drop shadow, border, well, and four corner accents
        add_fill(stage, phase1, 0x000000, bar_x + 4.0, bar_y + 4.0, bar_w, bar_h + 6.0, 0.5);
        add_fill(
            stage,
            phase1,
            palette::BAR_BORDER,
            bar_x - 3.0,
            bar_y - 3.0,
            bar_w + 6.0,
            bar_h + 6.0,
            1.0,
        );
        add_fill(stage, phase1, palette::BAR_BG, bar_x, bar_y, bar_w, bar_h, 1.0);
        for (cx, cy) in [
            (bar_x - 3.0, bar_y - 3.0),
            (bar_x + bar_w - 1.0, bar_y - 3.0),
            (bar_x - 3.0, bar_y + bar_h - 1.0),
            (bar_x + bar_w - 1.0, bar_y + bar_h - 1.0),
        ] {
            add_fill(stage, phase1, palette::BAR_ACCENT, cx, cy, 6.0, 6.0, 1.0);
        }

        let bar = stage.add(phase1, NodeKind::Bar { progress: 0.0 });
        {
            let node = stage.node_mut(bar);
            node.x = bar_x;
            node.y = bar_y;
        }

        let percent = add_text(
            stage,
            phase1,
            "0%",
            text_style(14, palette::PERCENT),
            view_w / 2.0,
            bar_y + bar_h + 12.0,
            0.5,
            0.0,
        );
        add_text(
            stage,
            phase1,
            &format!("TIP: {tip}"),
            text_style(12, palette::TIP),
            view_w / 2.0,
            bar_y + bar_h + 44.0,
            0.5,
            0.0,
        );

        // Phase 2: full black overlay with the blinking extruded title
        let overlay = stage.add(root, NodeKind::Group);
        stage.node_mut(overlay).alpha = 0.0;
        add_fill(stage, overlay, palette::OVERLAY_BG, 0.0, 0.0, view_w, view_h, 1.0);
        let cx = view_w / 2.0;
        let cy = view_h / 2.0;
        for &(color, offset) in &[
            (palette::TITLE_3D_B, 8.0),
            (palette::TITLE_3D_B, 6.0),
            (palette::TITLE_3D_A, 4.0),
            (palette::TITLE_3D_A, 2.0),
        ] {
            add_text(
                stage,
                overlay,
                TITLE_TEXT,
                text_style(150, color),
                cx + offset,
                cy + offset,
                0.5,
                0.5,
            );
        }
        let mut outline = text_style(150, palette::TITLE_FILL);
        outline.stroke = Some((0x000000, 8.0));
        add_text(stage, overlay, TITLE_TEXT, outline, cx, cy, 0.5, 0.5);
        let blink = add_text(
            stage,
            overlay,
            TITLE_TEXT,
            text_style(150, palette::TITLE_FILL),
            cx,
            cy,
            0.5,
            0.5,
        );

        LoadingView {
            root,
            phase1,
            bar,
            percent,
            overlay,
            blink,
        }
    }

    // === Input listeners ===

    fn setup_keyboard(demo: Rc<RefCell<Demo>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let input = match event.key().as_str() {
                "ArrowDown" | "s" | "S" => MenuInput::Down,
                "ArrowUp" | "w" | "W" => MenuInput::Up,
                "Enter" | " " => MenuInput::Select,
                "m" | "M" => {
                    let mut d = demo.borrow_mut();
                    d.settings.audio_enabled = !d.settings.audio_enabled;
                    let settings = d.settings.clone();
                    d.audio.apply_settings(&settings);
                    settings.save();
                    log::info!("audio enabled: {}", settings.audio_enabled);
                    return;
                }
                _ => return,
            };
            let mut d = demo.borrow_mut();
            // Keystroke doubles as the user gesture audio needs
            d.audio.resume();
            d.menu.handle_input(input, platform::now_ms());
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_pointer(demo: Rc<RefCell<Demo>>) -> Result<(), JsValue> {
        let canvas = platform::canvas("canvas")?;

        // Hover: enter-style events as the pointer crosses item boxes
        {
            let demo = demo.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut d = demo.borrow_mut();
                let hit = d.item_under_pointer(event.offset_x() as f64, event.offset_y() as f64);
                if hit != d.hovered {
                    d.hovered = hit;
                    if let Some(i) = hit {
                        d.menu.handle_input(MenuInput::Hover(i), platform::now_ms());
                    }
                }
            });
            let _ =
                canvas.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Release activates the item under the pointer
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut d = demo.borrow_mut();
                d.audio.resume();
                if let Some(i) =
                    d.item_under_pointer(event.offset_x() as f64, event.offset_y() as f64)
                {
                    d.menu.handle_input(MenuInput::Release(i), platform::now_ms());
                }
            });
            let _ =
                canvas.add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        Ok(())
    }

    fn setup_resize(demo: Rc<RefCell<Demo>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            demo.borrow_mut().resize();
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_unload(lifecycle: Rc<Cell<Lifecycle>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            lifecycle.set(Lifecycle::Destroyed);
            log::info!("page hidden - demo torn down");
        });
        let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_demo::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Pixel Valley (native) starting...");
    log::info!("Rendering needs a browser - build with trunk for the web version");

    // Drive the pure scene through a full menu/loading round trip
    println!("\nRunning headless scene drive...");
    headless_scene_drive();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn headless_scene_drive() {
    use pixel_valley::consts::BASE_SCROLL_SPEED;
    use pixel_valley::scene::{FlockKind, FlockState, MenuInput, MenuModel, ParallaxState};

    const FRAME_MS: f64 = 1000.0 / 60.0;

    let mut parallax = ParallaxState::new(1280.0, 720.0);
    parallax.attach_sources(&[(576.0, 324.0); 5]);
    let mut horses = FlockState::new(FlockKind::Horses, 1280.0, 612.0, 88.0, 56.0, 8, 42);

    let mut menu = MenuModel::new(42, false);
    let mut now = 0.0;

    // Main -> difficulty, then pick the first difficulty
    menu.handle_input(MenuInput::Select, now);
    for _ in 0..60 {
        now += FRAME_MS;
        parallax.update(BASE_SCROLL_SPEED);
        horses.update();
        menu.tick(now);
    }
    menu.handle_input(MenuInput::Select, now);
    assert!(menu.loading().is_some(), "loading sequence should be active");

    let mut frames = 0;
    while menu.loading().is_some() {
        now += FRAME_MS;
        parallax.update(BASE_SCROLL_SPEED);
        horses.update();
        menu.tick(now);
        frames += 1;
        assert!(frames < 2000, "loading sequence never completed");
    }
    menu.drain_events();

    println!("[ok] loading sequence completed after {frames} frames");
    println!("[ok] parallax foreground offset: {:.1}", parallax.layers()[4].offset_x);
    println!("[ok] headless scene drive passed");
}
