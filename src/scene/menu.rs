//! Menu state machine
//!
//! Two screens (main, difficulty) with a clamped cursor, a single-slot
//! fade tween, and a blink counter. Picking a difficulty suspends the
//! menu and hands the screen to a `LoadingSequence`, which the menu owns
//! until it reports done.
//!
//! Input while a tween runs or a loading sequence is active is dropped -
//! never queued, never preempting. A rapid double-click during a fade
//! activates nothing.
//!
//! The model emits `MenuCommand`s (cues to play, loading lifecycle
//! edges) that the shell drains once per frame; it never calls out.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::loading::LoadingSequence;
use crate::ease_in_out_quad;

const FADE_OUT_TICKS: u32 = 14;
const FADE_IN_TICKS: u32 = 20;
const FADE_ALL_OUT_TICKS: u32 = 30;
/// Cursor glyph visibility toggles every this many ticks
const BLINK_INTERVAL_TICKS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenId {
    Main,
    Difficulty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
    Insane,
}

impl Difficulty {
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Normal => "NORMAL",
            Difficulty::Hard => "HARD",
            Difficulty::Insane => "INSANE",
        }
    }
}

/// Audio cues the shell is asked to play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Hover,
    Click,
    MenuOpen,
    MenuBack,
}

/// What activating an item does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemAction {
    GoTo(ScreenId),
    StartLoading(Difficulty),
    /// Fade every screen out and go quiet (the demo keeps scrolling)
    FadeOutAll,
}

#[derive(Debug, Clone, Copy)]
pub struct MenuItem {
    pub label: &'static str,
    pub action: ItemAction,
    /// Cue played when this item activates
    pub cue: Cue,
}

/// One menu screen and its presentation state
#[derive(Debug, Clone)]
pub struct Screen {
    pub id: ScreenId,
    pub items: Vec<MenuItem>,
    pub cursor: usize,
    pub alpha: f32,
    pub visible: bool,
}

/// Events for the shell, drained once per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    PlayCue(Cue),
    LoadingStarted(Difficulty),
    LoadingFinished,
}

/// Input events fed in by the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuInput {
    Up,
    Down,
    Select,
    /// Pointer moved over item `i` of the active screen
    Hover(usize),
    /// Pointer released over item `i` of the active screen
    Release(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FadeDir {
    In,
    Out,
}

/// What happens when a fade lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AfterFade {
    Show(ScreenId),
    Hide,
    Nothing,
}

/// Single-slot tween; a new transition is refused while one runs
#[derive(Debug, Clone, Copy)]
enum Tween {
    Idle,
    Running {
        screen: ScreenId,
        dir: FadeDir,
        duration: u32,
        elapsed: u32,
        then: AfterFade,
    },
}

#[derive(Debug)]
pub struct MenuModel {
    screens: Vec<Screen>,
    active: ScreenId,
    tween: Tween,
    blink_timer: u32,
    cursor_visible: bool,
    loading: Option<LoadingSequence>,
    rng: Pcg32,
    events: Vec<MenuCommand>,
    reduced_motion: bool,
}

impl MenuModel {
    pub fn new(seed: u64, reduced_motion: bool) -> Self {
        let mut model = Self {
            screens: vec![build_main(), build_difficulty()],
            active: ScreenId::Main,
            tween: Tween::Idle,
            blink_timer: 0,
            cursor_visible: true,
            loading: None,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            reduced_motion,
        };
        model.show(ScreenId::Main, false);
        model
    }

    pub fn screens(&self) -> &[Screen] {
        &self.screens
    }

    pub fn screen(&self, id: ScreenId) -> &Screen {
        &self.screens[screen_index(id)]
    }

    fn screen_mut(&mut self, id: ScreenId) -> &mut Screen {
        &mut self.screens[screen_index(id)]
    }

    pub fn active(&self) -> ScreenId {
        self.active
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    pub fn loading(&self) -> Option<&LoadingSequence> {
        self.loading.as_ref()
    }

    /// Hand the queued commands to the shell
    pub fn drain_events(&mut self) -> Vec<MenuCommand> {
        std::mem::take(&mut self.events)
    }

    /// Feed one input event; dropped while busy (loading active, tween
    /// running, or every screen hidden)
    pub fn handle_input(&mut self, input: MenuInput, now_ms: f64) {
        if self.loading.is_some() || !matches!(self.tween, Tween::Idle) {
            return;
        }
        if !self.screen(self.active).visible {
            return;
        }

        let cursor = self.screen(self.active).cursor;
        match input {
            MenuInput::Up => self.move_cursor(cursor.saturating_sub(1)),
            MenuInput::Down => self.move_cursor(cursor + 1),
            MenuInput::Hover(i) => self.move_cursor(i),
            MenuInput::Select => self.activate(cursor, now_ms),
            MenuInput::Release(i) => {
                self.move_cursor(i);
                self.activate(i, now_ms);
            }
        }
    }

    /// Move the cursor, clamped to the item list - no wraparound
    fn move_cursor(&mut self, index: usize) {
        let screen = self.screen_mut(self.active);
        screen.cursor = index.min(screen.items.len() - 1);
        self.cursor_visible = true;
        self.events.push(MenuCommand::PlayCue(Cue::Hover));
    }

    fn activate(&mut self, index: usize, now_ms: f64) {
        let item = self.screen(self.active).items[index];
        self.events.push(MenuCommand::PlayCue(item.cue));

        match item.action {
            ItemAction::GoTo(next) => {
                self.start_fade(self.active, FadeDir::Out, FADE_OUT_TICKS, AfterFade::Show(next));
            }
            ItemAction::StartLoading(difficulty) => {
                // Hide everything immediately; the sequence owns the screen
                for screen in &mut self.screens {
                    screen.visible = false;
                }
                log::info!("starting: {}", difficulty.label());
                self.loading = Some(LoadingSequence::new(now_ms, &mut self.rng));
                self.events.push(MenuCommand::LoadingStarted(difficulty));
            }
            ItemAction::FadeOutAll => {
                self.start_fade(
                    self.active,
                    FadeDir::Out,
                    FADE_ALL_OUT_TICKS,
                    AfterFade::Hide,
                );
            }
        }
    }

    fn start_fade(&mut self, screen: ScreenId, dir: FadeDir, duration: u32, then: AfterFade) {
        if self.reduced_motion {
            self.finish_fade(screen, dir, then);
            return;
        }
        self.tween = Tween::Running {
            screen,
            dir,
            duration,
            elapsed: 0,
            then,
        };
    }

    fn finish_fade(&mut self, screen: ScreenId, dir: FadeDir, then: AfterFade) {
        {
            let s = self.screen_mut(screen);
            match dir {
                FadeDir::In => s.alpha = 1.0,
                FadeDir::Out => {
                    s.alpha = 0.0;
                    s.visible = false;
                }
            }
        }
        self.tween = Tween::Idle;
        match then {
            AfterFade::Show(next) => self.show(next, true),
            AfterFade::Hide | AfterFade::Nothing => {}
        }
    }

    /// Make a screen the active one, cursor reset to the top
    fn show(&mut self, id: ScreenId, animated: bool) {
        {
            let screen = self.screen_mut(id);
            screen.visible = true;
            screen.cursor = 0;
        }
        self.active = id;
        self.cursor_visible = true;
        self.events.push(MenuCommand::PlayCue(Cue::Hover));

        if animated && !self.reduced_motion {
            self.screen_mut(id).alpha = 0.0;
            self.start_fade(id, FadeDir::In, FADE_IN_TICKS, AfterFade::Nothing);
        } else {
            self.screen_mut(id).alpha = 1.0;
        }
    }

    /// Advance one render tick: loading sequence, cursor blink, fade tween
    pub fn tick(&mut self, now_ms: f64) {
        if let Some(seq) = &mut self.loading {
            seq.update_clock(now_ms);
            seq.tick();
            if seq.is_done() {
                self.loading = None;
                self.events.push(MenuCommand::LoadingFinished);
                self.show(ScreenId::Main, true);
            }
        } else {
            // Cursor blink pauses while a loading sequence owns the screen
            self.blink_timer += 1;
            if self.blink_timer % BLINK_INTERVAL_TICKS == 0 {
                self.cursor_visible = !self.cursor_visible;
            }
        }

        if let Tween::Running {
            screen,
            dir,
            duration,
            elapsed,
            then,
        } = self.tween
        {
            let elapsed = elapsed + 1;
            let p = (elapsed as f32 / duration as f32).min(1.0);
            let eased = ease_in_out_quad(p);
            self.screen_mut(screen).alpha = match dir {
                FadeDir::In => eased,
                FadeDir::Out => 1.0 - eased,
            };
            if p >= 1.0 {
                self.finish_fade(screen, dir, then);
            } else {
                self.tween = Tween::Running {
                    screen,
                    dir,
                    duration,
                    elapsed,
                    then,
                };
            }
        }
    }
}

fn screen_index(id: ScreenId) -> usize {
    match id {
        ScreenId::Main => 0,
        ScreenId::Difficulty => 1,
    }
}

fn build_main() -> Screen {
    Screen {
        id: ScreenId::Main,
        items: vec![
            MenuItem {
                label: "START",
                action: ItemAction::GoTo(ScreenId::Difficulty),
                cue: Cue::MenuOpen,
            },
            MenuItem {
                label: "EXIT",
                action: ItemAction::FadeOutAll,
                cue: Cue::Click,
            },
        ],
        cursor: 0,
        alpha: 0.0,
        visible: false,
    }
}

fn build_difficulty() -> Screen {
    let difficulty_item = |d: Difficulty| MenuItem {
        label: d.label(),
        action: ItemAction::StartLoading(d),
        cue: Cue::Click,
    };
    Screen {
        id: ScreenId::Difficulty,
        items: vec![
            difficulty_item(Difficulty::Easy),
            difficulty_item(Difficulty::Normal),
            difficulty_item(Difficulty::Hard),
            difficulty_item(Difficulty::Insane),
            MenuItem {
                label: "< BACK",
                action: ItemAction::GoTo(ScreenId::Main),
                cue: Cue::MenuBack,
            },
        ],
        cursor: 0,
        alpha: 0.0,
        visible: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> MenuModel {
        let mut m = MenuModel::new(11, false);
        m.drain_events();
        m
    }

    #[test]
    fn test_starts_on_main_fully_visible() {
        let m = MenuModel::new(1, false);
        assert_eq!(m.active(), ScreenId::Main);
        let main = m.screen(ScreenId::Main);
        assert!(main.visible);
        assert_eq!(main.alpha, 1.0);
        assert_eq!(main.cursor, 0);
        assert!(!m.screen(ScreenId::Difficulty).visible);
    }

    #[test]
    fn test_cursor_clamps_at_both_ends() {
        let mut m = model();
        m.handle_input(MenuInput::Up, 0.0);
        assert_eq!(m.screen(ScreenId::Main).cursor, 0);
        for _ in 0..10 {
            m.handle_input(MenuInput::Down, 0.0);
        }
        let len = m.screen(ScreenId::Main).items.len();
        assert_eq!(m.screen(ScreenId::Main).cursor, len - 1);
        m.handle_input(MenuInput::Up, 0.0);
        assert_eq!(m.screen(ScreenId::Main).cursor, len - 2);
    }

    #[test]
    fn test_transition_switches_only_after_fade_out_completes() {
        let mut m = model();
        m.handle_input(MenuInput::Select, 0.0); // START -> difficulty

        // Fade-out running: main still active, difficulty still hidden
        for _ in 0..FADE_OUT_TICKS - 1 {
            m.tick(0.0);
            assert_eq!(m.active(), ScreenId::Main);
            assert!(!m.screen(ScreenId::Difficulty).visible);
        }

        // The completing tick flips the screens atomically
        m.tick(0.0);
        assert_eq!(m.active(), ScreenId::Difficulty);
        assert!(!m.screen(ScreenId::Main).visible);
        let difficulty = m.screen(ScreenId::Difficulty);
        assert!(difficulty.visible);
        assert_eq!(difficulty.cursor, 0);

        // Fade-in then runs to full alpha
        for _ in 0..FADE_IN_TICKS {
            m.tick(0.0);
        }
        assert_eq!(m.screen(ScreenId::Difficulty).alpha, 1.0);
    }

    #[test]
    fn test_input_ignored_while_fading() {
        let mut m = model();
        m.handle_input(MenuInput::Select, 0.0);
        m.drain_events();

        // Second select mid-fade is dropped: no cue, no queued transition
        m.tick(0.0);
        m.handle_input(MenuInput::Select, 0.0);
        assert!(m.drain_events().is_empty());

        for _ in 0..FADE_OUT_TICKS + FADE_IN_TICKS + 5 {
            m.tick(0.0);
        }
        assert_eq!(m.active(), ScreenId::Difficulty);
    }

    #[test]
    fn test_back_returns_to_main() {
        let mut m = model();
        m.handle_input(MenuInput::Select, 0.0);
        for _ in 0..FADE_OUT_TICKS + FADE_IN_TICKS {
            m.tick(0.0);
        }
        // Cursor to "< BACK" and activate
        m.handle_input(MenuInput::Hover(4), 0.0);
        m.handle_input(MenuInput::Select, 0.0);
        for _ in 0..FADE_OUT_TICKS + FADE_IN_TICKS {
            m.tick(0.0);
        }
        assert_eq!(m.active(), ScreenId::Main);
        assert_eq!(m.screen(ScreenId::Main).cursor, 0);
    }

    #[test]
    fn test_difficulty_selection_starts_loading_and_suspends_input() {
        let mut m = model();
        m.handle_input(MenuInput::Select, 0.0);
        for _ in 0..FADE_OUT_TICKS + FADE_IN_TICKS {
            m.tick(0.0);
        }
        m.drain_events();

        m.handle_input(MenuInput::Select, 100.0); // EASY
        let events = m.drain_events();
        assert!(events.contains(&MenuCommand::LoadingStarted(Difficulty::Easy)));
        assert!(m.loading().is_some());
        assert!(!m.screen(ScreenId::Main).visible);
        assert!(!m.screen(ScreenId::Difficulty).visible);

        // All input is dropped while the sequence runs
        m.handle_input(MenuInput::Down, 100.0);
        m.handle_input(MenuInput::Select, 100.0);
        assert!(m.drain_events().is_empty());
    }

    #[test]
    fn test_loading_completion_returns_to_main() {
        let mut m = model();
        m.handle_input(MenuInput::Select, 0.0);
        for _ in 0..FADE_OUT_TICKS + FADE_IN_TICKS {
            m.tick(0.0);
        }
        m.handle_input(MenuInput::Select, 0.0);
        m.drain_events();

        let mut now = 0.0;
        let mut frames = 0;
        let mut finished = false;
        while !finished {
            now += 1000.0 / 60.0;
            m.tick(now);
            finished = m
                .drain_events()
                .contains(&MenuCommand::LoadingFinished);
            frames += 1;
            assert!(frames < 2000, "loading never completed");
        }
        assert!(m.loading().is_none());
        assert_eq!(m.active(), ScreenId::Main);
        assert!(m.screen(ScreenId::Main).visible);
        assert_eq!(m.screen(ScreenId::Main).cursor, 0);
    }

    #[test]
    fn test_cursor_blinks_only_when_idle() {
        let mut m = model();
        assert!(m.cursor_visible());
        for _ in 0..BLINK_INTERVAL_TICKS {
            m.tick(0.0);
        }
        assert!(!m.cursor_visible());
        for _ in 0..BLINK_INTERVAL_TICKS {
            m.tick(0.0);
        }
        assert!(m.cursor_visible());

        // While loading, the blink freezes
        m.handle_input(MenuInput::Select, 0.0);
        for _ in 0..FADE_OUT_TICKS + FADE_IN_TICKS {
            m.tick(0.0);
        }
        m.handle_input(MenuInput::Select, 0.0);
        let before = m.cursor_visible();
        for _ in 0..BLINK_INTERVAL_TICKS * 2 {
            m.tick(1.0);
        }
        assert_eq!(m.cursor_visible(), before);
    }

    #[test]
    fn test_exit_fades_everything_out_and_goes_quiet() {
        let mut m = model();
        m.handle_input(MenuInput::Down, 0.0);
        m.handle_input(MenuInput::Select, 0.0); // EXIT
        for _ in 0..FADE_ALL_OUT_TICKS {
            m.tick(0.0);
        }
        assert!(!m.screen(ScreenId::Main).visible);
        m.drain_events();
        m.handle_input(MenuInput::Select, 0.0);
        assert!(m.drain_events().is_empty());
    }

    #[test]
    fn test_reduced_motion_transitions_instantly() {
        let mut m = MenuModel::new(5, true);
        m.drain_events();
        m.handle_input(MenuInput::Select, 0.0);
        assert_eq!(m.active(), ScreenId::Difficulty);
        assert_eq!(m.screen(ScreenId::Difficulty).alpha, 1.0);
        assert!(!m.screen(ScreenId::Main).visible);
    }

    #[test]
    fn test_hover_and_release_activate_items() {
        let mut m = model();
        m.handle_input(MenuInput::Hover(1), 0.0);
        assert_eq!(m.screen(ScreenId::Main).cursor, 1);
        let events = m.drain_events();
        assert!(events.contains(&MenuCommand::PlayCue(Cue::Hover)));

        m.handle_input(MenuInput::Release(0), 0.0);
        let events = m.drain_events();
        assert!(events.contains(&MenuCommand::PlayCue(Cue::MenuOpen)));
    }
}
