use crate::config::{ALPHA_MAX, HEIGHT, HELP_OVERLAY_ALPHA, SCREEN_FADE_STEP, WIDTH};
use crate::core::input::{Button, Key, TickInput};
use crate::core::language::Text;
use crate::core::render::{alpha, Image, Renderer, BLACK, WHITE};
use crate::screens::fade::Fade;
use crate::screens::{GameData, Screen, ScreenAction, SessionContext};
use log::info;

pub const OPTION_COUNT: usize = 4;
const OPTION_X: f32 = WIDTH as f32 * 0.75;
const OPTION_HALF_WIDTH: f32 = 150.0;
const OPTION_TOP: f32 = 150.0;
const OPTION_SPACING: f32 = 100.0;
const OPTION_HEIGHT: f32 = 70.0;

/// Entries top to bottom; the cursor is 1-based, 0 when nothing is highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    Start = 1,
    Help = 2,
    Exit = 3,
    Language = 4,
}

impl MenuOption {
    pub fn from_cursor(cursor: usize) -> Option<Self> {
        match cursor {
            1 => Some(MenuOption::Start),
            2 => Some(MenuOption::Help),
            3 => Some(MenuOption::Exit),
            4 => Some(MenuOption::Language),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Normal,
    /// Start chosen; fading out toward song select.
    Starting,
    HelpOverlay,
    ConfirmExit,
}

/* ----------------------------- state ----------------------------- */

pub struct State {
    fade: Fade,
    cursor: usize,
    phase: Phase,
    /// Backdrop slide-in after coming back from song select.
    backdrop: i32,
}

/// Coming back from song select leaves every entry unhighlighted.
pub fn init(from_song_select: bool) -> State {
    State {
        fade: Fade::hidden(SCREEN_FADE_STEP),
        cursor: if from_song_select { 0 } else { MenuOption::Start as usize },
        phase: Phase::Normal,
        backdrop: if from_song_select { ALPHA_MAX } else { 0 },
    }
}

impl State {
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn alpha(&self) -> i32 {
        self.fade.alpha()
    }

    pub fn backdrop(&self) -> i32 {
        self.backdrop
    }
}

/// Option row under the pointer, if any.
fn option_at(cursor: (f32, f32)) -> Option<usize> {
    let (x, y) = cursor;
    if x <= OPTION_X - OPTION_HALF_WIDTH || x >= OPTION_X + OPTION_HALF_WIDTH {
        return None;
    }
    (0..OPTION_COUNT)
        .find(|&i| {
            let top = OPTION_TOP + i as f32 * OPTION_SPACING;
            top < y && y < top + OPTION_HEIGHT
        })
        .map(|i| i + 1)
}

/* -------------------------- input -> nav ------------------------- */

fn handle_input(state: &mut State, input: &TickInput, data: &mut GameData) {
    if input.cursor_moved {
        if let Some(row) = option_at(input.cursor) {
            state.cursor = row;
        }
    }

    if (input.pressed(Key::Up) || input.clicked(Button::WheelUp)) && state.cursor > 1 {
        state.cursor -= 1;
    } else if (input.pressed(Key::Down) || input.clicked(Button::WheelDown)) && state.cursor < OPTION_COUNT {
        state.cursor += 1;
    }

    if input.primary_click() || input.pressed(Key::Enter) || input.pressed(Key::Right) {
        match MenuOption::from_cursor(state.cursor) {
            Some(MenuOption::Start) => state.phase = Phase::Starting,
            Some(MenuOption::Help) => {
                state.fade.set_alpha(HELP_OVERLAY_ALPHA);
                state.phase = Phase::HelpOverlay;
            }
            Some(MenuOption::Exit) => {
                info!("Exit requested from main menu.");
                state.phase = Phase::ConfirmExit;
            }
            Some(MenuOption::Language) => data.language.cycle(),
            None => {}
        }
    }
}

/* ---------------------------- update ----------------------------- */

pub fn update(
    state: &mut State,
    input: &TickInput,
    ctx: &mut SessionContext<'_>,
    data: &mut GameData,
) -> ScreenAction {
    match state.phase {
        Phase::Normal => {
            if !state.fade.is_opaque() {
                state.fade.fade_in();
                state.backdrop = (state.backdrop - SCREEN_FADE_STEP).max(0);
            } else {
                handle_input(state, input, data);
            }
            ScreenAction::None
        }
        Phase::Starting => {
            if state.fade.fade_out() {
                data.cue_selected_song(ctx);
                ScreenAction::Navigate(Screen::SongSelect)
            } else {
                ScreenAction::None
            }
        }
        Phase::HelpOverlay => {
            if input.key.is_some() || input.primary_click() {
                state.phase = Phase::Normal;
            }
            ScreenAction::None
        }
        Phase::ConfirmExit => {
            if state.fade.fade_out() { ScreenAction::Exit } else { ScreenAction::None }
        }
    }
}

/* ---------------------------- drawing ---------------------------- */

pub fn draw(state: &State, renderer: &mut dyn Renderer, data: &GameData) {
    let a = alpha(state.fade.alpha());
    let backdrop = Image::LogoBack { size: 600 };
    match state.phase {
        Phase::Normal => {
            let x = -(state.backdrop as f32) / 10.0;
            renderer.draw_sprite((x, 0.0), backdrop, ALPHA_MAX as u8, 0.0);
        }
        Phase::HelpOverlay => renderer.draw_sprite((0.0, 0.0), backdrop, a, 0.0),
        Phase::Starting | Phase::ConfirmExit => {
            let x = ((state.fade.alpha() - ALPHA_MAX) / 10) as f32;
            renderer.draw_sprite((x, 0.0), backdrop, a, 0.0);
        }
    }

    let lang = &data.language;
    if state.phase == Phase::HelpOverlay {
        let w = WIDTH as f32;
        let h = HEIGHT as f32;
        renderer.draw_sprite((30.0, 30.0), Image::HelpPanel, ALPHA_MAX as u8, 0.0);
        let title = format!("- {} -", lang.text(Text::HelpTitle));
        renderer.draw_text(&title, 72, BLACK, (w / 2.0, h / 4.0), ALPHA_MAX as u8, false);
        for (i, line) in [Text::HelpLine1, Text::HelpLine2, Text::HelpLine3].into_iter().enumerate() {
            let y = h / 3.0 + 100.0 + i as f32 * 70.0;
            renderer.draw_text(lang.text(line), 32, BLACK, (w / 2.0, y), ALPHA_MAX as u8, false);
        }
        return;
    }

    let rows = [(Text::Start, 72), (Text::Help, 72), (Text::Exit, 72), (Text::LanguageName, 48)];
    for (i, (text, size)) in rows.into_iter().enumerate() {
        let y = OPTION_TOP + i as f32 * OPTION_SPACING;
        let selected = state.cursor == i + 1;
        renderer.draw_text(lang.text(text), size, WHITE, (OPTION_X, y), a, selected);
    }
}
