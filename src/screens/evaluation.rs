use crate::config::{ALPHA_MAX, HEIGHT, MUSIC_FADE_MS, PACING_DELAY_MS, SCREEN_FADE_STEP, WIDTH};
use crate::core::input::{Button, Key, TickInput};
use crate::core::language::Text;
use crate::core::render::{alpha, Image, Renderer, BLUE, RED, WHITE};
use crate::screens::fade::{Fade, PacingTimer};
use crate::screens::{GameData, Screen, ScreenAction, SessionContext};
use log::info;

const W: f32 = WIDTH as f32;
const H: f32 = HEIGHT as f32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    ChangeSong,
    Retry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Summary,
    Leaving(Choice),
    /// Retry chosen and faded out; waiting for the music fade before replaying.
    Retrying,
}

/* ----------------------------- state ----------------------------- */

pub struct State {
    fade: Fade,
    phase: Phase,
    highlighted: Option<Choice>,
    pacing: PacingTimer,
    score: u32,
    perfect: Option<u32>,
}

pub fn init(score: u32, perfect: Option<u32>) -> State {
    State {
        fade: Fade::hidden(SCREEN_FADE_STEP),
        phase: Phase::Summary,
        highlighted: None,
        pacing: PacingTimer::new(),
        score,
        perfect,
    }
}

impl State {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn highlighted(&self) -> Option<Choice> {
        self.highlighted
    }

    pub fn score(&self) -> u32 {
        self.score
    }
}

fn choice_at((x, y): (f32, f32)) -> Option<Choice> {
    if !((H / 2.0 + 110.0) < y && y < (H / 2.0 + 170.0)) {
        return None;
    }
    if (W / 2.0 - 160.0) < x && x < (W / 2.0 - 40.0) {
        Some(Choice::ChangeSong)
    } else if (W / 2.0 + 40.0) < x && x < (W / 2.0 + 160.0) {
        Some(Choice::Retry)
    } else {
        None
    }
}

/* -------------------------- input -> nav ------------------------- */

fn handle_input(state: &mut State, input: &TickInput) {
    if input.cursor_moved {
        if let Some(choice) = choice_at(input.cursor) {
            state.highlighted = Some(choice);
        }
    }

    if input.primary_click() || input.pressed(Key::Enter) {
        if let Some(choice) = state.highlighted {
            info!("Results: {:?} chosen.", choice);
            state.phase = Phase::Leaving(choice);
        }
    } else if input.pressed(Key::Left) || input.clicked(Button::WheelUp) {
        state.highlighted = Some(Choice::ChangeSong);
    } else if input.pressed(Key::Right) || input.clicked(Button::WheelDown) {
        state.highlighted = Some(Choice::Retry);
    }
}

/* ---------------------------- update ----------------------------- */

pub fn update(state: &mut State, input: &TickInput, ctx: &mut SessionContext<'_>) -> ScreenAction {
    match state.phase {
        Phase::Summary => {
            if state.fade.is_opaque() {
                handle_input(state, input);
            } else {
                state.fade.fade_in();
            }
            ScreenAction::None
        }
        Phase::Leaving(choice) => {
            if !state.fade.fade_out() {
                return ScreenAction::None;
            }
            match choice {
                Choice::ChangeSong => ScreenAction::Navigate(Screen::SongSelect),
                Choice::Retry => {
                    ctx.audio.fade_out(MUSIC_FADE_MS);
                    state.pacing.arm(ctx.now_ms(), PACING_DELAY_MS);
                    state.phase = Phase::Retrying;
                    ScreenAction::None
                }
            }
        }
        Phase::Retrying => {
            if state.pacing.is_done(ctx.now_ms()) {
                ctx.audio.play(false);
                ScreenAction::Navigate(Screen::Gameplay)
            } else {
                ScreenAction::None
            }
        }
    }
}

/* ---------------------------- drawing ---------------------------- */

pub fn draw(state: &State, renderer: &mut dyn Renderer, data: &GameData) {
    let a = alpha(state.fade.alpha());
    let opaque = ALPHA_MAX as u8;
    let lang = &data.language;

    renderer.draw_sprite((0.0, 0.0), Image::Background, opaque, 0.0);
    let center = (W / 2.0, H / 2.0);
    for (radius, color) in [(HEIGHT / 2 - 30, BLUE), (HEIGHT / 2, WHITE), (HEIGHT / 2 + 30, RED)] {
        renderer.draw_sprite(center, Image::Ring { radius, color }, opaque, 0.0);
    }

    let perfect = state.perfect.map_or_else(|| "-".to_string(), |p| p.to_string());
    let perfect_line = format!("{} : {}", lang.text(Text::PerfectScore), perfect);
    let score_line = format!("{} : {}", lang.text(Text::Score), state.score);
    renderer.draw_text(&perfect_line, 32, WHITE, (W / 2.0, H / 2.0 - 65.0), a, false);
    renderer.draw_text(&score_line, 32, WHITE, (W / 2.0, H / 2.0 - 5.0), a, false);

    let change = state.highlighted == Some(Choice::ChangeSong);
    let retry = state.highlighted == Some(Choice::Retry);
    renderer.draw_text(lang.text(Text::ChangeSong), 24, WHITE, (W / 2.0 - 100.0, H / 2.0 + 125.0), opaque, change);
    renderer.draw_text(lang.text(Text::Retry), 24, WHITE, (W / 2.0 + 100.0, H / 2.0 + 125.0), opaque, retry);
}
