use crate::config::{ALPHA_MAX, HEIGHT, MUSIC_FADE_MS, PACING_DELAY_MS, SCREEN_FADE_STEP, WIDTH};
use crate::core::input::{Button, Key, TickInput};
use crate::core::language::Text;
use crate::core::render::{alpha, Image, Renderer, BLUE, RED, WHITE};
use crate::screens::fade::{Fade, PacingTimer};
use crate::screens::{GameData, Screen, ScreenAction, SessionContext};
use log::info;

const W: f32 = WIDTH as f32;
const H: f32 = HEIGHT as f32;
const BUTTON_HALF_WIDTH: f32 = 75.0;

/// Clickable regions of the song wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hover {
    Up,
    Down,
    Start,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Browsing,
    /// Start confirmed: music fading, screen fading, pacing timer running.
    ConfirmStart,
    Leaving,
}

/* ----------------------------- state ----------------------------- */

pub struct State {
    fade: Fade,
    hover: Option<Hover>,
    phase: Phase,
    pacing: PacingTimer,
}

pub fn init() -> State {
    State { fade: Fade::hidden(SCREEN_FADE_STEP), hover: None, phase: Phase::Browsing, pacing: PacingTimer::new() }
}

impl State {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn alpha(&self) -> i32 {
        self.fade.alpha()
    }
}

fn hover_at((x, y): (f32, f32)) -> Option<Hover> {
    let within = |center: f32| (center - BUTTON_HALF_WIDTH).round() < x && x < (center + BUTTON_HALF_WIDTH).round();
    if within(0.31 * W) {
        if y < (0.125 * H + 30.0).round() {
            Some(Hover::Up)
        } else if y > (0.875 * H - 30.0).round() {
            Some(Hover::Down)
        } else {
            None
        }
    } else if within(0.69 * W) && H / 2.0 + 25.0 < y && y < H / 2.0 + 65.0 {
        Some(Hover::Start)
    } else if within(0.73 * W) && H / 2.0 + 85.0 < y && y < H / 2.0 + 125.0 {
        Some(Hover::Back)
    } else {
        None
    }
}

/* -------------------------- input -> nav ------------------------- */

fn start(state: &mut State, ctx: &mut SessionContext<'_>, data: &GameData) {
    if !data.selected_is_ranked() {
        return;
    }
    if let Some(song) = data.selected_song() {
        info!("Starting '{}'.", song.name);
    }
    ctx.audio.fade_out(MUSIC_FADE_MS);
    state.pacing.arm(ctx.now_ms(), PACING_DELAY_MS);
    state.phase = Phase::ConfirmStart;
}

fn handle_input(state: &mut State, input: &TickInput, ctx: &mut SessionContext<'_>, data: &mut GameData) {
    state.hover = hover_at(input.cursor);

    let changed = if input.primary_click() {
        match state.hover {
            Some(Hover::Up) => data.select_previous(),
            Some(Hover::Down) => data.select_next(),
            Some(Hover::Start) => {
                start(state, ctx, data);
                false
            }
            Some(Hover::Back) => {
                state.phase = Phase::Leaving;
                false
            }
            None => false,
        }
    } else if input.pressed(Key::Up) || input.clicked(Button::WheelUp) {
        data.select_previous()
    } else if input.pressed(Key::Down) || input.clicked(Button::WheelDown) {
        data.select_next()
    } else if input.pressed(Key::Right) || input.pressed(Key::Enter) {
        start(state, ctx, data);
        false
    } else if input.pressed(Key::Left) {
        state.phase = Phase::Leaving;
        false
    } else {
        false
    };

    if changed {
        data.cue_selected_song(ctx);
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
        Phase::Browsing => {
            if state.fade.is_opaque() {
                handle_input(state, input, ctx, data);
            } else {
                state.fade.fade_in();
            }
            ScreenAction::None
        }
        Phase::ConfirmStart => {
            state.fade.fade_out();
            if state.fade.is_clear() && state.pacing.is_done(ctx.now_ms()) {
                ctx.audio.play(false);
                ScreenAction::Navigate(Screen::Gameplay)
            } else {
                ScreenAction::None
            }
        }
        Phase::Leaving => {
            if state.fade.fade_out() {
                data.play_main_track(ctx);
                ScreenAction::Navigate(Screen::MainMenu)
            } else {
                ScreenAction::None
            }
        }
    }
}

/* ---------------------------- drawing ---------------------------- */

pub fn draw(state: &State, renderer: &mut dyn Renderer, data: &GameData) {
    let fade = state.fade.alpha();
    let a = alpha(fade);
    let dim = |by: i32| alpha(fade - by);

    renderer.draw_sprite((0.0, 0.0), Image::Background, ALPHA_MAX as u8, 0.0);
    let center = ((W * 1.2).round(), (H / 2.0).round());
    let rings = [(0.95, WHITE), (0.50, WHITE), (0.15, WHITE), (0.125, RED), (0.1, BLUE)];
    for (scale, color) in rings {
        let radius = (scale * W).round() as i32 + fade;
        renderer.draw_sprite(center, Image::Ring { radius, color }, ALPHA_MAX as u8, 0.0);
    }

    let selected = data.song_select;
    let neighbours: [(isize, u32, f32, f32, i32); 5] = [
        (-2, 32, 0.29, 0.25, 220),
        (-1, 36, 0.27, 0.375, 180),
        (0, 48, 0.25, 0.5, 0),
        (1, 36, 0.27, 0.625, 180),
        (2, 32, 0.29, 0.75, 220),
    ];
    for (offset, size, x, y, dimming) in neighbours {
        let Some(number) = selected.checked_add_signed(offset) else { continue };
        if let Some(song) = data.library.get(number) {
            renderer.draw_text(&song.name, size, WHITE, (x * W, y * H - 20.0), dim(dimming), false);
        }
    }

    let up_size = if state.hover == Some(Hover::Up) { 36 } else { 32 };
    let down_size = if state.hover == Some(Hover::Down) { 36 } else { 32 };
    renderer.draw_text("UP", up_size, WHITE, (0.31 * W, 0.125 * H - 20.0), a, false);
    renderer.draw_text("DOWN", down_size, WHITE, (0.31 * W, 0.875 * H - 30.0), a, false);

    let lang = &data.language;
    match data.selected_song().map(|song| song.record) {
        Some(record) if record.is_ranked() => {
            if record.is_perfect_clear() {
                let text = lang.text(Text::PerfectClear);
                renderer.draw_text(text, 36, BLUE, (0.71 * W, H / 2.0 - 150.0), dim(180), true);
            }
            let best = record.best().unwrap_or_default().to_string();
            renderer.draw_text(lang.text(Text::HighScore), 28, WHITE, (0.69 * W, H / 2.0 - 130.0), a, false);
            renderer.draw_text(&best, 28, WHITE, (0.69 * W, H / 2.0 - 70.0), a, false);
            let start_selected = state.hover == Some(Hover::Start);
            renderer.draw_text(lang.text(Text::StartSong), 32, WHITE, (0.69 * W, H / 2.0 + 25.0), a, start_selected);
        }
        _ => renderer.draw_text(lang.text(Text::Unavailable), 32, RED, (0.71 * W, H / 2.0 - 100.0), a, false),
    }
    let back_selected = state.hover == Some(Hover::Back);
    renderer.draw_text(lang.text(Text::Back), 32, WHITE, (0.73 * W, H / 2.0 + 85.0), a, back_selected);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_regions() {
        assert_eq!(hover_at((397.0, 50.0)), Some(Hover::Up));
        assert_eq!(hover_at((397.0, 650.0)), Some(Hover::Down));
        assert_eq!(hover_at((397.0, 360.0)), None);
        assert_eq!(hover_at((883.0, 400.0)), Some(Hover::Start));
        assert_eq!(hover_at((934.0, 460.0)), Some(Hover::Back));
        assert_eq!(hover_at((10.0, 10.0)), None);
    }
}
