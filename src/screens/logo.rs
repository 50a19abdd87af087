use crate::config::{ALPHA_MAX, HEIGHT, LOGO_FADE_STEP, SCREEN_FADE_STEP, WIDTH};
use crate::core::input::TickInput;
use crate::core::render::{alpha, Image, Renderer};
use crate::screens::fade::Fade;
use crate::screens::{Screen, ScreenAction};
use rand::Rng;

const LOGO_BACK_SIZE: i32 = 600;
const LOGO_WIDTH: i32 = 600;
const LOGO_HEIGHT: i32 = 300;
const PULSE_FLOOR: i32 = -10;

/* ----------------------------- state ----------------------------- */

/// Size wobble of the title logo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pulse {
    pub size: i32,
    pub hold: i32,
}

impl Pulse {
    /// Shrinks one pixel per tick down to the floor, waits `hold` ticks there,
    /// then jumps back to a random size.
    pub fn tick<R: Rng>(&mut self, rng: &mut R) {
        if self.size > PULSE_FLOOR {
            self.size -= 1;
        } else if self.hold == 0 {
            self.size = rng.random_range(0..10);
            self.hold = rng.random_range(5..30);
        } else {
            self.hold -= 1;
        }
    }
}

pub struct State {
    fade: Fade,
    leaving: bool,
    pulse: Pulse,
}

pub fn init() -> State {
    State { fade: Fade::hidden(LOGO_FADE_STEP), leaving: false, pulse: Pulse::default() }
}

impl State {
    pub fn alpha(&self) -> i32 {
        self.fade.alpha()
    }

    pub fn is_leaving(&self) -> bool {
        self.leaving
    }

    pub fn pulse(&self) -> Pulse {
        self.pulse
    }
}

/* ---------------------------- update ----------------------------- */

pub fn update<R: Rng>(state: &mut State, input: &TickInput, rng: &mut R) -> ScreenAction {
    let action = if !state.leaving {
        if !state.fade.is_opaque() {
            state.fade.fade_in();
        } else if input.key.is_some() || input.primary_click() {
            state.leaving = true;
            state.fade.set_step(SCREEN_FADE_STEP);
        }
        ScreenAction::None
    } else if state.fade.fade_out() {
        ScreenAction::Navigate(Screen::MainMenu)
    } else {
        ScreenAction::None
    };
    state.pulse.tick(rng);
    action
}

/* ---------------------------- drawing ---------------------------- */

pub fn draw(state: &State, renderer: &mut dyn Renderer) {
    let size = state.pulse.size;
    let a = alpha(state.fade.alpha());
    let back_alpha = if state.leaving { ALPHA_MAX as u8 } else { a };
    renderer.draw_sprite((0.0, 0.0), Image::LogoBack { size: LOGO_BACK_SIZE + size }, back_alpha, 0.0);

    let position = ((WIDTH - size) as f32 / 2.0, (HEIGHT / 3 - 80) as f32 - size as f32 / 2.0);
    let logo = Image::Logo { width: LOGO_WIDTH + size, height: LOGO_HEIGHT + size };
    renderer.draw_sprite(position, logo, a, 0.0);
}
