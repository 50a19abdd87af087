use crate::config::{ALPHA_MAX, HEIGHT, LOGO_FADE_STEP, WIDTH};
use crate::core::render::{alpha, Image, Renderer};
use crate::screens::{GameData, Screen, ScreenAction, SessionContext};

/* ----------------------------- state ----------------------------- */

/// "Powered by" splash. Input is ignored; it advances on its own.
pub struct State {
    counter: i32,
}

pub fn init() -> State {
    State { counter: -ALPHA_MAX }
}

impl State {
    /// The counter first holds the splash fully visible, then fades it away.
    pub fn alpha(&self) -> u8 {
        alpha(ALPHA_MAX - self.counter.clamp(0, ALPHA_MAX))
    }
}

/* ---------------------------- update ----------------------------- */

pub fn update(state: &mut State, ctx: &mut SessionContext<'_>, data: &GameData) -> ScreenAction {
    state.counter += LOGO_FADE_STEP;
    if state.counter >= ALPHA_MAX {
        data.play_main_track(ctx);
        ScreenAction::Navigate(Screen::Logo2)
    } else {
        ScreenAction::None
    }
}

/* ---------------------------- drawing ---------------------------- */

pub fn draw(state: &State, renderer: &mut dyn Renderer) {
    let position = ((WIDTH / 5 - 50) as f32, (HEIGHT / 2 - 70) as f32);
    renderer.draw_sprite(position, Image::Powered, state.alpha(), 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splash_holds_then_fades() {
        let mut state = init();
        assert_eq!(state.alpha(), 255);
        state.counter = 0;
        assert_eq!(state.alpha(), 255);
        state.counter = 200;
        assert_eq!(state.alpha(), 55);
    }
}
