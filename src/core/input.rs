use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Keys the screens care about. Anything else still counts as "a key was pressed".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Enter,
    UpperAttack,
    LowerAttack,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    Primary,
    WheelUp,
    WheelDown,
    Other,
}

/// Everything the state machine sees for one tick.
///
/// Only the last key and the last button of a tick are kept.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickInput {
    pub key: Option<Key>,
    pub button: Option<Button>,
    pub cursor: (f32, f32),
    pub cursor_moved: bool,
    pub quit: bool,
}

impl TickInput {
    pub fn key(key: Key) -> Self {
        Self { key: Some(key), ..Self::default() }
    }

    pub fn click(button: Button) -> Self {
        Self { button: Some(button), ..Self::default() }
    }

    pub fn hover(x: f32, y: f32) -> Self {
        Self { cursor: (x, y), cursor_moved: true, ..Self::default() }
    }

    #[inline(always)]
    pub fn any_press(&self) -> bool {
        self.key.is_some() || self.button.is_some()
    }

    #[inline(always)]
    pub fn primary_click(&self) -> bool {
        self.button == Some(Button::Primary)
    }

    #[inline(always)]
    pub fn pressed(&self, key: Key) -> bool {
        self.key == Some(key)
    }

    #[inline(always)]
    pub fn clicked(&self, button: Button) -> bool {
        self.button == Some(button)
    }
}

/// Accumulates window events between ticks.
#[derive(Debug, Default)]
pub struct InputCollector {
    pending: TickInput,
}

impl InputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_keyboard_input(&mut self, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        if let PhysicalKey::Code(code) = event.physical_key {
            self.pending.key = Some(key_from_keycode(code));
        }
    }

    pub fn handle_mouse_button(&mut self, state: ElementState, button: MouseButton) {
        if state != ElementState::Pressed {
            return;
        }
        self.pending.button = Some(match button {
            MouseButton::Left => Button::Primary,
            _ => Button::Other,
        });
    }

    pub fn handle_wheel(&mut self, delta: MouseScrollDelta) {
        let dy = match delta {
            MouseScrollDelta::LineDelta(_, y) => y as f64,
            MouseScrollDelta::PixelDelta(pos) => pos.y,
        };
        if dy > 0.0 {
            self.pending.button = Some(Button::WheelUp);
        } else if dy < 0.0 {
            self.pending.button = Some(Button::WheelDown);
        }
    }

    pub fn handle_cursor(&mut self, x: f32, y: f32) {
        if (x, y) != self.pending.cursor {
            self.pending.cursor_moved = true;
        }
        self.pending.cursor = (x, y);
    }

    pub fn request_quit(&mut self) {
        self.pending.quit = true;
    }

    /// Hands out this tick's snapshot; the cursor position carries over.
    pub fn take(&mut self) -> TickInput {
        let snapshot = self.pending;
        self.pending = TickInput { cursor: snapshot.cursor, ..TickInput::default() };
        snapshot
    }
}

#[inline(always)]
pub fn key_from_keycode(code: KeyCode) -> Key {
    match code {
        KeyCode::ArrowUp => Key::Up,
        KeyCode::ArrowDown => Key::Down,
        KeyCode::ArrowLeft => Key::Left,
        KeyCode::ArrowRight => Key::Right,
        KeyCode::Enter | KeyCode::NumpadEnter => Key::Enter,
        KeyCode::KeyS | KeyCode::KeyD => Key::UpperAttack,
        KeyCode::KeyL | KeyCode::Semicolon => Key::LowerAttack,
        _ => Key::Other,
    }
}
