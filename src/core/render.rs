use log::{log_enabled, trace, Level};
use serde::Serialize;

pub type Rgb = [u8; 3];

pub const WHITE: Rgb = [255, 255, 255];
pub const BLACK: Rgb = [32, 36, 32];
pub const RED: Rgb = [246, 36, 74];
pub const BLUE: Rgb = [32, 105, 246];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlayerPose {
    Idle,
    Attack,
    AttackUp,
    AttackDown,
}

/// What to draw; the renderer owns the pixels behind each variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Image {
    Background,
    Powered,
    LogoBack { size: i32 },
    Logo { width: i32, height: i32 },
    HelpPanel,
    Ring { radius: i32, color: Rgb },
    Target,
    Player(PlayerPose),
    Enemy(u8),
}

/// Capability the core draws through.
pub trait Renderer {
    fn draw_sprite(&mut self, position: (f32, f32), image: Image, alpha: u8, rotation: f32);
    fn draw_text(
        &mut self,
        text: &str,
        size: u32,
        color: Rgb,
        position: (f32, f32),
        alpha: u8,
        emphasis: bool,
    );
    fn present_frame(&mut self);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCommand {
    Sprite { position: (f32, f32), image: Image, alpha: u8, rotation: f32 },
    Text { text: String, size: u32, color: Rgb, position: (f32, f32), alpha: u8, emphasis: bool },
}

/// Records draw calls per frame; the last presented frame stays inspectable.
#[derive(Debug, Default)]
pub struct FrameLog {
    current: Vec<DrawCommand>,
    last: Vec<DrawCommand>,
    frames: u64,
}

impl FrameLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_frame(&self) -> &[DrawCommand] {
        &self.last
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.last.iter().filter_map(|cmd| match cmd {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            DrawCommand::Sprite { .. } => None,
        })
    }
}

impl Renderer for FrameLog {
    fn draw_sprite(&mut self, position: (f32, f32), image: Image, alpha: u8, rotation: f32) {
        self.current.push(DrawCommand::Sprite { position, image, alpha, rotation });
    }

    fn draw_text(
        &mut self,
        text: &str,
        size: u32,
        color: Rgb,
        position: (f32, f32),
        alpha: u8,
        emphasis: bool,
    ) {
        self.current.push(DrawCommand::Text {
            text: text.to_string(),
            size,
            color,
            position,
            alpha,
            emphasis,
        });
    }

    fn present_frame(&mut self) {
        self.last = std::mem::take(&mut self.current);
        self.frames += 1;
        if log_enabled!(Level::Trace) {
            match serde_json::to_string(&self.last) {
                Ok(json) => trace!("frame {}: {}", self.frames, json),
                Err(e) => trace!("frame {}: unserializable ({})", self.frames, e),
            }
        }
    }
}

/// Clamps a fade counter into a drawable alpha.
#[inline(always)]
pub fn alpha(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_swaps_frames() {
        let mut log = FrameLog::new();
        log.draw_text("SCORE", 24, WHITE, (0.0, 0.0), 255, false);
        assert!(log.last_frame().is_empty());
        log.present_frame();
        assert_eq!(log.texts().collect::<Vec<_>>(), vec!["SCORE"]);
        log.present_frame();
        assert!(log.last_frame().is_empty());
        assert_eq!(log.frames_presented(), 2);
    }

    #[test]
    fn alpha_clamps() {
        assert_eq!(alpha(-40), 0);
        assert_eq!(alpha(300), 255);
        assert_eq!(alpha(17), 17);
    }
}
