use crate::config::ALPHA_MAX;

/// Bounded alpha counter that gates every screen transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fade {
    alpha: i32,
    step: i32,
}

impl Fade {
    /// Starts fully transparent, ready to fade in.
    pub const fn hidden(step: i32) -> Self {
        Self { alpha: 0, step }
    }

    #[inline(always)]
    pub fn alpha(&self) -> i32 {
        self.alpha
    }

    #[inline(always)]
    pub fn is_opaque(&self) -> bool {
        self.alpha >= ALPHA_MAX
    }

    #[inline(always)]
    pub fn is_clear(&self) -> bool {
        self.alpha <= 0
    }

    pub fn set_step(&mut self, step: i32) {
        self.step = step;
    }

    pub fn set_alpha(&mut self, alpha: i32) {
        self.alpha = alpha.clamp(0, ALPHA_MAX);
    }

    /// One step toward opaque. True once fully opaque.
    pub fn fade_in(&mut self) -> bool {
        self.alpha = (self.alpha + self.step).min(ALPHA_MAX);
        self.is_opaque()
    }

    /// One step toward clear. True once fully clear.
    pub fn fade_out(&mut self) -> bool {
        self.alpha = (self.alpha - self.step).max(0);
        self.is_clear()
    }
}

/// Non-blocking stand-in for a sleep: a deadline on the session clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacingTimer {
    deadline_ms: Option<u64>,
}

impl PacingTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, now_ms: u64, delay_ms: u64) {
        self.deadline_ms = Some(now_ms.saturating_add(delay_ms));
    }

    pub fn is_armed(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// Armed and past its deadline.
    pub fn is_done(&self, now_ms: u64) -> bool {
        self.deadline_ms.is_some_and(|deadline| now_ms >= deadline)
    }
}
