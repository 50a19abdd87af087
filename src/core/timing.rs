use std::time::Instant;

/// Monotonic millisecond source.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall clock anchored at construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    #[inline(always)]
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Elapsed play time of one gameplay session.
///
/// There is no pause: a finished session is never resumed, the next one
/// calls [`SessionClock::start`] again.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionClock {
    epoch_ms: Option<u64>,
    last_ms: u64,
}

impl SessionClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, now_ms: u64) {
        self.epoch_ms = Some(now_ms);
        self.last_ms = 0;
    }

    /// Milliseconds since `start`. Never goes backwards, even if the source does.
    pub fn elapsed(&mut self, now_ms: u64) -> u64 {
        let Some(epoch) = self.epoch_ms else { return 0 };
        let elapsed = now_ms.saturating_sub(epoch);
        if elapsed > self.last_ms {
            self.last_ms = elapsed;
        }
        self.last_ms
    }
}

/// `m : ss` as shown on the gameplay HUD.
pub fn format_play_time(elapsed_ms: u64) -> String {
    let minutes = elapsed_ms / 60_000;
    let seconds = (elapsed_ms + 500) / 1000 - minutes * 60;
    format!("{} : {:02}", minutes, seconds.min(59))
}
