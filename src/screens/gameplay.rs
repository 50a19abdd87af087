use crate::config::{
    ALPHA_MAX, BACKGROUND_SCROLL_SPEED, BACKGROUND_WIDTH, GAMEPLAY_END_FADE_STEP, GAMEPLAY_END_MUSIC_FADE_MS,
    PACING_DELAY_MS, SCREEN_FADE_STEP, WIDTH,
};
use crate::core::input::{Key, TickInput};
use crate::core::language::Text;
use crate::core::render::{alpha, Image, Renderer, WHITE};
use crate::core::timing::{format_play_time, SessionClock};
use crate::game::chart::{Chart, ChartError};
use crate::game::combat::{resolve_attack, AttackOutcome};
use crate::game::entity::{EnemyArena, Lane, PlayerState, TargetPoints, PLAYER_X};
use crate::game::schedule::{EnemySchedule, ScheduleStep};
use crate::game::song::Song;
use crate::screens::fade::{Fade, PacingTimer};
use crate::screens::{GameData, Screen, ScreenAction, SessionContext};
use log::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    /// Chart finished: screen fades, then music fades, then the pacing delay runs.
    Ending,
}

/// Two background copies side by side, scrolled left forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollingBackground {
    pub x1: i32,
    pub x2: i32,
}

impl Default for ScrollingBackground {
    fn default() -> Self {
        Self { x1: 0, x2: BACKGROUND_WIDTH }
    }
}

impl ScrollingBackground {
    pub fn advance(&mut self) {
        self.x1 -= BACKGROUND_SCROLL_SPEED;
        self.x2 -= BACKGROUND_SCROLL_SPEED;
        if self.x1 <= -BACKGROUND_WIDTH {
            self.x1 = BACKGROUND_WIDTH;
        }
        if self.x2 <= -BACKGROUND_WIDTH {
            self.x2 = BACKGROUND_WIDTH;
        }
    }
}

/* ----------------------------- state ----------------------------- */

/// One play of one chart. Discarded when the session ends.
pub struct State {
    fade: Fade,
    phase: Phase,
    clock: SessionClock,
    elapsed_ms: u64,
    schedule: EnemySchedule,
    arena: EnemyArena,
    player: PlayerState,
    targets: TargetPoints,
    background: ScrollingBackground,
    pacing: PacingTimer,
    perfect: Option<u32>,
}

/// Loads the chart from disk and starts the session clock.
pub fn start(song: &Song, now_ms: u64) -> Result<State, ChartError> {
    let chart = Chart::load(&song.chart_path)?;
    Ok(start_with_chart(chart, song.record.perfect(), now_ms))
}

pub fn start_with_chart(chart: Chart, perfect: Option<u32>, now_ms: u64) -> State {
    let mut clock = SessionClock::new();
    clock.start(now_ms);
    info!("Session started with {} chart event(s).", chart.events.len());
    if !chart.has_terminal() {
        debug!("Chart has no end marker; the session ends after its last event.");
    }
    State {
        fade: Fade::hidden(SCREEN_FADE_STEP),
        phase: Phase::Playing,
        clock,
        elapsed_ms: 0,
        schedule: EnemySchedule::new(chart.events),
        arena: EnemyArena::new(),
        player: PlayerState::new(),
        targets: TargetPoints::standard(),
        background: ScrollingBackground::default(),
        pacing: PacingTimer::new(),
        perfect,
    }
}

impl State {
    pub fn score(&self) -> u32 {
        self.player.score
    }

    pub fn perfect(&self) -> Option<u32> {
        self.perfect
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn arena(&self) -> &EnemyArena {
        &self.arena
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn alpha(&self) -> i32 {
        self.fade.alpha()
    }
}

#[inline(always)]
fn attack_lane(input: &TickInput) -> Option<Lane> {
    match input.key {
        Some(Key::UpperAttack) => Some(Lane::Upper),
        Some(Key::LowerAttack) => Some(Lane::Lower),
        _ => None,
    }
}

/* -------------------------- input -> nav ------------------------- */

fn attack(state: &mut State, lane: Lane, ctx: &mut SessionContext<'_>) -> AttackOutcome {
    state.player.strike(lane);
    let outcome = resolve_attack(lane, &mut state.arena, &state.targets);
    state.player.add_score(outcome.score_delta);
    for feedback in &outcome.feedback {
        ctx.audio.play_sfx(feedback.sound());
    }
    outcome
}

/* ---------------------------- update ----------------------------- */

pub fn update(state: &mut State, input: &TickInput, ctx: &mut SessionContext<'_>) -> ScreenAction {
    let now = ctx.now_ms();
    let mut action = ScreenAction::None;

    match state.phase {
        Phase::Playing => {
            if !state.fade.is_opaque() {
                state.fade.fade_in();
            }
            match state.schedule.due(state.elapsed_ms) {
                ScheduleStep::Idle => {}
                ScheduleStep::Spawn(specs) => {
                    for spec in &specs {
                        state.arena.spawn(spec);
                    }
                }
                ScheduleStep::EndOfChart => {
                    info!("Chart complete at {} ms with score {}.", state.elapsed_ms, state.player.score);
                    state.phase = Phase::Ending;
                    state.fade.set_step(GAMEPLAY_END_FADE_STEP);
                    action = ScreenAction::CommitScore(state.player.score);
                }
            }
            if state.phase == Phase::Playing {
                if let Some(lane) = attack_lane(input) {
                    let outcome = attack(state, lane, ctx);
                    debug!("Attack {:?}: +{} ({} killed)", lane, outcome.score_delta, outcome.killed.len());
                }
            }
        }
        Phase::Ending => {
            if !state.fade.is_clear() {
                state.fade.fade_out();
            } else if !state.pacing.is_armed() {
                ctx.audio.fade_out(GAMEPLAY_END_MUSIC_FADE_MS);
                state.pacing.arm(now, PACING_DELAY_MS);
            } else if state.pacing.is_done(now) {
                ctx.audio.play(false);
                action = ScreenAction::Navigate(Screen::Results);
            }
        }
    }

    state.arena.advance();
    state.elapsed_ms = state.clock.elapsed(now);
    state.background.advance();
    action
}

/* ---------------------------- drawing ---------------------------- */

pub fn draw(state: &State, renderer: &mut dyn Renderer, data: &GameData) {
    let a = alpha(state.fade.alpha());
    let opaque = ALPHA_MAX as u8;

    renderer.draw_sprite((state.background.x1 as f32, 0.0), Image::Background, opaque, 0.0);
    renderer.draw_sprite((state.background.x2 as f32, 0.0), Image::Background, opaque, 0.0);

    let time = format_play_time(state.elapsed_ms);
    let score = format!("{} : {}", data.language.text(Text::Score), state.player.score);
    renderer.draw_text(&time, 24, WHITE, (10.0 + time.chars().count() as f32 * 6.0, 15.0), a, false);
    let score_x = (WIDTH - 20) as f32 - score.chars().count() as f32 * 6.0;
    renderer.draw_text(&score, 24, WHITE, (score_x, 15.0), a, false);

    if state.phase == Phase::Ending && state.fade.is_clear() {
        return;
    }
    renderer.draw_sprite((PLAYER_X as f32, state.player.y as f32), Image::Player(state.player.pose), opaque, 0.0);
    for target in [state.targets.upper, state.targets.lower] {
        renderer.draw_sprite((target.x as f32, target.y as f32), Image::Target, opaque, 0.0);
    }
    for enemy in state.arena.iter() {
        let position = (enemy.rect.x as f32, enemy.rect.y as f32);
        renderer.draw_sprite(position, Image::Enemy(enemy.kind), alpha(enemy.alpha), 0.0);
    }
}
