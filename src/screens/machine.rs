use crate::config::{MUSIC_FADE_MS, WINDOW_TITLE};
use crate::core::audio::Sound;
use crate::core::input::TickInput;
use crate::core::language::LanguageTable;
use crate::core::render::Renderer;
use crate::game::scores::{CommitOutcome, ScoreStore};
use crate::game::song::SongLibrary;
use crate::screens::{
    evaluation, gameplay, init, logo, menu, select_music, GameData, Screen, ScreenAction, SessionContext,
};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

/// The current screen together with its phase and fade counters.
pub enum ScreenState {
    Logo1(init::State),
    Logo2(logo::State),
    MainMenu(menu::State),
    SongSelect(select_music::State),
    Gameplay(Box<gameplay::State>),
    Results(evaluation::State),
}

impl ScreenState {
    pub fn screen(&self) -> Screen {
        match self {
            ScreenState::Logo1(_) => Screen::Logo1,
            ScreenState::Logo2(_) => Screen::Logo2,
            ScreenState::MainMenu(_) => Screen::MainMenu,
            ScreenState::SongSelect(_) => Screen::SongSelect,
            ScreenState::Gameplay(_) => Screen::Gameplay,
            ScreenState::Results(_) => Screen::Results,
        }
    }
}

/// Top-level controller: one tick in, one frame out.
pub struct ScreenMachine {
    state: ScreenState,
    data: GameData,
    store: ScoreStore,
    rng: StdRng,
    running: bool,
    last_score: u32,
}

impl ScreenMachine {
    pub fn new(library: SongLibrary, language: LanguageTable, main_track: PathBuf) -> Self {
        Self::with_rng(library, language, main_track, StdRng::from_os_rng())
    }

    /// Deterministic logo animation, for tests and replays.
    pub fn with_seed(library: SongLibrary, language: LanguageTable, main_track: PathBuf, seed: u64) -> Self {
        Self::with_rng(library, language, main_track, StdRng::seed_from_u64(seed))
    }

    fn with_rng(library: SongLibrary, language: LanguageTable, main_track: PathBuf, rng: StdRng) -> Self {
        Self {
            state: ScreenState::Logo1(init::init()),
            data: GameData::new(library, language, main_track),
            store: ScoreStore::new(),
            rng,
            running: true,
            last_score: 0,
        }
    }

    pub fn screen(&self) -> Screen {
        self.state.screen()
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    pub fn data(&self) -> &GameData {
        &self.data
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn last_score(&self) -> u32 {
        self.last_score
    }

    /// Window title with the live score during play.
    pub fn title(&self) -> String {
        match &self.state {
            ScreenState::Gameplay(play) => format!("{} - {} ({})", WINDOW_TITLE, self.song_name(), play.score()),
            _ => WINDOW_TITLE.to_string(),
        }
    }

    fn song_name(&self) -> &str {
        self.data.selected_song().map_or("", |song| song.name.as_str())
    }

    /// Advances the current screen by one tick.
    pub fn tick(&mut self, input: &TickInput, ctx: &mut SessionContext<'_>) {
        if !self.running {
            return;
        }
        if input.quit {
            info!("Quit requested on {:?}.", self.screen());
            self.running = false;
            return;
        }
        if input.any_press() && self.screen().precedes_gameplay() {
            ctx.audio.play_sfx(Sound::Click);
        }

        let action = match &mut self.state {
            ScreenState::Logo1(state) => init::update(state, ctx, &self.data),
            ScreenState::Logo2(state) => logo::update(state, input, &mut self.rng),
            ScreenState::MainMenu(state) => menu::update(state, input, ctx, &mut self.data),
            ScreenState::SongSelect(state) => select_music::update(state, input, ctx, &mut self.data),
            ScreenState::Gameplay(state) => gameplay::update(state, input, ctx),
            ScreenState::Results(state) => evaluation::update(state, input, ctx),
        };
        self.apply(action, ctx);
    }

    fn apply(&mut self, action: ScreenAction, ctx: &mut SessionContext<'_>) {
        match action {
            ScreenAction::None => {}
            ScreenAction::Navigate(to) => self.navigate(to, ctx),
            ScreenAction::CommitScore(score) => self.commit_score(score),
            ScreenAction::Exit => {
                info!("Exit confirmed.");
                self.running = false;
            }
        }
    }

    fn commit_score(&mut self, score: u32) {
        self.last_score = score;
        let Some(song) = self.data.selected_song_mut() else {
            warn!("Session ended with no song selected; score {} dropped.", score);
            return;
        };
        match self.store.commit(song, score) {
            Ok(CommitOutcome::Written { previous }) => debug!("Best score {} -> {}.", previous, score),
            Ok(CommitOutcome::Kept { best }) => debug!("Best score stays {}.", best),
            Err(e) => warn!("Score {} not saved: {}", score, e),
        }
    }

    fn navigate(&mut self, to: Screen, ctx: &mut SessionContext<'_>) {
        let from = self.screen();
        if !from.can_navigate_to(to) {
            error!("Ignoring transition {:?} -> {:?}.", from, to);
            return;
        }
        info!("Screen {:?} -> {:?}", from, to);

        self.state = match to {
            Screen::Logo1 => ScreenState::Logo1(init::init()),
            Screen::Logo2 => ScreenState::Logo2(logo::init()),
            Screen::MainMenu => ScreenState::MainMenu(menu::init(from == Screen::SongSelect)),
            Screen::SongSelect => ScreenState::SongSelect(select_music::init()),
            Screen::Gameplay => self.start_session(ctx),
            Screen::Results => {
                let (score, perfect) = match &self.state {
                    ScreenState::Gameplay(play) => (play.score(), play.perfect()),
                    _ => (self.last_score, None),
                };
                ScreenState::Results(evaluation::init(score, perfect))
            }
        };
    }

    /// Fresh session on the selected song. A chart that no longer loads drops
    /// the song to unranked and returns to song select.
    fn start_session(&mut self, ctx: &mut SessionContext<'_>) -> ScreenState {
        let now = ctx.now_ms();
        let Some(song) = self.data.selected_song_mut() else {
            error!("No song selected; back to song select.");
            return ScreenState::SongSelect(select_music::init());
        };
        match gameplay::start(song, now) {
            Ok(session) => ScreenState::Gameplay(Box::new(session)),
            Err(e) => {
                error!("Chart for '{}' failed to load: {}", song.name, e);
                song.mark_unranked();
                ctx.audio.fade_out(MUSIC_FADE_MS);
                ScreenState::SongSelect(select_music::init())
            }
        }
    }

    /// Draws the current screen and presents the frame.
    pub fn render(&self, renderer: &mut dyn Renderer) {
        match &self.state {
            ScreenState::Logo1(state) => init::draw(state, renderer),
            ScreenState::Logo2(state) => logo::draw(state, renderer),
            ScreenState::MainMenu(state) => menu::draw(state, renderer, &self.data),
            ScreenState::SongSelect(state) => select_music::draw(state, renderer, &self.data),
            ScreenState::Gameplay(state) => gameplay::draw(state, renderer, &self.data),
            ScreenState::Results(state) => evaluation::draw(state, renderer, &self.data),
        }
        renderer.present_frame();
    }
}
