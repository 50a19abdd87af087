use muserush::core::audio::{AudioPlayer, Sound};
use muserush::core::input::{Key, TickInput};
use muserush::core::language::LanguageTable;
use muserush::core::render::FrameLog;
use muserush::core::timing::Clock;
use muserush::game::scores::Record;
use muserush::game::song::SongLibrary;
use muserush::screens::machine::{ScreenMachine, ScreenState};
use muserush::screens::{Screen, SessionContext};
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const LANGUAGE: &str = "English_font.ttf_START_HELP_EXIT_HOW TO PLAY_BACK_START_HIGH SCORE_l1_l2_l3_\
UNAVAILABLE_SCORE_PERFECT CLEAR_PERFECT SCORE_RETRY_CHANGE SONG";
const TICK_MS: u64 = 16;

struct ManualClock(Cell<u64>);

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum AudioEvent {
    Load(PathBuf),
    Play(bool),
    FadeOut(u32),
    Sfx(Sound),
}

#[derive(Default)]
struct RecordingAudio {
    events: Vec<AudioEvent>,
}

impl AudioPlayer for RecordingAudio {
    fn load(&mut self, track: &Path) -> Result<(), String> {
        self.events.push(AudioEvent::Load(track.to_path_buf()));
        Ok(())
    }

    fn play(&mut self, looped: bool) {
        self.events.push(AudioEvent::Play(looped));
    }

    fn fade_out(&mut self, duration_ms: u32) {
        self.events.push(AudioEvent::FadeOut(duration_ms));
    }

    fn play_sfx(&mut self, sound: Sound) {
        self.events.push(AudioEvent::Sfx(sound));
    }
}

struct Harness {
    machine: ScreenMachine,
    clock: ManualClock,
    audio: RecordingAudio,
    frames: FrameLog,
    dir: TempDir,
}

impl Harness {
    /// `songs` are (stem, optional chart text).
    fn new(songs: &[(&str, Option<&str>)]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        for (stem, chart) in songs {
            fs::write(dir.path().join(format!("{stem}.ogg")), b"").unwrap();
            if let Some(chart) = chart {
                fs::write(dir.path().join(format!("{stem}.ini")), chart).unwrap();
            }
        }
        let library = SongLibrary::scan(dir.path());
        let language = LanguageTable::parse(LANGUAGE);
        let machine = ScreenMachine::with_seed(library, language, dir.path().join("bg_main.ogg"), 1);
        Self { machine, clock: ManualClock(Cell::new(0)), audio: RecordingAudio::default(), frames: FrameLog::new(), dir }
    }

    fn tick(&mut self, input: TickInput) {
        self.clock.0.set(self.clock.0.get() + TICK_MS);
        let mut ctx = SessionContext::new(&mut self.audio, &self.clock);
        self.machine.tick(&input, &mut ctx);
        self.machine.render(&mut self.frames);
    }

    fn settle(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.tick(TickInput::default());
        }
    }

    fn idle_until(&mut self, screen: Screen) {
        for _ in 0..2_000 {
            if self.machine.screen() == screen {
                return;
            }
            self.tick(TickInput::default());
        }
        panic!("never reached {:?}, stuck on {:?}", screen, self.machine.screen());
    }

    fn to_song_select(&mut self) {
        self.idle_until(Screen::Logo2);
        self.settle(60);
        self.tick(TickInput::key(Key::Other));
        self.idle_until(Screen::MainMenu);
        self.settle(20);
        self.tick(TickInput::key(Key::Enter));
        self.idle_until(Screen::SongSelect);
        self.settle(20);
    }

    fn chart_path(&self, stem: &str) -> PathBuf {
        self.dir.path().join(format!("{stem}.ini"))
    }
}

#[test]
fn logo_starts_main_track_and_clicks_play_before_gameplay() {
    let mut h = Harness::new(&[("alpha", Some("score:0:100\n00:01:00 - E"))]);
    assert_eq!(h.machine.screen(), Screen::Logo1);
    h.tick(TickInput::key(Key::Enter));
    assert_eq!(h.audio.events, vec![AudioEvent::Sfx(Sound::Click)]);
    assert_eq!(h.machine.screen(), Screen::Logo1);

    h.idle_until(Screen::Logo2);
    let main = h.dir.path().join("bg_main.ogg");
    assert!(h.audio.events.ends_with(&[AudioEvent::Load(main), AudioEvent::Play(true)]));
}

#[test]
fn full_session_scores_commits_and_retries() {
    let chart = "score:0:300\n00:00:10 - 1L9\n00:01:00 - E";
    let mut h = Harness::new(&[("alpha", Some(chart))]);
    h.to_song_select();
    let track = h.dir.path().join("alpha.ogg");
    assert!(h.audio.events.contains(&AudioEvent::Load(track)));

    h.tick(TickInput::key(Key::Enter));
    h.idle_until(Screen::Gameplay);
    assert!(h.audio.events.ends_with(&[AudioEvent::Play(false)]));
    assert!(h.clock.now_ms() >= 2_000);

    let mut attacked = false;
    for _ in 0..200 {
        let in_range = match h.machine.state() {
            ScreenState::Gameplay(play) => play.arena().iter().any(|e| (e.rect.x - 310).abs() < 100),
            _ => false,
        };
        if in_range && !attacked {
            h.tick(TickInput::key(Key::LowerAttack));
            attacked = true;
        } else {
            h.tick(TickInput::default());
        }
        if h.machine.screen() != Screen::Gameplay {
            break;
        }
    }
    assert!(attacked);
    assert!(h.audio.events.contains(&AudioEvent::Sfx(Sound::Hit)));

    h.idle_until(Screen::Results);
    assert_eq!(h.machine.last_score(), 100);
    assert!(h.audio.events.contains(&AudioEvent::FadeOut(1_200)));
    assert_eq!(
        fs::read_to_string(h.chart_path("alpha")).unwrap(),
        "score:100:300\n\n00:00:10 - 1L9\n00:01:00 - E"
    );
    assert_eq!(
        h.machine.data().selected_song().map(|s| s.record),
        Some(Record::Ranked { best: 100, perfect: 300 })
    );
    let texts: Vec<String> = h.frames.texts().map(str::to_string).collect();
    assert!(texts.contains(&"SCORE : 100".to_string()));
    assert!(texts.contains(&"PERFECT SCORE : 300".to_string()));

    h.settle(20);
    h.tick(TickInput::key(Key::Right));
    h.tick(TickInput::key(Key::Enter));
    h.idle_until(Screen::Gameplay);
    match h.machine.state() {
        ScreenState::Gameplay(play) => assert_eq!(play.score(), 0),
        _ => unreachable!(),
    }
}

#[test]
fn lower_score_leaves_chart_untouched() {
    let chart = "score:500:900\n00:00:10 - 1U1\n00:00:20 - E";
    let mut h = Harness::new(&[("alpha", Some(chart))]);
    h.to_song_select();
    h.tick(TickInput::key(Key::Right));
    h.idle_until(Screen::Results);
    assert_eq!(fs::read_to_string(h.chart_path("alpha")).unwrap(), chart);
}

#[test]
fn song_selection_is_clamped_at_both_ends() {
    let mut h = Harness::new(&[("a", Some("score:0:1\n00:01:00 - E")), ("b", Some("score:0:1\n00:01:00 - E"))]);
    h.to_song_select();
    assert_eq!(h.machine.data().song_select, 1);

    let before = h.audio.events.len();
    h.tick(TickInput::key(Key::Up));
    assert_eq!(h.machine.data().song_select, 1);
    assert_eq!(h.audio.events.len(), before + 1);

    h.tick(TickInput::key(Key::Down));
    assert_eq!(h.machine.data().song_select, 2);
    assert!(h.audio.events.ends_with(&[AudioEvent::Load(h.dir.path().join("b.ogg")), AudioEvent::Play(true)]));

    h.tick(TickInput::key(Key::Down));
    assert_eq!(h.machine.data().song_select, 2);
}

#[test]
fn unranked_song_fades_music_and_cannot_start() {
    let mut h = Harness::new(&[("a", Some("score:0:1\n00:01:00 - E")), ("b", None)]);
    h.to_song_select();
    h.tick(TickInput::key(Key::Down));
    assert!(h.audio.events.ends_with(&[AudioEvent::Sfx(Sound::Click), AudioEvent::FadeOut(600)]));

    h.tick(TickInput::key(Key::Enter));
    h.settle(300);
    assert_eq!(h.machine.screen(), Screen::SongSelect);
    assert!(h.frames.texts().any(|t| t == "UNAVAILABLE"));
}

#[test]
fn chart_broken_after_scan_returns_to_song_select_unranked() {
    let mut h = Harness::new(&[("a", Some("score:0:100\n00:01:00 - E"))]);
    h.to_song_select();
    fs::write(h.chart_path("a"), "score:0:100\nnot an event").unwrap();

    h.tick(TickInput::key(Key::Enter));
    h.settle(300);
    assert_eq!(h.machine.screen(), Screen::SongSelect);
    assert_eq!(h.machine.data().selected_song().map(|s| s.record), Some(Record::Unranked));
}

#[test]
fn back_from_song_select_restarts_main_track() {
    let mut h = Harness::new(&[("a", Some("score:0:1\n00:01:00 - E"))]);
    h.to_song_select();
    h.tick(TickInput::key(Key::Left));
    h.idle_until(Screen::MainMenu);
    assert!(h.audio.events.ends_with(&[AudioEvent::Load(h.dir.path().join("bg_main.ogg")), AudioEvent::Play(true)]));
    match h.machine.state() {
        ScreenState::MainMenu(menu) => assert_eq!(menu.cursor(), 0),
        _ => unreachable!(),
    }
}

#[test]
fn exit_entry_and_close_request_stop_the_machine() {
    let mut h = Harness::new(&[]);
    h.idle_until(Screen::Logo2);
    h.settle(60);
    h.tick(TickInput::key(Key::Enter));
    h.idle_until(Screen::MainMenu);
    h.settle(20);
    h.tick(TickInput::key(Key::Down));
    h.tick(TickInput::key(Key::Down));
    h.tick(TickInput::key(Key::Enter));
    assert!(h.machine.is_running());
    h.settle(15);
    assert!(!h.machine.is_running());

    let mut closed = Harness::new(&[]);
    closed.tick(TickInput { quit: true, ..TickInput::default() });
    assert!(!closed.machine.is_running());
}
