use crate::config::{self, Config, HEIGHT, MAIN_TRACK_FILE, MUSIC_FADE_MS, TICK_RATE_HZ, WIDTH, WINDOW_TITLE};
use crate::core::audio::{AudioEngine, AudioPlayer, NullAudio};
use crate::core::input::InputCollector;
use crate::core::language::LanguageTable;
use crate::core::render::FrameLog;
use crate::core::timing::SystemClock;
use crate::game::song::SongLibrary;
use crate::screens::machine::ScreenMachine;
use crate::screens::SessionContext;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Fullscreen, Window, WindowId},
};

use log::{error, info, warn};
use std::{
    error::Error,
    sync::Arc,
    time::{Duration, Instant},
};

const TICK: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE_HZ as u64);

/* -------------------- shutdown state machine -------------------- */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shutdown {
    Running,
    /// Music fading; exit once the deadline passes.
    FadingOut { until: Instant },
}

pub struct App {
    window: Option<Arc<Window>>,
    windowed: bool,
    machine: ScreenMachine,
    audio: Box<dyn AudioPlayer>,
    clock: SystemClock,
    input: InputCollector,
    frames: FrameLog,
    next_tick: Instant,
    title: String,
    shutdown: Shutdown,
}

impl App {
    fn new(machine: ScreenMachine, audio: Box<dyn AudioPlayer>, windowed: bool) -> Self {
        Self {
            window: None,
            windowed,
            machine,
            audio,
            clock: SystemClock::new(),
            input: InputCollector::new(),
            frames: FrameLog::new(),
            next_tick: Instant::now(),
            title: WINDOW_TITLE.to_string(),
            shutdown: Shutdown::Running,
        }
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Box<dyn Error>> {
        let mut attributes = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(WIDTH as f64, HEIGHT as f64))
            .with_resizable(false);
        if !self.windowed {
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(event_loop.primary_monitor())));
        }
        let window = Arc::new(event_loop.create_window(attributes)?);
        self.window = Some(window);
        info!("Starting event loop...");
        Ok(())
    }

    /// Maps a physical cursor position onto the fixed logical screen.
    fn to_logical(&self, x: f64, y: f64) -> (f32, f32) {
        let Some(window) = &self.window else { return (x as f32, y as f32) };
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return (x as f32, y as f32);
        }
        let sx = WIDTH as f64 / size.width as f64;
        let sy = HEIGHT as f64 / size.height as f64;
        ((x * sx) as f32, (y * sy) as f32)
    }

    fn run_tick(&mut self) {
        let input = self.input.take();
        let mut ctx = SessionContext::new(&mut *self.audio, &self.clock);
        self.machine.tick(&input, &mut ctx);
        self.machine.render(&mut self.frames);

        let title = self.machine.title();
        if title != self.title {
            if let Some(window) = &self.window {
                window.set_title(&title);
            }
            self.title = title;
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init_window(event_loop) {
                error!("Failed to create window: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.as_ref() else { return };
        if window_id != window.id() {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested.");
                self.input.request_quit();
            }
            WindowEvent::KeyboardInput { event: key_event, .. } => self.input.handle_keyboard_input(&key_event),
            WindowEvent::MouseInput { state, button, .. } => self.input.handle_mouse_button(state, button),
            WindowEvent::MouseWheel { delta, .. } => self.input.handle_wheel(delta),
            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = self.to_logical(position.x, position.y);
                self.input.handle_cursor(x, y);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        match self.shutdown {
            Shutdown::FadingOut { until } => {
                if now >= until {
                    event_loop.exit();
                } else {
                    event_loop.set_control_flow(ControlFlow::WaitUntil(until));
                }
                return;
            }
            Shutdown::Running => {}
        }

        if now >= self.next_tick {
            self.run_tick();
            self.next_tick += TICK;
            if self.next_tick < now {
                self.next_tick = now + TICK;
            }
        }

        if !self.machine.is_running() {
            info!("Shutting down; fading music out.");
            self.audio.fade_out(MUSIC_FADE_MS);
            let until = now + Duration::from_millis(MUSIC_FADE_MS as u64);
            self.shutdown = Shutdown::FadingOut { until };
            event_loop.set_control_flow(ControlFlow::WaitUntil(until));
            return;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_tick));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        info!("Presented {} frame(s).", self.frames.frames_presented());
    }
}

fn open_audio(config: &Config) -> Box<dyn AudioPlayer> {
    match AudioEngine::new(&config.sound_dir, config.music_volume) {
        Ok(engine) => Box::new(engine),
        Err(e) => {
            warn!("Audio unavailable ({}); continuing without sound.", e);
            Box::new(NullAudio::default())
        }
    }
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let config = config::get();

    let library = SongLibrary::scan(&config.song_dir);
    let mut language = LanguageTable::load(&config.language_file);
    language.select(config.language);
    let main_track = config.sound_dir.join(MAIN_TRACK_FILE);

    let audio = open_audio(&config);
    let machine = ScreenMachine::new(library, language, main_track);

    let event_loop = EventLoop::new()?;
    let mut app = App::new(machine, audio, config.windowed);
    event_loop.run_app(&mut app)?;
    Ok(())
}
