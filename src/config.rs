use configparser::ini::Ini;
use log::{info, warn};
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

// Window
pub const WINDOW_TITLE: &str = "Muse Rush";
pub const WIDTH: i32 = 1280;
pub const HEIGHT: i32 = 720;
pub const TICK_RATE_HZ: u32 = 60;
pub const MAIN_TRACK_FILE: &str = "bg_main.ogg";

// Fades
pub const ALPHA_MAX: i32 = 255;
pub const LOGO_FADE_STEP: i32 = ALPHA_MAX / 51;
pub const SCREEN_FADE_STEP: i32 = ALPHA_MAX / 15;
pub const GAMEPLAY_END_FADE_STEP: i32 = ALPHA_MAX / 85;
pub const HELP_OVERLAY_ALPHA: i32 = ALPHA_MAX / 3;

// Audio pacing
pub const MUSIC_FADE_MS: u32 = 600;
pub const GAMEPLAY_END_MUSIC_FADE_MS: u32 = 1200;
pub const PACING_DELAY_MS: u64 = 2000;

// Gameplay layout (logical 1280x720 pixels)
pub const TARGET_SIZE: i32 = 100;
pub const ENEMY_SMALL_SIZE: i32 = 100;
pub const ENEMY_LARGE_SIZE: i32 = 120;
pub const ENEMY_TOUCH_OFFSET: i32 = 50;
pub const PLAYER_SIZE: i32 = 180;
pub const SPEED_MULTIPLIER: i32 = 10;
pub const LANE_BAND: i32 = 50;
pub const NEAR_HIT_DISTANCE: i32 = 100;
pub const PERFECT_HIT_SCORE: u32 = 100;
pub const NEAR_HIT_SCORE: u32 = 50;
pub const BACKGROUND_WIDTH: i32 = WIDTH;
pub const BACKGROUND_SCROLL_SPEED: i32 = 20;

// --- Runtime configuration ---
const DEFAULT_CONFIG_PATH: &str = "muserush.ini";
const CONFIG_ENV: &str = "MUSERUSH_CONFIG";
const SECTION: &str = "options";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub song_dir: PathBuf,
    pub sound_dir: PathBuf,
    pub language_file: PathBuf,
    pub language: usize,
    pub music_volume: f32,
    pub windowed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            song_dir: PathBuf::from("song"),
            sound_dir: PathBuf::from("sound"),
            language_file: PathBuf::from("font/language.ini"),
            language: 0,
            music_volume: 1.0,
            windowed: true,
        }
    }
}

static CONFIG: Lazy<Mutex<Config>> = Lazy::new(|| Mutex::new(Config::default()));

pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn create_default_file(path: &Path) -> Result<(), std::io::Error> {
    info!("Config file not found, creating defaults in '{}'.", path.display());
    let defaults = Config::default();
    let mut conf = Ini::new();
    conf.set(SECTION, "SongDir", Some(defaults.song_dir.display().to_string()));
    conf.set(SECTION, "SoundDir", Some(defaults.sound_dir.display().to_string()));
    conf.set(SECTION, "LanguageFile", Some(defaults.language_file.display().to_string()));
    conf.set(SECTION, "Language", Some(defaults.language.to_string()));
    conf.set(SECTION, "MusicVolume", Some(defaults.music_volume.to_string()));
    conf.set(SECTION, "Windowed", Some("1".to_string()));
    conf.write(path)
}

/// Reads an INI file into a `Config`, keeping defaults for anything missing or malformed.
pub fn parse(conf: &Ini) -> Config {
    let defaults = Config::default();

    let path_or = |key: &str, default: PathBuf| {
        conf.get(SECTION, key)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(default)
    };

    let language = match conf.get(SECTION, "Language") {
        Some(v) => v.trim().parse::<usize>().unwrap_or_else(|_| {
            warn!("Invalid Language value '{}', using {}.", v, defaults.language);
            defaults.language
        }),
        None => defaults.language,
    };

    let music_volume = match conf.get(SECTION, "MusicVolume") {
        Some(v) => match v.trim().parse::<f32>() {
            Ok(vol) if (0.0..=1.0).contains(&vol) => vol,
            _ => {
                warn!("Invalid MusicVolume value '{}', using {}.", v, defaults.music_volume);
                defaults.music_volume
            }
        },
        None => defaults.music_volume,
    };

    let windowed = conf
        .get(SECTION, "Windowed")
        .and_then(|v| v.trim().parse::<u8>().ok())
        .map_or(defaults.windowed, |v| v != 0);

    Config {
        song_dir: path_or("SongDir", defaults.song_dir.clone()),
        sound_dir: path_or("SoundDir", defaults.sound_dir.clone()),
        language_file: path_or("LanguageFile", defaults.language_file.clone()),
        language,
        music_volume,
        windowed,
    }
}

/// Loads the config file into the global slot, creating it first if needed.
pub fn load() -> Config {
    let path = config_path();
    if !path.exists() {
        if let Err(e) = create_default_file(&path) {
            warn!("Failed to create default config '{}': {}", path.display(), e);
        }
    }

    let mut conf = Ini::new();
    let loaded = match conf.load(&path) {
        Ok(_) => parse(&conf),
        Err(e) => {
            warn!("Failed to load '{}' ({}), using defaults.", path.display(), e);
            Config::default()
        }
    };

    if let Ok(mut slot) = CONFIG.lock() {
        *slot = loaded.clone();
    }
    loaded
}

/// Returns a copy of the currently loaded configuration.
pub fn get() -> Config {
    CONFIG.lock().map(|c| c.clone()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_steps_divide_alpha_range() {
        assert_eq!(LOGO_FADE_STEP, 5);
        assert_eq!(SCREEN_FADE_STEP, 17);
        assert_eq!(GAMEPLAY_END_FADE_STEP, 3);
        assert_eq!(HELP_OVERLAY_ALPHA, 85);
    }

    #[test]
    fn parse_keeps_defaults_for_bad_values() {
        let mut conf = Ini::new();
        conf.read(
            "[Options]\nSongDir = charts\nLanguage = nope\nMusicVolume = 3.5\nWindowed = 0\n".to_string(),
        )
        .unwrap();
        let cfg = parse(&conf);
        assert_eq!(cfg.song_dir, PathBuf::from("charts"));
        assert_eq!(cfg.language, 0);
        assert_eq!(cfg.music_volume, 1.0);
        assert!(!cfg.windowed);
        assert_eq!(cfg.sound_dir, PathBuf::from("sound"));
    }
}
