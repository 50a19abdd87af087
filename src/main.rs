use log::{error, info, LevelFilter};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // --- Logging Setup ---
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Info)
        .filter_module("muserush::game", LevelFilter::Debug)
        .filter_module("muserush::core::audio", LevelFilter::Info)
        .init();

    info!("Application starting...");
    let config = muserush::config::load();
    info!("Songs from '{}', sounds from '{}'.", config.song_dir.display(), config.sound_dir.display());

    if let Err(e) = muserush::app::run() {
        error!("Application exited with error: {}", e);
        return Err(e);
    }

    info!("Application exited gracefully.");
    Ok(())
}
