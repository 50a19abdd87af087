pub mod evaluation;
pub mod fade;
pub mod gameplay;
pub mod init;
pub mod logo;
pub mod machine;
pub mod menu;
pub mod select_music;

use crate::config::MUSIC_FADE_MS;
use crate::core::audio::AudioPlayer;
use crate::core::language::LanguageTable;
use crate::core::timing::Clock;
use crate::game::song::{Song, SongLibrary};
use log::warn;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenAction {
    None,
    Navigate(Screen),
    /// The session reached its end; persist this score before moving on.
    CommitScore(u32),
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Logo1,
    Logo2,
    MainMenu,
    SongSelect,
    Gameplay,
    Results,
}

/// Every transition the flow allows. Anything else is a bug in a screen.
pub const TRANSITIONS: [(Screen, Screen); 9] = [
    (Screen::Logo1, Screen::Logo2),
    (Screen::Logo2, Screen::MainMenu),
    (Screen::MainMenu, Screen::SongSelect),
    (Screen::SongSelect, Screen::MainMenu),
    (Screen::SongSelect, Screen::Gameplay),
    (Screen::Gameplay, Screen::Results),
    (Screen::Gameplay, Screen::SongSelect),
    (Screen::Results, Screen::SongSelect),
    (Screen::Results, Screen::Gameplay),
];

impl Screen {
    #[inline(always)]
    pub fn can_navigate_to(self, to: Screen) -> bool {
        TRANSITIONS.contains(&(self, to))
    }

    /// Screens where every key or click gets the click sound.
    #[inline(always)]
    pub fn precedes_gameplay(self) -> bool {
        matches!(self, Screen::Logo1 | Screen::Logo2 | Screen::MainMenu | Screen::SongSelect)
    }
}

/// External capabilities for one tick.
pub struct SessionContext<'a> {
    pub audio: &'a mut dyn AudioPlayer,
    pub clock: &'a dyn Clock,
}

impl<'a> SessionContext<'a> {
    pub fn new(audio: &'a mut dyn AudioPlayer, clock: &'a dyn Clock) -> Self {
        Self { audio, clock }
    }

    #[inline(always)]
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }
}

/// State that outlives any single screen.
#[derive(Debug)]
pub struct GameData {
    pub library: SongLibrary,
    pub language: LanguageTable,
    /// 1-based index into the library.
    pub song_select: usize,
    pub main_track: PathBuf,
}

impl GameData {
    pub fn new(library: SongLibrary, language: LanguageTable, main_track: PathBuf) -> Self {
        Self { library, language, song_select: 1, main_track }
    }

    pub fn selected_song(&self) -> Option<&Song> {
        self.library.get(self.song_select)
    }

    pub fn selected_song_mut(&mut self) -> Option<&mut Song> {
        self.library.get_mut(self.song_select)
    }

    pub fn selected_is_ranked(&self) -> bool {
        self.selected_song().is_some_and(Song::is_ranked)
    }

    /// Moves the selection up. False at the first song.
    pub fn select_previous(&mut self) -> bool {
        if self.song_select > 1 {
            self.song_select -= 1;
            true
        } else {
            false
        }
    }

    /// Moves the selection down. False at the last song.
    pub fn select_next(&mut self) -> bool {
        if self.song_select < self.library.len() {
            self.song_select += 1;
            true
        } else {
            false
        }
    }

    pub fn play_main_track(&self, ctx: &mut SessionContext<'_>) {
        match ctx.audio.load(&self.main_track) {
            Ok(()) => ctx.audio.play(true),
            Err(e) => warn!("Main track unavailable: {}", e),
        }
    }

    /// Loops the selected song's track, or fades the music out when it cannot be scored.
    pub fn cue_selected_song(&self, ctx: &mut SessionContext<'_>) {
        match self.selected_song().filter(|song| song.is_ranked()) {
            Some(song) => match ctx.audio.load(&song.music_path) {
                Ok(()) => ctx.audio.play(true),
                Err(e) => warn!("Track for '{}' unavailable: {}", song.name, e),
            },
            None => ctx.audio.fade_out(MUSIC_FADE_MS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table_is_directed() {
        assert!(Screen::Logo1.can_navigate_to(Screen::Logo2));
        assert!(!Screen::Logo2.can_navigate_to(Screen::Logo1));
        assert!(!Screen::MainMenu.can_navigate_to(Screen::Gameplay));
        assert!(Screen::Results.can_navigate_to(Screen::Gameplay));
    }

    #[test]
    fn selection_is_clamped() {
        use crate::game::scores::Record;
        let songs = (1..=3)
            .map(|i| Song {
                name: format!("song{i}"),
                music_path: PathBuf::from(format!("song{i}.ogg")),
                chart_path: PathBuf::from(format!("song{i}.ini")),
                record: Record::Unranked,
            })
            .collect();
        let mut data = GameData::new(SongLibrary::new(songs), LanguageTable::default(), PathBuf::new());
        assert!(!data.select_previous());
        assert_eq!(data.song_select, 1);
        assert!(data.select_next());
        assert!(data.select_next());
        assert!(!data.select_next());
        assert_eq!(data.song_select, 3);
    }
}
