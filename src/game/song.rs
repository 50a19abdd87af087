use crate::game::chart::Chart;
use crate::game::scores::Record;
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

pub const MUSIC_EXTENSIONS: [&str; 3] = ["ogg", "mp3", "wav"];
pub const CHART_EXTENSION: &str = "ini";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Song {
    pub name: String,
    pub music_path: PathBuf,
    pub chart_path: PathBuf,
    pub record: Record,
}

impl Song {
    /// Builds a song entry, reading its record from the chart beside the music file.
    pub fn from_music_path(music_path: &Path) -> Option<Song> {
        let name = music_path.file_stem()?.to_string_lossy().into_owned();
        let chart_path = music_path.with_extension(CHART_EXTENSION);
        let record = read_record(&chart_path, &name);
        Some(Song { name, music_path: music_path.to_path_buf(), chart_path, record })
    }

    #[inline(always)]
    pub fn is_ranked(&self) -> bool {
        self.record.is_ranked()
    }

    /// Drops the song out of scored play after a failed chart load.
    pub fn mark_unranked(&mut self) {
        if self.record.is_ranked() {
            warn!("Song '{}' is now unranked.", self.name);
        }
        self.record = Record::Unranked;
    }
}

fn read_record(chart_path: &Path, name: &str) -> Record {
    match Chart::load(chart_path) {
        Ok(chart) => chart.record,
        Err(e) => {
            error!("Chart for '{}' is unusable ({}); song listed as unavailable.", name, e);
            Record::Unranked
        }
    }
}

#[inline(always)]
fn is_music_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MUSIC_EXTENSIONS.iter().any(|m| ext.eq_ignore_ascii_case(m)))
}

/// Songs found in the song directory, ordered by name.
#[derive(Clone, Debug, Default)]
pub struct SongLibrary {
    songs: Vec<Song>,
}

impl SongLibrary {
    pub fn new(songs: Vec<Song>) -> Self {
        Self { songs }
    }

    pub fn scan(dir: &Path) -> Self {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Could not read song directory '{}': {}", dir.display(), e);
                return Self::default();
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_music_file(path))
            .collect();
        paths.sort();

        let songs: Vec<Song> = paths.iter().filter_map(|p| Song::from_music_path(p)).collect();
        let ranked = songs.iter().filter(|s| s.is_ranked()).count();
        info!("Found {} song(s) in '{}' ({} ranked).", songs.len(), dir.display(), ranked);
        Self { songs }
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// 1-based, matching the song-select cursor.
    pub fn get(&self, number: usize) -> Option<&Song> {
        number.checked_sub(1).and_then(|i| self.songs.get(i))
    }

    pub fn get_mut(&mut self, number: usize) -> Option<&mut Song> {
        number.checked_sub(1).and_then(move |i| self.songs.get_mut(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Song> {
        self.songs.iter()
    }
}
