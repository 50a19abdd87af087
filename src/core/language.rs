use log::{info, warn};
use std::fs;
use std::path::Path;

pub const FALLBACK_TEXT: &str = "Font Error";

/// Field positions inside a language row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Text {
    LanguageName = 0,
    FontFile = 1,
    Start = 2,
    Help = 3,
    Exit = 4,
    HelpTitle = 5,
    Back = 6,
    StartSong = 7,
    HighScore = 8,
    HelpLine1 = 9,
    HelpLine2 = 10,
    HelpLine3 = 11,
    Unavailable = 12,
    Score = 13,
    PerfectClear = 14,
    PerfectScore = 15,
    Retry = 16,
    ChangeSong = 17,
}

/// One row per language, fields separated by `_`.
#[derive(Debug, Clone, Default)]
pub struct LanguageTable {
    rows: Vec<Vec<String>>,
    current: usize,
}

impl LanguageTable {
    pub fn parse(content: &str) -> Self {
        let rows = content
            .split('\n')
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .map(|line| line.split('_').map(str::to_string).collect())
            .collect();
        Self { rows, current: 0 }
    }

    /// Missing file is not fatal: every lookup then yields the fallback text.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => {
                let table = Self::parse(&content);
                info!("Loaded {} language(s) from '{}'.", table.len(), path.display());
                table
            }
            Err(e) => {
                warn!("Failed to read language file '{}': {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn select(&mut self, index: usize) {
        self.current = if index < self.rows.len() { index } else { 0 };
    }

    /// Advances to the next language, wrapping to the first.
    pub fn cycle(&mut self) {
        self.current = if self.current + 1 < self.rows.len() { self.current + 1 } else { 0 };
        info!("Language switched to '{}' (font '{}').", self.text(Text::LanguageName), self.font_file());
    }

    pub fn get(&self, index: usize) -> &str {
        self.rows
            .get(self.current)
            .and_then(|row| row.get(index))
            .map_or(FALLBACK_TEXT, String::as_str)
    }

    #[inline(always)]
    pub fn text(&self, text: Text) -> &str {
        self.get(text as usize)
    }

    pub fn font_file(&self) -> &str {
        self.text(Text::FontFile)
    }
}
