use crate::game::chart::{is_body_line, SCORE_MARKER};
use crate::game::song::Song;
use log::{info, warn};
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

// --- Records ---

/// Stored score state of a song.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record {
    /// No usable score header: listed, but not playable for scoring.
    Unranked,
    Ranked { best: u32, perfect: u32 },
}

impl Record {
    #[inline(always)]
    pub fn is_ranked(&self) -> bool {
        matches!(self, Record::Ranked { .. })
    }

    pub fn best(&self) -> Option<u32> {
        match self {
            Record::Ranked { best, .. } => Some(*best),
            Record::Unranked => None,
        }
    }

    pub fn perfect(&self) -> Option<u32> {
        match self {
            Record::Ranked { perfect, .. } => Some(*perfect),
            Record::Unranked => None,
        }
    }

    /// Best score has reached the chart's ceiling.
    pub fn is_perfect_clear(&self) -> bool {
        matches!(self, Record::Ranked { best, perfect } if best >= perfect)
    }
}

// --- Errors ---

#[derive(Debug)]
pub enum ScoreError {
    Io(std::io::Error),
    Unranked(String),
}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreError::Io(e) => write!(f, "score file I/O failed: {e}"),
            ScoreError::Unranked(name) => write!(f, "song '{name}' has no score record"),
        }
    }
}

impl Error for ScoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ScoreError::Io(e) => Some(e),
            ScoreError::Unranked(_) => None,
        }
    }
}

impl From<std::io::Error> for ScoreError {
    fn from(e: std::io::Error) -> Self {
        ScoreError::Io(e)
    }
}

// --- Store ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// File rewritten; the song's best is now the committed score.
    Written { previous: u32 },
    /// Score was below the stored best; nothing touched.
    Kept { best: u32 },
}

/// Rebuilds a chart file with a new header, keeping every event line verbatim.
pub fn rewrite_chart(original: &str, best: u32, perfect: u32) -> String {
    let mut out = format!("{SCORE_MARKER}:{best}:{perfect}\n");
    for line in original.split('\n').filter(|line| is_body_line(line)) {
        out.push('\n');
        out.push_str(line);
    }
    out
}

/// Persists best scores into each song's chart file.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScoreStore;

impl ScoreStore {
    pub fn new() -> Self {
        Self
    }

    /// Writes `score` as the new best when it is at least the current best.
    ///
    /// The chart is re-read from disk right before the write. On any failure the
    /// in-memory record is left untouched.
    pub fn commit(&self, song: &mut Song, score: u32) -> Result<CommitOutcome, ScoreError> {
        let Record::Ranked { best, perfect } = song.record else {
            return Err(ScoreError::Unranked(song.name.clone()));
        };
        if score < best {
            info!("Score {} for '{}' is below best {}; not saved.", score, song.name, best);
            return Ok(CommitOutcome::Kept { best });
        }

        self.write(&song.chart_path, score, perfect)?;
        song.record = Record::Ranked { best: score, perfect };
        info!("Saved new best {} for '{}' (was {}).", score, song.name, best);
        Ok(CommitOutcome::Written { previous: best })
    }

    fn write(&self, path: &Path, best: u32, perfect: u32) -> Result<(), ScoreError> {
        let original = fs::read_to_string(path).inspect_err(|e| {
            warn!("Could not re-read chart '{}' before saving: {}", path.display(), e);
        })?;
        let content = rewrite_chart(&original, best, perfect);
        fs::write(path, content).inspect_err(|e| {
            warn!("Could not write score to '{}': {}", path.display(), e);
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrite_replaces_header_only() {
        let original = "score:10:500\n\n00:01:50 - 1U5\n00:02:00 - 2L3, 3U1\n00:09:00 - E";
        assert_eq!(
            rewrite_chart(original, 300, 500),
            "score:300:500\n\n00:01:50 - 1U5\n00:02:00 - 2L3, 3U1\n00:09:00 - E"
        );
    }

    #[test]
    fn rewrite_adds_header_to_headerless_chart() {
        assert_eq!(rewrite_chart("00:00:10 - 1L1\n", 0, 100), "score:0:100\n\n00:00:10 - 1L1");
    }

    #[test]
    fn perfect_clear_needs_ranked_record() {
        assert!(Record::Ranked { best: 500, perfect: 500 }.is_perfect_clear());
        assert!(!Record::Ranked { best: 450, perfect: 500 }.is_perfect_clear());
        assert!(!Record::Unranked.is_perfect_clear());
        assert_eq!(Record::Unranked.best(), None);
    }
}
