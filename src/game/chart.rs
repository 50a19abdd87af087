use crate::config::SPEED_MULTIPLIER;
use crate::game::entity::Lane;
use crate::game::scores::Record;
use log::{debug, warn};
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

/// Prefix of the optional first line holding `score:<best>:<perfect>`.
pub const SCORE_MARKER: &str = "score";
const TIME_SEPARATOR: &str = " - ";
const SPEC_SEPARATOR: &str = ", ";

// --- Data ---

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemySpec {
    pub kind: u8,
    pub lane: Lane,
    /// Pixels per tick (chart digit already scaled).
    pub speed: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    Spawn(Vec<EnemySpec>),
    Terminal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnEvent {
    pub at_ms: u64,
    pub kind: EventKind,
}

impl SpawnEvent {
    #[inline(always)]
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, EventKind::Terminal)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chart {
    pub record: Record,
    pub events: Vec<SpawnEvent>,
}

// --- Errors ---

#[derive(Debug)]
pub enum ChartError {
    Io(std::io::Error),
    MissingDelimiter { line: usize },
    BadTime { line: usize, field: String },
    BadSpec { line: usize, token: String },
    EmptyEvent { line: usize },
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartError::Io(e) => write!(f, "could not read chart: {e}"),
            ChartError::MissingDelimiter { line } => write!(f, "line {line}: missing '{TIME_SEPARATOR}' delimiter"),
            ChartError::BadTime { line, field } => write!(f, "line {line}: bad time '{field}'"),
            ChartError::BadSpec { line, token } => write!(f, "line {line}: bad enemy spec '{token}'"),
            ChartError::EmptyEvent { line } => write!(f, "line {line}: event has no enemy specs"),
        }
    }
}

impl Error for ChartError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ChartError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ChartError {
    fn from(e: std::io::Error) -> Self {
        ChartError::Io(e)
    }
}

// --- Parsing ---

/// True for lines the parser skips and a commit drops: blanks and the score header.
#[inline(always)]
pub fn is_body_line(line: &str) -> bool {
    !line.is_empty() && !line.starts_with(SCORE_MARKER)
}

/// Reads `score:<best>:<perfect>` from the first line. Anything else is unranked.
pub fn parse_header(first_line: &str) -> Record {
    let line = first_line.trim_end_matches('\r');
    let Some(rest) = line.strip_prefix(SCORE_MARKER) else {
        return Record::Unranked;
    };
    let mut fields = rest.split(':');
    if fields.next() != Some("") {
        return Record::Unranked;
    }
    let best = fields.next().and_then(|s| s.trim().parse::<u32>().ok());
    let perfect = fields.next().and_then(|s| s.trim().parse::<u32>().ok());
    match (best, perfect, fields.next()) {
        (Some(best), Some(perfect), None) => Record::Ranked { best, perfect },
        _ => {
            debug!("Unusable score header '{line}', treating chart as unranked.");
            Record::Unranked
        }
    }
}

fn parse_time(field: &str, line: usize) -> Result<u64, ChartError> {
    let bad = || ChartError::BadTime { line, field: field.to_string() };
    let parts: Vec<&str> = field.trim().split(':').collect();
    let [minutes, seconds, ticks] = parts.as_slice() else {
        return Err(bad());
    };
    let scaled = |s: &str, unit_ms: u64| {
        s.parse::<u64>().ok().and_then(|v| v.checked_mul(unit_ms)).ok_or_else(bad)
    };
    let (minutes, seconds, ticks) = (scaled(*minutes, 60_000)?, scaled(*seconds, 1_000)?, scaled(*ticks, 10)?);
    minutes.checked_add(seconds).and_then(|ms| ms.checked_add(ticks)).ok_or_else(bad)
}

fn parse_spec(token: &str, line: usize) -> Result<Option<EnemySpec>, ChartError> {
    let bad = || ChartError::BadSpec { line, token: token.to_string() };
    let mut chars = token.chars();
    let kind = match chars.next() {
        Some('E') => return Ok(None),
        Some(c @ '1'..='3') => c as u8 - b'0',
        _ => return Err(bad()),
    };
    let lane = chars.next().map(Lane::from_chart_char).ok_or_else(bad)?;
    let speed = chars.next().and_then(|c| c.to_digit(10)).ok_or_else(bad)?;
    if chars.next().is_some() {
        return Err(bad());
    }
    Ok(Some(EnemySpec { kind, lane, speed: speed as i32 * SPEED_MULTIPLIER }))
}

fn parse_event(text: &str, line: usize) -> Result<SpawnEvent, ChartError> {
    let (time, specs) = text.split_once(TIME_SEPARATOR).ok_or(ChartError::MissingDelimiter { line })?;
    let at_ms = parse_time(time, line)?;

    let mut enemies = Vec::new();
    let mut terminal = false;
    for token in specs.split(SPEC_SEPARATOR).map(str::trim).filter(|t| !t.is_empty()) {
        match parse_spec(token, line)? {
            Some(spec) => enemies.push(spec),
            None => terminal = true,
        }
    }

    let kind = if terminal {
        EventKind::Terminal
    } else if enemies.is_empty() {
        return Err(ChartError::EmptyEvent { line });
    } else {
        EventKind::Spawn(enemies)
    };
    Ok(SpawnEvent { at_ms, kind })
}

impl Chart {
    /// Header problems degrade to unranked; body problems reject the chart.
    pub fn parse(text: &str) -> Result<Chart, ChartError> {
        let record = text.split('\n').next().map_or(Record::Unranked, parse_header);

        let mut events = Vec::new();
        for (index, raw) in text.split('\n').enumerate() {
            let line = raw.trim_end_matches('\r');
            if !is_body_line(line) {
                continue;
            }
            events.push(parse_event(line, index + 1)?);
        }

        if events.windows(2).any(|w| w[1].at_ms < w[0].at_ms) {
            warn!("Chart events are not in time order; they will be replayed as written.");
        }
        Ok(Chart { record, events })
    }

    pub fn load(path: &Path) -> Result<Chart, ChartError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn has_terminal(&self) -> bool {
        self.events.iter().any(SpawnEvent::is_terminal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_variants() {
        assert_eq!(parse_header("score:1200:3000"), Record::Ranked { best: 1200, perfect: 3000 });
        assert_eq!(parse_header("score:0:0\r"), Record::Ranked { best: 0, perfect: 0 });
        assert_eq!(parse_header("score:-1:-1"), Record::Unranked);
        assert_eq!(parse_header("score:12"), Record::Unranked);
        assert_eq!(parse_header("scores:1:2"), Record::Unranked);
        assert_eq!(parse_header("00:01:50 - 1U5"), Record::Unranked);
    }

    #[test]
    fn time_triple_uses_ten_ms_ticks() {
        let chart = Chart::parse("00:01:50 - 1U5").unwrap();
        assert_eq!(
            chart.events,
            vec![SpawnEvent {
                at_ms: 1500,
                kind: EventKind::Spawn(vec![EnemySpec { kind: 1, lane: Lane::Upper, speed: 50 }]),
            }]
        );
        assert_eq!(chart.record, Record::Unranked);
    }

    #[test]
    fn multiple_specs_and_lower_lane() {
        let chart = Chart::parse("score:0:300\n\n01:02:03 - 2L3, 3x9\n").unwrap();
        assert_eq!(chart.events[0].at_ms, 62_030);
        let EventKind::Spawn(specs) = &chart.events[0].kind else { panic!("expected spawn") };
        assert_eq!(specs[0], EnemySpec { kind: 2, lane: Lane::Lower, speed: 30 });
        assert_eq!(specs[1], EnemySpec { kind: 3, lane: Lane::Lower, speed: 90 });
    }

    #[test]
    fn any_end_marker_makes_event_terminal() {
        let chart = Chart::parse("00:00:00 - 1U1\n00:05:00 - E\n00:06:00 - 1U1, E").unwrap();
        assert!(!chart.events[0].is_terminal());
        assert!(chart.events[1].is_terminal());
        assert!(chart.events[2].is_terminal());
        assert!(chart.has_terminal());
    }

    #[test]
    fn oversized_time_is_rejected_not_wrapped() {
        let text = "score:0:100\n300000000000000000:00:00 - 1U1\n00:01:00 - E";
        assert!(matches!(Chart::parse(text), Err(ChartError::BadTime { line: 2, .. })));
        let max_ticks = format!("00:00:{} - 1U1", u64::MAX);
        assert!(matches!(Chart::parse(&max_ticks), Err(ChartError::BadTime { line: 1, .. })));
        let sum = format!("00:{}:99 - 1U1", u64::MAX / 1_000);
        assert!(matches!(Chart::parse(&sum), Err(ChartError::BadTime { .. })));
    }

    #[test]
    fn malformed_body_lines_are_rejected() {
        assert!(matches!(Chart::parse("00:01:50 1U5"), Err(ChartError::MissingDelimiter { line: 1 })));
        assert!(matches!(Chart::parse("score:1:1\n00:xx:50 - 1U5"), Err(ChartError::BadTime { line: 2, .. })));
        assert!(matches!(Chart::parse("00:01:50 - 4U5"), Err(ChartError::BadSpec { .. })));
        assert!(matches!(Chart::parse("00:01:50 - 1UX"), Err(ChartError::BadSpec { .. })));
        assert!(matches!(Chart::parse("00:01:50 - 1U"), Err(ChartError::BadSpec { .. })));
        assert!(matches!(Chart::parse("00:01:50 - "), Err(ChartError::EmptyEvent { .. })));
    }
}
