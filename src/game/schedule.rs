use crate::game::chart::{EnemySpec, EventKind, SpawnEvent};
use log::{debug, info};

/// Result of one schedule query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScheduleStep {
    Idle,
    Spawn(Vec<EnemySpec>),
    /// Reported once per session, for a terminal event or for running out of events.
    EndOfChart,
}

/// Replays chart events against elapsed session time, one event per query.
#[derive(Clone, Debug)]
pub struct EnemySchedule {
    events: Vec<SpawnEvent>,
    cursor: usize,
    finished: bool,
}

impl EnemySchedule {
    pub fn new(events: Vec<SpawnEvent>) -> Self {
        debug!("Schedule armed with {} event(s).", events.len());
        Self { events, cursor: 0, finished: false }
    }

    /// Next event if it is due at `elapsed_ms`. Never looks past it in the same call.
    pub fn due(&mut self, elapsed_ms: u64) -> ScheduleStep {
        if self.finished {
            return ScheduleStep::Idle;
        }
        let Some(event) = self.events.get(self.cursor) else {
            info!("Chart ran out of events without an end marker; ending session.");
            self.finished = true;
            return ScheduleStep::EndOfChart;
        };
        if event.at_ms > elapsed_ms {
            return ScheduleStep::Idle;
        }
        match &event.kind {
            EventKind::Terminal => {
                debug!("End marker reached at {} ms.", event.at_ms);
                self.finished = true;
                ScheduleStep::EndOfChart
            }
            EventKind::Spawn(specs) => {
                self.cursor += 1;
                ScheduleStep::Spawn(specs.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::chart::Chart;
    use proptest::prelude::*;

    fn schedule(text: &str) -> EnemySchedule {
        EnemySchedule::new(Chart::parse(text).unwrap().events)
    }

    #[test]
    fn one_event_per_query() {
        let mut s = schedule("00:00:10 - 1U1\n00:00:20 - 2L2\n00:09:00 - E");
        assert_eq!(s.due(0), ScheduleStep::Idle);
        assert!(matches!(s.due(1_000), ScheduleStep::Spawn(ref v) if v[0].kind == 1));
        assert!(matches!(s.due(1_000), ScheduleStep::Spawn(ref v) if v[0].kind == 2));
        assert_eq!(s.due(1_000), ScheduleStep::Idle);
        assert_eq!(s.cursor, 2);
    }

    #[test]
    fn terminal_signals_once_and_stops() {
        let mut s = schedule("00:00:00 - E\n00:00:10 - 1U1");
        assert_eq!(s.due(5), ScheduleStep::EndOfChart);
        assert_eq!(s.due(100_000), ScheduleStep::Idle);
        assert_eq!(s.due(100_000), ScheduleStep::Idle);
        assert_eq!(s.cursor, 0);
    }

    #[test]
    fn exhaustion_is_implicit_end() {
        let mut s = schedule("00:00:10 - 1U1");
        assert!(matches!(s.due(100), ScheduleStep::Spawn(_)));
        assert_eq!(s.due(200), ScheduleStep::EndOfChart);
        assert_eq!(s.due(300), ScheduleStep::Idle);
        assert!(s.finished);
    }

    proptest! {
        #[test]
        fn never_emits_future_or_repeated_events(
            times in prop::collection::vec(0u64..10_000, 1..30),
            steps in prop::collection::vec(0u64..700, 1..80),
        ) {
            let mut sorted = times.clone();
            sorted.sort();
            let events: Vec<SpawnEvent> = sorted
                .iter()
                .enumerate()
                .map(|(i, &at_ms)| SpawnEvent {
                    at_ms,
                    kind: EventKind::Spawn(vec![EnemySpec {
                        kind: 1,
                        lane: crate::game::entity::Lane::Upper,
                        speed: (i % 10) as i32 * 10,
                    }]),
                })
                .collect();
            let mut s = EnemySchedule::new(events);
            let mut now = 0;
            let mut emitted = 0usize;
            for step in steps {
                now += step;
                let before = s.cursor;
                if let ScheduleStep::Spawn(_) = s.due(now) {
                    prop_assert!(sorted[before] <= now);
                    prop_assert_eq!(s.cursor, before + 1);
                    emitted += 1;
                }
            }
            prop_assert!(emitted <= sorted.len());
        }
    }
}
