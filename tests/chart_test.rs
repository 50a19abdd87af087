use muserush::game::chart::{Chart, EnemySpec, EventKind};
use muserush::game::entity::Lane;
use muserush::game::schedule::{EnemySchedule, ScheduleStep};
use muserush::game::scores::Record;
use muserush::game::song::SongLibrary;
use std::fs;

const CHART: &str = "score:1200:3000\r\n\r\n00:01:50 - 1U5\r\n00:02:00 - 2L3, 3U1\r\n00:09:00 - E\r\n";

#[test]
fn crlf_chart_parses_and_schedules() {
    let chart = Chart::parse(CHART).unwrap();
    assert_eq!(chart.record, Record::Ranked { best: 1200, perfect: 3000 });
    assert_eq!(chart.events.len(), 3);
    assert_eq!(chart.events[0].at_ms, 1500);
    assert!(chart.has_terminal());

    let mut schedule = EnemySchedule::new(chart.events);
    assert_eq!(schedule.due(1499), ScheduleStep::Idle);
    assert_eq!(
        schedule.due(1500),
        ScheduleStep::Spawn(vec![EnemySpec { kind: 1, lane: Lane::Upper, speed: 50 }])
    );
    let ScheduleStep::Spawn(pair) = schedule.due(2000) else { panic!("expected spawn") };
    assert_eq!(pair.len(), 2);
    assert_eq!(schedule.due(8999), ScheduleStep::Idle);
    assert_eq!(schedule.due(9000), ScheduleStep::EndOfChart);
    assert_eq!(schedule.due(9016), ScheduleStep::Idle);
}

#[test]
fn terminal_marker_wins_over_specs() {
    let chart = Chart::parse("00:00:50 - 1U1, E").unwrap();
    assert_eq!(chart.events[0].kind, EventKind::Terminal);
}

#[test]
fn library_lists_songs_sorted_with_records() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b.ogg"), b"").unwrap();
    fs::write(dir.path().join("b.ini"), CHART).unwrap();
    fs::write(dir.path().join("a.wav"), b"").unwrap();
    fs::write(dir.path().join("c.ogg"), b"").unwrap();
    fs::write(dir.path().join("c.ini"), "score:0:10\n00:01 - 1U1").unwrap();
    fs::write(dir.path().join("d.wav"), b"").unwrap();
    fs::write(dir.path().join("d.ini"), "score:7:70\n00:01:00 - E").unwrap();
    fs::write(dir.path().join("notes.txt"), b"").unwrap();

    let library = SongLibrary::scan(dir.path());
    let names: Vec<&str> = library.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c", "d"]);
    assert_eq!(library.get(1).map(|s| s.record), Some(Record::Unranked));
    assert_eq!(library.get(2).map(|s| s.record), Some(Record::Ranked { best: 1200, perfect: 3000 }));
    assert_eq!(library.get(3).map(|s| s.record), Some(Record::Unranked));
    assert_eq!(library.get(4).map(|s| s.record), Some(Record::Ranked { best: 7, perfect: 70 }));
    assert!(library.get(0).is_none());
}
