use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use approx::assert_abs_diff_eq;
use rusty_ramp::data::loader::{load_csv_reader, load_json_str};
use rusty_ramp::data::parse::parse_row;
use rusty_ramp::engine::Playback;
use rusty_ramp::{
    Cell, EmitError, ManualScheduler, Phase, Player, PlayerConfig, Record, Recorder,
    ThreadScheduler,
};

fn config(tick_ms: u64, ramp_ms: u64) -> PlayerConfig {
    PlayerConfig { tick_ms, ramp_ms }
}

fn manual_player(cfg: PlayerConfig) -> (Player<ManualScheduler>, ManualScheduler, Recorder) {
    let clock = ManualScheduler::new();
    let rec = Recorder::default();
    (Player::new(cfg, clock.clone(), rec.clone()), clock, rec)
}

#[test]
fn reference_scenario_from_csv() {
    let ds = load_csv_reader("x,label\n0,start\n10,end\n".as_bytes()).unwrap();
    let (mut player, clock, rec) = manual_player(config(16, 100));
    player.load_dataset(ds);
    player.start().unwrap();
    clock.advance(20);

    let records = rec.records();
    let xs: Vec<f64> = records
        .iter()
        .map(|r| r.get("x").and_then(Cell::as_f64).unwrap())
        .collect();
    let expected = [0.0, 1.6, 3.2, 4.8, 6.4, 8.0, 9.6];
    assert_eq!(xs.len(), expected.len());
    for (got, want) in xs.iter().zip(expected) {
        assert_abs_diff_eq!(*got, want, epsilon = 1e-9);
    }
    assert!(records
        .iter()
        .all(|r| r.get("label") == Some(&Cell::Text("start".into()))));

    let state = player.snapshot();
    assert_eq!(state.phase(), Phase::Stopped);
    assert_eq!(
        state.settled(),
        Some(&vec![Cell::Numeric(10.0), Cell::Text("end".into())])
    );
    assert!(rec.finished());
}

#[test]
fn emit_count_stabilises_after_end_of_data() {
    let ds = load_json_str(r#"{"columns":["v"],"rows":[[0],[1],[2],[3]]}"#).unwrap();
    let (mut player, clock, rec) = manual_player(config(16, 48));
    player.load_dataset(ds);
    player.start().unwrap();

    clock.advance(100);
    let settled_count = rec.len();
    // Three ramps of three ticks each.
    assert_eq!(settled_count, 9);
    clock.advance(100);
    assert_eq!(rec.len(), settled_count);
    assert!(!player.is_running());
}

#[test]
fn single_row_holds_until_stopped() {
    let ds = load_csv_reader("a,b\n2.5,hold\n".as_bytes()).unwrap();
    let (mut player, clock, rec) = manual_player(config(16, 100));
    player.load_dataset(ds);
    player.start().unwrap();
    assert_eq!(player.phase(), Phase::Holding);

    clock.advance(500);
    assert_eq!(rec.len(), 500);
    let expected = Record::new(
        &["a".to_string(), "b".to_string()],
        vec![Cell::Numeric(2.5), Cell::Text("hold".into())],
    );
    assert!(rec.records().iter().all(|r| *r == expected));

    player.stop();
    clock.advance(10);
    assert_eq!(rec.len(), 500);
}

#[test]
fn shrinking_ramp_completes_on_next_tick() {
    let ds = load_csv_reader("x\n0\n100\n".as_bytes()).unwrap();
    let (mut player, clock, rec) = manual_player(config(16, 1000));
    player.load_dataset(ds);
    player.start().unwrap();
    clock.advance(5);
    player.set_ramp_ms(0);
    assert_eq!(player.ramp_ms(), 1);
    clock.advance(1);

    let last = rec.records().pop().unwrap();
    assert_eq!(last.get("x"), Some(&Cell::Numeric(100.0)));
    assert!(!player.is_running());
}

#[test]
fn failing_emitter_does_not_halt_ticking() {
    let ds = load_csv_reader("x\n0\n1\n".as_bytes()).unwrap();
    let clock = ManualScheduler::new();
    let mut calls = 0u32;
    let flaky = move |_: &Record| -> Result<(), EmitError> {
        calls += 1;
        if calls % 2 == 0 {
            Err(EmitError::Rejected(format!("call {calls}")))
        } else {
            Ok(())
        }
    };
    let mut player = Player::new(config(10, 40), clock.clone(), flaky);
    player.load_dataset(ds);
    player.start().unwrap();
    clock.advance(10);

    let stats = player.stats();
    assert_eq!(stats.ticks, 4);
    assert_eq!(stats.emitted, 2);
    assert_eq!(stats.emit_failures, 2);
    assert_eq!(stats.completed_runs, 1);
}

#[test]
fn endpoints_are_exact_for_parsed_rows() {
    let a = parse_row(&["0.1", "x", "-7.25"]);
    let b = parse_row(&["0.3", "y", "1e-3"]);
    let columns: Vec<String> = ["p", "q", "r"].iter().map(|s| s.to_string()).collect();
    let raw = vec![
        vec!["0.1".to_string(), "x".to_string(), "-7.25".to_string()],
        vec!["0.3".to_string(), "y".to_string(), "1e-3".to_string()],
    ];
    let ds = Arc::new(rusty_ramp::Dataset::new(columns, raw).unwrap());

    let mut pb = Playback::new(ds, 16, 32);
    pb.start().unwrap();
    assert_eq!(pb.settled(), Some(&a));
    let rec = Recorder::default();
    let mut sink = rec.clone();
    pb.tick(&mut sink).unwrap();
    pb.tick(&mut sink).unwrap();
    assert_eq!(pb.settled(), Some(&b));
    let first: Vec<Cell> = rec.records()[0].fields().iter().map(|(_, c)| c.clone()).collect();
    assert_eq!(first, a);
}

#[test]
fn thread_scheduler_plays_to_completion() {
    let ds = load_csv_reader("x\n0\n1\n2\n".as_bytes()).unwrap();
    let rec = Recorder::default();
    let mut player = Player::new(config(1, 3), ThreadScheduler, rec.clone());
    player.load_dataset(ds);
    player.start().unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while player.is_running() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert!(!player.is_running());
    let count = rec.len();
    assert_eq!(count, 6);
    thread::sleep(Duration::from_millis(20));
    assert_eq!(rec.len(), count);
    assert!(rec.finished());
}

#[test]
fn thread_scheduler_stop_halts_output() {
    let ds = load_csv_reader("x\n0\n".as_bytes()).unwrap();
    let rec = Recorder::default();
    let mut player = Player::new(config(1, 100), ThreadScheduler, rec.clone());
    player.load_dataset(ds);
    player.start().unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while rec.len() < 3 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(2));
    }
    player.stop();
    let count = rec.len();
    thread::sleep(Duration::from_millis(30));
    assert_eq!(rec.len(), count);
    assert_eq!(player.phase(), Phase::Stopped);
}
