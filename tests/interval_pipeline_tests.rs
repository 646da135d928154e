//! End-to-end pipeline tests: trace source -> calculator -> report

use std::collections::HashMap;
use std::io::Cursor;

use intervalo::calculator::{
    Calculator, CheckpointIntervalCalculator, LatencyCalculator, ThreadIntervalCalculator,
};
use intervalo::checkpoint::CheckpointIndex;
use intervalo::event::{FieldValue, TraceEvent};
use intervalo::report;
use intervalo::source::JsonlTraceSource;

fn event(pid: i32, thread_id: u64, name: &str, timestamp: u64) -> TraceEvent {
    TraceEvent {
        pid,
        thread_id,
        name: name.to_string(),
        extra_name: None,
        timestamp,
        fields: HashMap::new(),
    }
}

fn run(calc: &mut dyn Calculator, events: &[TraceEvent]) {
    for ev in events {
        calc.observe(ev);
    }
}

#[test]
fn test_declared_list_example() {
    // declared ["a:x","a:y","a:z"], events (a:x,10) (a:y,15) (a:z,25)
    // => {"a:x-a:y":[5], "a:y-a:z":[10]}
    let index = CheckpointIndex::build(&["a:x", "a:y", "a:z"]).unwrap();
    let mut calc = CheckpointIntervalCalculator::new(index);
    run(
        &mut calc,
        &[
            event(1, 100, "a:x", 10),
            event(1, 100, "a:y", 15),
            event(1, 100, "a:z", 25),
        ],
    );

    let series = &calc.processes()[&1];
    assert_eq!(series.get("a:x-a:y"), Some(&[5.0][..]));
    assert_eq!(series.get("a:y-a:z"), Some(&[10.0][..]));
}

#[test]
fn test_declared_list_example_with_missing_middle() {
    // same list, y missing => both pair labels stay empty
    let index = CheckpointIndex::build(&["a:x", "a:y", "a:z"]).unwrap();
    let mut calc = CheckpointIntervalCalculator::new(index);
    run(
        &mut calc,
        &[event(1, 100, "a:x", 10), event(1, 100, "a:z", 30)],
    );

    let series = &calc.processes()[&1];
    assert_eq!(series.get("a:x-a:y"), Some(&[][..]));
    assert_eq!(series.get("a:y-a:z"), Some(&[][..]));
}

#[test]
fn test_jsonl_source_feeds_calculator() {
    let input = concat!(
        r#"{"pid":1,"thread_id":100,"name":"a:x","timestamp":10}"#,
        "\n",
        r#"{"pid":1,"thread_id":100,"name":"a:y","timestamp":15}"#,
        "\n",
        r#"{"pid":1,"thread_id":100,"name":"a:z","timestamp":25}"#,
        "\n",
    );
    let index = CheckpointIndex::build(&["a:x", "a:y", "a:z"]).unwrap();
    let mut calc = CheckpointIntervalCalculator::new(index);
    for item in JsonlTraceSource::new(Cursor::new(input)) {
        calc.observe(&item.unwrap());
    }

    let out = report::render_text(calc.processes(), false);
    assert!(out.contains("=========1============"));
    assert!(out.contains("a:x-a:y,5,5"));
    assert!(out.contains("a:y-a:z,10,10"));
}

#[test]
fn test_cross_thread_identity_handoff_via_json_fields() {
    // the identity surfaces only on the second event, completion happens on
    // a different thread entirely
    let input = concat!(
        r#"{"pid":1,"thread_id":100,"name":"a:x","timestamp":10}"#,
        "\n",
        r#"{"pid":1,"thread_id":100,"name":"a:y","timestamp":15,"fields":{"num":1,"tid":9}}"#,
        "\n",
        r#"{"pid":1,"thread_id":101,"name":"a:z","timestamp":25,"fields":{"num":1,"tid":9}}"#,
        "\n",
    );
    let index = CheckpointIndex::build(&["a:x", "a:y", "a:z"]).unwrap();
    let mut calc = CheckpointIntervalCalculator::new(index);
    for item in JsonlTraceSource::new(Cursor::new(input)) {
        calc.observe(&item.unwrap());
    }

    let series = &calc.processes()[&1];
    assert_eq!(series.get("a:x-a:y"), Some(&[5.0][..]));
    assert_eq!(series.get("a:y-a:z"), Some(&[10.0][..]));
    assert_eq!(calc.hint_count(), 0);
}

#[test]
fn test_interleaved_requests_stay_separate() {
    // two requests progress concurrently on different threads
    let index = CheckpointIndex::build(&["a:x", "a:z"]).unwrap();
    let mut calc = CheckpointIntervalCalculator::new(index);
    run(
        &mut calc,
        &[
            event(1, 100, "a:x", 10),
            event(1, 200, "a:x", 12),
            event(1, 200, "a:z", 20),
            event(1, 100, "a:z", 40),
        ],
    );

    let series = &calc.processes()[&1];
    assert_eq!(series.get("a:x-a:z"), Some(&[8.0, 30.0][..]));
}

#[test]
fn test_latency_mode_end_to_end() {
    let index = CheckpointIndex::build(&["osd:log_op_stats:latency"]).unwrap();
    let mut calc = LatencyCalculator::new(index);
    let mut ev = event(1, 100, "osd:log_op_stats", 50);
    ev.fields
        .insert("latency".to_string(), FieldValue::Float(1.25));
    calc.observe(&ev);

    let out = report::render_csv(calc.processes(), false);
    assert!(out.contains("1,osd:log_op_stats:latency,1,1.25,1.25"));
}

#[test]
fn test_thread_interval_mode_end_to_end() {
    let index = CheckpointIndex::build::<&str>(&[]).unwrap();
    let mut calc = ThreadIntervalCalculator::new(index);
    run(
        &mut calc,
        &[
            event(1, 100, "timer:tick", 10),
            event(1, 100, "timer:tick", 15),
            event(1, 100, "timer:tick", 27),
        ],
    );

    let series = &calc.processes()[&1];
    assert_eq!(series.get("timer:tick-100"), Some(&[5.0, 12.0][..]));
}

#[test]
fn test_independent_engine_instances_share_nothing() {
    let build = || {
        CheckpointIntervalCalculator::new(CheckpointIndex::build(&["a:x", "a:z"]).unwrap())
    };
    let mut first = build();
    let mut second = build();

    first.observe(&event(1, 100, "a:x", 10));
    // the second channel completes a round for the same pid and thread ids
    second.observe(&event(1, 100, "a:x", 1000));
    second.observe(&event(1, 100, "a:z", 1001));

    assert_eq!(second.processes()[&1].get("a:x-a:z"), Some(&[1.0][..]));
    // the first engine still has its round in flight, untouched
    assert_eq!(first.inflight_rounds(1), 1);
    assert_eq!(first.processes()[&1].get("a:x-a:z"), Some(&[][..]));
}
