#![cfg(feature = "serde")]

use goap_tools::{TraceEvent, TraceKind, TraceLog};

#[test]
fn trace_log_json_roundtrip() {
    let log = TraceLog {
        events: vec![
            TraceEvent::of(1, TraceKind::PlanCall).with_a(10).with_b(20),
            TraceEvent::of(2, TraceKind::PlanFound).with_a(1).with_b(2),
            TraceEvent::of(3, TraceKind::ActionDone).with_a(3).with_label("PickUpTool"),
        ],
    };

    let json = serde_json::to_string(&log).expect("serialize");
    let roundtrip: TraceLog = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(roundtrip, log);
}

#[test]
fn missing_label_is_omitted() {
    let event = TraceEvent::of(4, TraceKind::MoveArrived);
    let json = serde_json::to_string(&event).expect("serialize");
    assert!(!json.contains("label"));
}
