use std::cell::RefCell;
use std::rc::Rc;

use goap_tools::{TraceEvent, TraceKind, TraceLog, TraceSink, Tracer};

#[derive(Clone, Default)]
struct RcSink(Rc<RefCell<Vec<TraceEvent>>>);

impl TraceSink for RcSink {
    fn emit(&mut self, event: TraceEvent) {
        self.0.borrow_mut().push(event);
    }
}

#[test]
fn emit_writes_to_trace_log_when_present() {
    let mut tracer = Tracer::new().with_log();

    tracer.emit(TraceEvent::new(1, "test").with_a(10).with_b(20));

    let log = tracer.log().unwrap();
    assert_eq!(log.events.len(), 1);
    assert_eq!(log.events[0].tick, 1);
    assert_eq!(log.events[0].tag, "test");
    assert_eq!(log.events[0].a, 10);
    assert_eq!(log.events[0].b, 20);
}

#[test]
fn emit_writes_to_sink_when_present() {
    let handle = RcSink::default();
    let shared = handle.0.clone();
    let mut tracer = Tracer::new().with_sink(Box::new(handle));

    tracer.emit(TraceEvent::of(2, TraceKind::PlanCall).with_agent(7u64));

    assert!(tracer.log().is_none());
    let events = shared.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].tag, "goap.plan.call");
    assert_eq!(events[0].a, 7);
}

#[test]
fn emit_writes_to_both_log_and_sink_when_both_present() {
    let handle = RcSink::default();
    let shared = handle.0.clone();
    let mut tracer = Tracer::new().with_log().with_sink(Box::new(handle));

    tracer.emit(TraceEvent::of(3, TraceKind::ActionDone).with_label("Collect"));

    assert_eq!(tracer.log().unwrap().count(TraceKind::ActionDone), 1);
    let events = shared.borrow();
    assert_eq!(events[0].label.as_deref(), Some("Collect"));
}

#[test]
fn disabled_tracer_drops_events() {
    let mut tracer = Tracer::new();
    assert!(!tracer.is_enabled());
    tracer.emit(TraceEvent::of(1, TraceKind::PlanFailed));
    assert!(tracer.take_log().is_none());
}

#[test]
fn take_log_leaves_an_empty_log_behind() {
    let mut tracer = Tracer::new().with_log();
    tracer.emit(TraceEvent::of(1, TraceKind::PlanFound));
    let taken = tracer.take_log().unwrap();
    assert_eq!(taken.tags().collect::<Vec<_>>(), vec!["goap.plan.found"]);
    assert_eq!(tracer.log(), Some(&TraceLog::default()));
}
