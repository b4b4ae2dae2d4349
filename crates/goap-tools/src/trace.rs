#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use goap_core::EntityId;

/// The agent-loop milestones that are traced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TraceKind {
    PlanCall,
    PlanFound,
    PlanFailed,
    PlanAborted,
    ActionDone,
    ActionsFinished,
    MoveArrived,
}

impl TraceKind {
    pub fn tag(self) -> &'static str {
        match self {
            TraceKind::PlanCall => "goap.plan.call",
            TraceKind::PlanFound => "goap.plan.found",
            TraceKind::PlanFailed => "goap.plan.failed",
            TraceKind::PlanAborted => "goap.plan.aborted",
            TraceKind::ActionDone => "goap.action.done",
            TraceKind::ActionsFinished => "goap.actions.finished",
            TraceKind::MoveArrived => "goap.move.arrived",
        }
    }
}

/// A small, allocation-friendly trace event.
///
/// This is intentionally "dumb data" so it can be recorded during simulation and later rendered
/// by tooling. `a` is usually the agent's stable id and `b` a target id or a count.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub tick: u64,
    pub tag: Cow<'static, str>,
    pub a: u64,
    pub b: u64,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub label: Option<Cow<'static, str>>,
}

impl TraceEvent {
    pub fn new(tick: u64, tag: impl Into<Cow<'static, str>>) -> Self {
        Self {
            tick,
            tag: tag.into(),
            a: 0,
            b: 0,
            label: None,
        }
    }

    pub fn of(tick: u64, kind: TraceKind) -> Self {
        Self::new(tick, kind.tag())
    }

    pub fn with_a(mut self, a: u64) -> Self {
        self.a = a;
        self
    }

    pub fn with_b(mut self, b: u64) -> Self {
        self.b = b;
        self
    }

    pub fn with_agent(self, agent: impl EntityId) -> Self {
        self.with_a(agent.stable_id())
    }

    pub fn with_target(self, target: impl EntityId) -> Self {
        self.with_b(target.stable_id())
    }

    pub fn with_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn is(&self, kind: TraceKind) -> bool {
        self.tag == kind.tag()
    }
}

pub trait TraceSink {
    fn emit(&mut self, event: TraceEvent);
}

#[derive(Debug, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn emit(&mut self, _event: TraceEvent) {}
}

#[derive(Debug, Default)]
pub struct VecTraceSink {
    pub events: Vec<TraceEvent>,
}

impl TraceSink for VecTraceSink {
    fn emit(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn count(&self, kind: TraceKind) -> usize {
        self.events.iter().filter(|e| e.is(kind)).count()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> + '_ {
        self.events.iter().map(|e| e.tag.as_ref())
    }
}

/// Where an agent's trace events go: an in-memory log, a streaming sink, both, or nowhere.
#[derive(Default)]
pub struct Tracer {
    log: Option<TraceLog>,
    sink: Option<Box<dyn TraceSink>>,
}

impl Tracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect events into an in-memory [`TraceLog`].
    pub fn with_log(mut self) -> Self {
        self.log = Some(TraceLog::default());
        self
    }

    /// Stream events into a user-provided sink.
    pub fn with_sink(mut self, sink: Box<dyn TraceSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.log.is_some() || self.sink.is_some()
    }

    pub fn log(&self) -> Option<&TraceLog> {
        self.log.as_ref()
    }

    pub fn take_log(&mut self) -> Option<TraceLog> {
        self.log.as_mut().map(std::mem::take)
    }

    pub fn emit(&mut self, event: TraceEvent) {
        if let Some(log) = self.log.as_mut() {
            log.push(event.clone());
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.emit(event);
        }
    }
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer")
            .field("log", &self.log)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}
