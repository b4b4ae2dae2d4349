//! Tooling primitives for goal-oriented agents (tracing/debug).

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{NullTraceSink, TraceEvent, TraceKind, TraceLog, TraceSink, Tracer, VecTraceSink};
