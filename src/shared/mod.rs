//! Shared utilities
//!
//! Cross-layer helpers that don't belong to any single DDD layer.
//!
//! - `trace_id`: request trace id generation
//! - `context`: request context propagation

mod context;
mod trace_id;

pub use context::{get_trace_id, has_context, with_context, TraceContext};
pub use trace_id::{generate_trace_id, parse_trace_id_time, trace_id_to_time_string};
