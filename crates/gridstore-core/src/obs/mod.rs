//! Observability: store events and the sinks that receive them.
//!
//! Components never reach for a global; the sink is handed to them by the
//! store that owns them. Human-readable warnings go through `tracing`.

mod sink;

pub use sink::{CountingSink, EventReport, MetricsSink, StoreEvent, TracingSink};
