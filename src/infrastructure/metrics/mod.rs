mod in_memory_metrics;
mod tracing_metrics;

pub use in_memory_metrics::{InMemoryMetricsCollector, MetricsSnapshot};
pub use tracing_metrics::TracingMetricsCollector;
