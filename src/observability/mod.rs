//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters and gauges via the `metrics` facade)
//!
//! Consumers:
//!     → stdout (fmt subscriber, filtered by RUST_LOG or --log-level)
//!     → GET /metrics on the internal port (Prometheus text format)
//! ```
//!
//! # Design Decisions
//! - Recording a metric without an installed recorder is a no-op
//! - RUST_LOG always wins over the configured level

pub mod logging;
pub mod metrics;
