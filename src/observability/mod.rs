//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request handler produces:
//!     → logging.rs (structured log events, request ID field)
//!     → metrics.rs (request counters, latency, variant assignments)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging via tracing for machine parsing
//! - Request ID flows through every log line of a request
//! - Metrics are cheap (atomic increments) and the exporter is optional

pub mod logging;
pub mod metrics;
