//! Streaming HTML rewriting subsystem.
//!
//! # Data Flow
//! ```text
//! variant page body (byte stream)
//!     → engine.rs (lol_html parser on a blocking worker)
//!     → bindings.rs (title / h1#title / a#url / p#description handlers)
//!     → rewritten byte stream → response body
//! ```
//!
//! # Design Decisions
//! - Binding table is fixed at startup; only the RenderingContext varies
//! - Handlers are a closed enum, one variant per selector
//! - Document is never materialized; chunks flow through bounded channels

pub mod bindings;
pub mod engine;

pub use bindings::ElementBinding;
pub use engine::{RewriteError, VariantRewriter};
