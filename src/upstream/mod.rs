//! Upstream origin subsystem.
//!
//! # Data Flow
//! ```text
//! GET catalog.url → VariantCatalog { variants: [url, url] }
//!     → VariantIndex picks one URL
//!     → GET page → byte stream handed to the rewrite engine
//! ```
//!
//! # Design Decisions
//! - The two fetches are sequential; the page URL comes from the catalog
//! - Non-success statuses count as fetch failures
//! - No retries; a failed fetch fails the request

pub mod client;

pub use client::{FetchError, VariantCatalog, VariantClient};
