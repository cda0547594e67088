//! Sticky A/B variant edge handler.
//!
//! Serves the site root as one of two variant pages. The variant is replayed
//! from the `james_yummy_cookie` cookie or drawn at random, the page is
//! fetched from the URL the variant catalog lists, and four elements of the
//! page are rewritten while it streams through.
//!
//! ```text
//!   Client ──▶ http::server ──▶ experiment (cookie → assignment)
//!                   │
//!                   ├──▶ upstream (catalog, then page stream)
//!                   │
//!   Client ◀── http::response ◀── rewrite (lol_html, per-request context)
//! ```

pub mod config;
pub mod experiment;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rewrite;
pub mod upstream;

pub use config::EdgeConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
