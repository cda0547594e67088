//! A/B experiment subsystem.
//!
//! # Data Flow
//! ```text
//! Cookie header
//!     → cookie.rs (locate james_yummy_cookie, accept only 0 or 1)
//!     → selector.rs (replay cookie, or draw uniformly)
//!     → Assignment { index, RenderingContext }
//!     → rewrite engine + Set-Cookie
//! ```
//!
//! # Design Decisions
//! - No server-side assignment state; the cookie is the only memory
//! - Malformed cookies are indistinguishable from missing ones
//! - RenderingContext is a per-request value, never shared between requests

pub mod cookie;
pub mod selector;

pub use cookie::{resolve_cookie, VariantIndex, COOKIE_NAME};
pub use selector::{select_variant, Assignment, RenderingContext};
