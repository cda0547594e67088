//! Response assembly.
//!
//! # Responsibilities
//! - Attach the assignment cookie and content type to rewritten pages
//! - Produce the empty response for paths that are not served
//! - Map upstream failures to gateway errors
//!
//! # Design Decisions
//! - The rewritten body is streamed, never buffered
//! - Error bodies are plain text; details only go to the logs

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::experiment::VariantIndex;
use crate::upstream::FetchError;

pub const CONTENT_TYPE_HTML: &str = "text/html";

/// `200` with an empty body and no extra headers.
pub fn empty_response() -> Response {
    StatusCode::OK.into_response()
}

/// `200` carrying a rewritten variant page and the cookie that pins it.
pub fn variant_response(index: VariantIndex, body: Body) -> Response {
    (
        [
            (header::SET_COOKIE, index.set_cookie_value()),
            (header::CONTENT_TYPE, CONTENT_TYPE_HTML.to_string()),
        ],
        body,
    )
        .into_response()
}

impl IntoResponse for FetchError {
    fn into_response(self) -> Response {
        match self {
            FetchError::Client(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Upstream client unavailable").into_response()
            }
            FetchError::Catalog { .. } | FetchError::MissingVariant { .. } => {
                (StatusCode::BAD_GATEWAY, "Variant catalog unavailable").into_response()
            }
            FetchError::Page { .. } => {
                (StatusCode::BAD_GATEWAY, "Variant page unavailable").into_response()
            }
        }
    }
}
