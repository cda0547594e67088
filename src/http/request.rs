//! Request inspection.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) unless the client sent one
//! - Decide whether a request targets the site root
//! - Collect the `Cookie` header(s) for the cookie resolver

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates v4 UUID request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// The request ID assigned by the request ID layer, for log fields.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// True only when the request target is exactly `/`.
///
/// The target (path and query) is split on `/`; anything other than a single
/// empty segment is not the root, so `/?x=1` and `//` are rejected too.
pub fn is_site_root(uri: &Uri) -> bool {
    let target = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let mut segments = target.split('/').skip(1);
    matches!((segments.next(), segments.next()), (Some(""), None))
}

/// All `Cookie` headers joined as one `;`-separated string.
///
/// HTTP/2 clients may split cookies across several header fields. If any of
/// them is not visible ASCII the whole header counts as absent.
pub fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let values = headers
        .get_all(header::COOKIE)
        .iter()
        .map(HeaderValue::to_str)
        .collect::<Result<Vec<&str>, _>>()
        .ok()?;

    if values.is_empty() {
        None
    } else {
        Some(values.join("; "))
    }
}
