//! End-to-end tests: edge service in front of a mock origin.

use reqwest::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use reqwest::StatusCode;
use std::time::Duration;

mod common;

use common::PAGE_MARKERS;

const REVISIT: &str = "You have visited this page before, so the same variant is shown.";

struct Served {
    status: StatusCode,
    set_cookie: Option<String>,
    content_type: Option<String>,
    body: String,
}

async fn get(url: &str, cookie: Option<&str>) -> Served {
    let mut request = common::client().get(url);
    if let Some(cookie) = cookie {
        request = request.header(COOKIE, cookie);
    }
    let response = request.send().await.expect("edge unreachable");

    let header = |name| {
        response
            .headers()
            .get(name)
            .map(|v: &reqwest::header::HeaderValue| v.to_str().unwrap().to_string())
    };
    let status = response.status();
    let set_cookie = header(SET_COOKIE);
    let content_type = header(CONTENT_TYPE);
    let body = response.text().await.unwrap();

    Served {
        status,
        set_cookie,
        content_type,
        body,
    }
}

/// The variant number (1 or 2) pinned by a `Set-Cookie` value.
fn pinned_variant(set_cookie: &str) -> usize {
    match set_cookie {
        "james_yummy_cookie=0" => 1,
        "james_yummy_cookie=1" => 2,
        other => panic!("unexpected Set-Cookie {:?}", other),
    }
}

#[tokio::test]
async fn returning_visitor_gets_rewritten_second_variant() {
    let origin = common::start_origin().await;
    let edge = common::start_edge(origin.url("/api/variants")).await;

    let served = get(&edge.url("/"), Some("james_yummy_cookie=1")).await;

    assert_eq!(served.status, StatusCode::OK);
    assert_eq!(served.set_cookie.as_deref(), Some("james_yummy_cookie=1"));
    assert_eq!(served.content_type.as_deref(), Some("text/html"));
    assert!(served.body.contains(PAGE_MARKERS[1]));
    assert!(served.body.contains("<title>Special Title for Variant 2</title>"));
    assert!(served
        .body
        .contains(r#"<h1 id="title">My Awesome h1 for Variant 2</h1>"#));
    assert!(served.body.contains(
        r#"<a id="url" href="https://github.com/jameszhao01">Check out my Github!!!</a>"#
    ));
    assert!(served.body.contains(&format!(
        r#"<p id="description">My paragraph for Variant 2. {}</p>"#,
        REVISIT
    )));
}

#[tokio::test]
async fn fresh_visitor_is_assigned_then_pinned() {
    let origin = common::start_origin().await;
    let edge = common::start_edge(origin.url("/api/variants")).await;

    let first = get(&edge.url("/"), None).await;
    assert_eq!(first.status, StatusCode::OK);
    let cookie = first.set_cookie.expect("assignment cookie");
    let variant = pinned_variant(&cookie);

    assert!(first.body.contains(PAGE_MARKERS[variant - 1]));
    assert!(first.body.contains(&format!(
        r#"<p id="description">My paragraph for Variant {}. </p>"#,
        variant
    )));
    assert!(!first.body.contains(REVISIT));

    for _ in 0..3 {
        let again = get(&edge.url("/"), Some(&cookie)).await;
        assert_eq!(again.set_cookie.as_deref(), Some(cookie.as_str()));
        assert!(again.body.contains(PAGE_MARKERS[variant - 1]));
        assert!(again.body.contains(&format!(
            "<title>Special Title for Variant {}</title>",
            variant
        )));
        assert!(again.body.contains(REVISIT));
    }
}

#[tokio::test]
async fn cookie_is_found_among_others() {
    let origin = common::start_origin().await;
    let edge = common::start_edge(origin.url("/api/variants")).await;

    let served = get(
        &edge.url("/"),
        Some("theme=dark ;   james_yummy_cookie=0  ; lang=en"),
    )
    .await;
    assert_eq!(served.set_cookie.as_deref(), Some("james_yummy_cookie=0"));
    assert!(served.body.contains(PAGE_MARKERS[0]));
    assert!(served.body.contains(REVISIT));
}

#[tokio::test]
async fn invalid_cookie_values_count_as_fresh_visits() {
    let origin = common::start_origin().await;
    let edge = common::start_edge(origin.url("/api/variants")).await;

    for value in ["2", "-1", "abc", "1.5"] {
        let cookie = format!("james_yummy_cookie={}", value);
        let served = get(&edge.url("/"), Some(&cookie)).await;
        assert_eq!(served.status, StatusCode::OK, "{}", value);
        let variant = pinned_variant(served.set_cookie.as_deref().unwrap());
        assert!(served.body.contains(&format!(
            r#"<p id="description">My paragraph for Variant {}. </p>"#,
            variant
        )));
    }
}

#[tokio::test]
async fn other_paths_are_empty_and_never_reach_origin() {
    let origin = common::start_origin().await;
    let edge = common::start_edge(origin.url("/api/variants")).await;

    for path in ["/favicon.ico", "/variants/1", "/?utm_source=x"] {
        let served = get(&edge.url(path), Some("james_yummy_cookie=1")).await;
        assert_eq!(served.status, StatusCode::OK, "{}", path);
        assert!(served.body.is_empty(), "{}", path);
        assert!(served.set_cookie.is_none(), "{}", path);
    }
    assert_eq!(origin.hits(), 0);
}

#[tokio::test]
async fn catalog_problems_are_bad_gateway() {
    let origin = common::start_origin().await;

    for catalog in ["/api/garbage", "/api/short", "/api/dangling", "/api/nope"] {
        let edge = common::start_edge(origin.url(catalog)).await;
        let served = get(&edge.url("/"), Some("james_yummy_cookie=1")).await;
        assert_eq!(served.status, StatusCode::BAD_GATEWAY, "{}", catalog);
        assert!(served.set_cookie.is_none(), "{}", catalog);
    }
}

#[tokio::test]
async fn unreachable_catalog_is_bad_gateway() {
    let edge = common::start_edge("http://127.0.0.1:9/api/variants".into()).await;
    let served = get(&edge.url("/"), None).await;
    assert_eq!(served.status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn stalled_page_body_is_cut_off() {
    let origin = common::start_origin().await;
    let edge = common::start_edge_with(origin.url("/api/stalled"), |config| {
        config.timeouts.request_secs = 1;
    })
    .await;

    let response = common::client()
        .get(edge.url("/"))
        .send()
        .await
        .expect("edge unreachable");
    assert_eq!(response.status(), StatusCode::OK);

    let body = tokio::time::timeout(Duration::from_secs(10), response.text())
        .await
        .expect("edge kept the response open past its timeout");
    assert!(body.is_err());
}
