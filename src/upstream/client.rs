//! Outbound HTTP client for the variant catalog and variant pages.

use std::time::Duration;

use axum::body::Bytes;
use futures_util::Stream;
use serde::Deserialize;
use thiserror::Error;

use crate::config::EdgeConfig;
use crate::experiment::VariantIndex;

/// The decoded `{ "variants": [...] }` document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VariantCatalog {
    pub variants: Vec<String>,
}

impl VariantCatalog {
    /// URL of the page for `index`, if the catalog lists one.
    pub fn url_for(&self, index: VariantIndex) -> Option<&str> {
        self.variants.get(index.as_usize()).map(String::as_str)
    }
}

/// Errors that can occur while talking to upstream origins.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("catalog request to {url} failed: {source}")]
    Catalog {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("catalog lists {available} variants, none at index {index}")]
    MissingVariant { index: VariantIndex, available: usize },

    #[error("variant page request to {url} failed: {source}")]
    Page {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Client for the catalog endpoint and the pages it lists.
#[derive(Debug, Clone)]
pub struct VariantClient {
    http: reqwest::Client,
    catalog_url: String,
}

impl VariantClient {
    pub fn new(config: &EdgeConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            http,
            catalog_url: config.catalog.url.clone(),
        })
    }

    /// Fetch and decode the variant catalog.
    pub async fn fetch_catalog(&self) -> Result<VariantCatalog, FetchError> {
        let catalog_error = |source| FetchError::Catalog {
            url: self.catalog_url.clone(),
            source,
        };

        let response = self
            .http
            .get(&self.catalog_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(catalog_error)?;

        response.json::<VariantCatalog>().await.map_err(catalog_error)
    }

    /// Start fetching a variant page, returning its body as a byte stream.
    ///
    /// Fails before any body bytes are read if the origin is unreachable or
    /// answers with a non-success status. The body stream fails once
    /// `timeouts.request_secs` have passed since the request was sent.
    pub async fn fetch_page(
        &self,
        url: &str,
    ) -> Result<impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static, FetchError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|source| FetchError::Page {
                url: url.to_string(),
                source,
            })?;

        Ok(response.bytes_stream())
    }
}
