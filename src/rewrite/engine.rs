//! Streaming HTML rewrite engine.

use std::fmt;
use std::sync::Arc;

use axum::body::Bytes;
use futures_util::{stream, Stream, StreamExt};
use lol_html::errors::{RewritingError, SelectorError};
use lol_html::{element, HtmlRewriter, OutputSink, Selector, Settings};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::experiment::RenderingContext;
use crate::rewrite::bindings::ElementBinding;

/// Chunks buffered between the upstream body, the worker and the client.
const CHANNEL_DEPTH: usize = 16;

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("invalid selector '{selector}': {source}")]
    Selector {
        selector: &'static str,
        #[source]
        source: SelectorError,
    },

    #[error("failed to rewrite document: {0}")]
    Rewriting(#[from] RewritingError),

    #[error("upstream body failed: {0}")]
    Upstream(String),
}

/// Long-lived rewriter holding the element bindings.
///
/// Built once at startup and shared by every request; each rewrite pass gets
/// its own [`RenderingContext`].
#[derive(Debug, Clone)]
pub struct VariantRewriter {
    bindings: Vec<ElementBinding>,
}

impl VariantRewriter {
    /// Create an engine with the standard bindings.
    pub fn new() -> Result<Self, RewriteError> {
        Self::with_bindings(ElementBinding::ALL.to_vec())
    }

    /// Create an engine for an explicit binding table, validating every selector.
    pub fn with_bindings(bindings: Vec<ElementBinding>) -> Result<Self, RewriteError> {
        for binding in &bindings {
            let selector = binding.selector();
            selector
                .parse::<Selector>()
                .map_err(|source| RewriteError::Selector { selector, source })?;
        }
        Ok(Self { bindings })
    }

    fn settings(&self, ctx: RenderingContext) -> Settings<'static, 'static> {
        Settings {
            element_content_handlers: self
                .bindings
                .iter()
                .map(|&binding| element!(binding.selector(), move |el| binding.apply(el, &ctx)))
                .collect(),
            ..Settings::new()
        }
    }

    /// Feed `chunks` through a fresh rewriter, writing output to `sink`.
    fn run<I, O>(&self, ctx: RenderingContext, chunks: I, sink: O) -> Result<(), RewriteError>
    where
        I: IntoIterator<Item = Result<Bytes, RewriteError>>,
        O: OutputSink,
    {
        let mut rewriter = HtmlRewriter::new(self.settings(ctx), sink);
        for chunk in chunks {
            rewriter.write(&chunk?)?;
        }
        rewriter.end()?;
        Ok(())
    }

    /// Rewrite a complete in-memory document.
    pub fn rewrite_document(&self, html: &[u8], ctx: RenderingContext) -> Result<Vec<u8>, RewriteError> {
        let mut output = Vec::with_capacity(html.len());
        self.run(
            ctx,
            std::iter::once(Ok(Bytes::copy_from_slice(html))),
            |chunk: &[u8]| output.extend_from_slice(chunk),
        )?;
        Ok(output)
    }

    /// Rewrite a page body as it streams in.
    ///
    /// The parser runs on a blocking worker fed through a bounded channel, so
    /// at most a few chunks are held in memory at once. An upstream or parse
    /// failure is yielded as the final stream item. Dropping the returned
    /// stream releases the upstream body and stops the worker, even if the
    /// origin has stopped sending.
    pub fn rewrite_stream<S, E>(
        self: &Arc<Self>,
        upstream: S,
        ctx: RenderingContext,
    ) -> impl Stream<Item = Result<Bytes, RewriteError>> + Send + 'static
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let (input_tx, mut input_rx) = mpsc::channel::<Result<Bytes, RewriteError>>(CHANNEL_DEPTH);
        let (output_tx, output_rx) = mpsc::channel::<Result<Bytes, RewriteError>>(CHANNEL_DEPTH);

        // The pump gives up the upstream body as soon as either the worker or
        // the response body goes away, even while the origin is stalled.
        let client_tx = output_tx.clone();
        tokio::spawn(async move {
            let mut upstream = Box::pin(upstream);
            loop {
                let chunk = tokio::select! {
                    _ = client_tx.closed() => break,
                    _ = input_tx.closed() => break,
                    chunk = upstream.next() => match chunk {
                        Some(chunk) => chunk.map_err(|e| RewriteError::Upstream(e.to_string())),
                        None => break,
                    },
                };
                let failed = chunk.is_err();
                let sent = tokio::select! {
                    _ = client_tx.closed() => false,
                    sent = input_tx.send(chunk) => sent.is_ok(),
                };
                if !sent || failed {
                    break;
                }
            }
        });

        let engine = Arc::clone(self);
        tokio::task::spawn_blocking(move || {
            let sink_tx = output_tx.clone();
            let chunks = std::iter::from_fn(|| {
                if output_tx.is_closed() {
                    return None;
                }
                input_rx.blocking_recv()
            });
            let result = engine.run(ctx, chunks, move |chunk: &[u8]| {
                let _ = sink_tx.blocking_send(Ok(Bytes::copy_from_slice(chunk)));
            });
            if let Err(err) = result {
                tracing::warn!(error = %err, "Variant page rewrite failed");
                let _ = output_tx.blocking_send(Err(err));
            }
        });

        stream::unfold(output_rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        })
    }
}
