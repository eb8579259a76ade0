//! Page loading capability
//!
//! Hosts may keep page subtrees unmaterialized until asked. The aggregator
//! only depends on [`PageLoader`]; concrete hosts (or test fixtures) decide
//! what "loading" means.

use crate::{Document, Error, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Makes every page of a document safe to enumerate synchronously.
pub trait PageLoader: Send + Sync {
    /// Resolve once all pages are loaded, or fail with the first page that could not be.
    fn ensure_all_loaded(&self) -> BoxFuture<'_, Result<()>>;
}

/// Loader for documents that are already fully materialized
#[derive(Debug, Clone, Copy, Default)]
pub struct Preloaded;

impl PageLoader for Preloaded {
    fn ensure_all_loaded(&self) -> BoxFuture<'_, Result<()>> {
        futures::future::ready(Ok(())).boxed()
    }
}

/// In-memory stand-in for a host that loads pages one by one.
///
/// Pages can be marked as failing, and loading can be held open on a
/// [`Notify`] gate until the caller releases it.
#[derive(Debug, Default)]
pub struct FixtureLoader {
    pages: Vec<String>,
    failures: HashMap<String, String>,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
}

impl FixtureLoader {
    pub fn new(pages: Vec<String>) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }

    /// A loader covering every page of `document`
    pub fn for_document(document: &Document) -> Self {
        Self::new(document.page_names())
    }

    /// Make loading `page` fail with `reason`
    pub fn fail_page(mut self, page: &str, reason: &str) -> Self {
        self.failures.insert(page.to_string(), reason.to_string());
        self
    }

    /// Wait for one `notify_one` on `gate` before loading begins
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Number of times `ensure_all_loaded` has been called
    pub fn load_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PageLoader for FixtureLoader {
    fn ensure_all_loaded(&self) -> BoxFuture<'_, Result<()>> {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            for page in &self.pages {
                if let Some(reason) = self.failures.get(page) {
                    warn!("page '{}' failed to load: {}", page, reason);
                    return Err(Error::LoadFailure {
                        page: page.clone(),
                        reason: reason.clone(),
                    });
                }
                debug!("page '{}' loaded", page);
            }
            Ok(())
        }
        .boxed()
    }
}
