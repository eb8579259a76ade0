//! Pixel aggregation over a loaded document
//!
//! One invocation of [`PixelAggregator::compute_total_pixels`] walks the
//! states `Idle -> Loading -> Traversing -> Done` (or `Loading -> Failed`)
//! and then returns to `Idle`. Loading is the only suspension point; the
//! traversal itself runs synchronously over already-materialized pages.

use crate::loader::PageLoader;
use crate::tree::leaf_area;
use crate::{Document, Result};
use log::{debug, info, warn};
use std::sync::Arc;

type OnStateHandler = Arc<dyn Fn(InvocationState) + Send + Sync>;

/// Lifecycle of a single aggregation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    Idle,
    Loading,
    Traversing,
    Done,
    Failed,
}

impl InvocationState {
    pub fn can_advance_to(self, next: InvocationState) -> bool {
        use InvocationState::*;
        matches!(
            (self, next),
            (Idle, Loading)
                | (Loading, Traversing)
                | (Loading, Failed)
                | (Traversing, Done)
                | (Done, Idle)
                | (Failed, Idle)
        )
    }
}

/// Area contributed by one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageTotal {
    pub page: String,
    pub pixels: f64,
}

/// Tracks the state of one run and reports transitions to the observer.
struct Invocation<'a> {
    state: InvocationState,
    observer: Option<&'a OnStateHandler>,
}

impl<'a> Invocation<'a> {
    fn start(observer: Option<&'a OnStateHandler>) -> Self {
        Self {
            state: InvocationState::Idle,
            observer,
        }
    }

    fn advance(&mut self, next: InvocationState) {
        if !self.state.can_advance_to(next) {
            warn!("ignoring invalid transition {:?} -> {:?}", self.state, next);
            return;
        }
        debug!("invocation {:?} -> {:?}", self.state, next);
        self.state = next;
        if let Some(cb) = self.observer {
            cb(next);
        }
    }
}

/// Sums leaf pixel area across every page of a document.
///
/// Holds only read access to the document; the loader is consulted once per
/// invocation before any page is inspected.
pub struct PixelAggregator<'a> {
    document: &'a Document,
    loader: &'a dyn PageLoader,
    on_state: Option<OnStateHandler>,
}

impl<'a> PixelAggregator<'a> {
    pub fn new(document: &'a Document, loader: &'a dyn PageLoader) -> Self {
        Self {
            document,
            loader,
            on_state: None,
        }
    }

    /// Register a callback invoked on every state transition of every run.
    pub fn on_state<F>(&mut self, cb: F)
    where
        F: Fn(InvocationState) + Send + Sync + 'static,
    {
        self.on_state = Some(Arc::new(cb));
    }

    /// Remove the state callback if any
    pub fn clear_on_state(&mut self) {
        self.on_state = None;
    }

    /// Load every page, then sum `width * height` over all leaves.
    ///
    /// A load failure fails the whole run; no partial total is produced.
    pub async fn compute_total_pixels(&self) -> Result<f64> {
        let totals = self.page_totals().await?;
        let total: f64 = totals.iter().map(|t| t.pixels).sum();
        info!("document total: {} px over {} page(s)", total, totals.len());
        Ok(total)
    }

    /// Same run as [`compute_total_pixels`](Self::compute_total_pixels), broken down per page.
    pub async fn page_totals(&self) -> Result<Vec<PageTotal>> {
        let mut run = Invocation::start(self.on_state.as_ref());
        run.advance(InvocationState::Loading);

        if let Err(err) = self.loader.ensure_all_loaded().await {
            warn!("aggregation failed while loading: {}", err);
            run.advance(InvocationState::Failed);
            run.advance(InvocationState::Idle);
            return Err(err);
        }

        run.advance(InvocationState::Traversing);
        let totals = self
            .document
            .pages
            .iter()
            .map(|page| PageTotal {
                page: page.name.clone(),
                pixels: leaf_area(&page.children),
            })
            .collect();
        run.advance(InvocationState::Done);
        run.advance(InvocationState::Idle);
        Ok(totals)
    }
}
