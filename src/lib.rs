//! Pixtally
//!
//! Computes the total rendered pixel area of a paged design document: the sum
//! of `width × height` over every leaf node on every page.
//!
//! # Features
//!
//! - **Explicit loading**: pages are materialized through a [`PageLoader`]
//!   before traversal, so hosts with lazily loaded pages can be plugged in
//! - **Host-agnostic traversal**: any tree implementing [`NodeTree`] can be summed
//! - **Display bridge**: a [`Session`] posts `loading`/`count` events and accepts
//!   refresh/close commands
//!
//! # Example
//!
//! ```
//! use pixtally::{Document, Node, NodeKind, Page, PixelAggregator, Preloaded};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> pixtally::Result<()> {
//! let doc = Document::new(vec![Page::new(
//!     "Page 1",
//!     vec![Node::new("1:2", NodeKind::Rectangle).with_size(10.0, 5.0)],
//! )]);
//!
//! let total = PixelAggregator::new(&doc, &Preloaded).compute_total_pixels().await?;
//! assert_eq!(total, 50.0);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod aggregator;
pub mod document;
pub mod loader;
pub mod session;
pub mod tree;

pub use aggregator::{InvocationState, PageTotal, PixelAggregator};
pub use document::{Document, Node, NodeKind, Page};
pub use loader::{FixtureLoader, PageLoader, Preloaded};
pub use session::{Command, DisplayEvent, Session};
pub use tree::{Geometry, NodeTree};

/// Configuration for a [`Session`]
///
/// # Examples
///
/// ```
/// let cfg = pixtally::SessionConfig::default();
/// assert!(cfg.compute_on_start);
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Run one computation as soon as the session starts
    pub compute_on_start: bool,
    /// Number of display events buffered before the session waits on the display
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            compute_on_start: true,
            event_capacity: 16,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.event_capacity == 0 {
            return Err(Error::ConfigError(
                "event_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
