//! Display bridge
//!
//! A [`Session`] runs aggregations on a background task in response to
//! [`Command`]s and posts [`DisplayEvent`]s for a display surface to render.

use crate::aggregator::PixelAggregator;
use crate::loader::PageLoader;
use crate::{Document, Error, Result, SessionConfig};
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Event posted to the display surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DisplayEvent {
    /// A run started; the total is being recomputed
    Loading,
    /// A run finished with this total
    Count { count: f64 },
    /// A run failed; no total is available
    Failed { message: String },
}

/// Command accepted from the display surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Command {
    Refresh,
    Close,
}

enum Request {
    Refresh(Option<oneshot::Sender<Result<f64>>>),
    Close(oneshot::Sender<()>),
}

/// Handle to a running aggregation session.
///
/// The session task owns the document and loader and processes requests one
/// at a time, so overlapping refreshes complete in the order they were sent.
#[derive(Clone)]
pub struct Session {
    req_tx: mpsc::UnboundedSender<Request>,
}

impl Session {
    /// Spawn the session task on the current tokio runtime.
    ///
    /// Returns the handle and the receiving end of the display event stream.
    pub fn spawn(
        document: Arc<Document>,
        loader: Arc<dyn PageLoader>,
        config: SessionConfig,
    ) -> Result<(Self, mpsc::Receiver<DisplayEvent>)> {
        config.validate()?;

        let (req_tx, req_rx) = mpsc::unbounded_channel::<Request>();
        let (event_tx, event_rx) = mpsc::channel::<DisplayEvent>(config.event_capacity);

        tokio::spawn(run_session(
            document,
            loader,
            event_tx,
            req_rx,
            config.compute_on_start,
        ));

        Ok((Self { req_tx }, event_rx))
    }

    /// Recompute the total and wait for this run's result
    pub async fn refresh(&self) -> Result<f64> {
        let (tx, rx) = oneshot::channel();
        self.req_tx
            .send(Request::Refresh(Some(tx)))
            .map_err(|_| Error::SessionClosed)?;
        rx.await.map_err(|_| Error::SessionClosed)?
    }

    /// Forward a display command without waiting for its outcome
    pub fn dispatch(&self, command: Command) -> Result<()> {
        let req = match command {
            Command::Refresh => Request::Refresh(None),
            Command::Close => {
                let (tx, _rx) = oneshot::channel();
                Request::Close(tx)
            }
        };
        self.req_tx.send(req).map_err(|_| Error::SessionClosed)
    }

    /// Stop the session task. Pending requests sent earlier are still served.
    pub async fn close(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.req_tx
            .send(Request::Close(tx))
            .map_err(|_| Error::SessionClosed)?;
        rx.await.map_err(|_| Error::SessionClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.req_tx.is_closed()
    }
}

async fn run_session(
    document: Arc<Document>,
    loader: Arc<dyn PageLoader>,
    events: mpsc::Sender<DisplayEvent>,
    mut req_rx: mpsc::UnboundedReceiver<Request>,
    compute_on_start: bool,
) {
    if compute_on_start {
        let _ = compute(&document, loader.as_ref(), &events).await;
    }

    while let Some(req) = req_rx.recv().await {
        match req {
            Request::Refresh(resp) => {
                let res = compute(&document, loader.as_ref(), &events).await;
                if let Some(resp) = resp {
                    let _ = resp.send(res);
                }
            }
            Request::Close(resp) => {
                let _ = resp.send(());
                break;
            }
        }
    }
    debug!("session stopped");
}

async fn compute(
    document: &Document,
    loader: &dyn PageLoader,
    events: &mpsc::Sender<DisplayEvent>,
) -> Result<f64> {
    emit(events, DisplayEvent::Loading).await;
    let res = PixelAggregator::new(document, loader)
        .compute_total_pixels()
        .await;
    let event = match &res {
        Ok(total) => DisplayEvent::Count { count: *total },
        Err(err) => DisplayEvent::Failed {
            message: err.to_string(),
        },
    };
    emit(events, event).await;
    res
}

async fn emit(events: &mpsc::Sender<DisplayEvent>, event: DisplayEvent) {
    if events.send(event).await.is_err() {
        debug!("display detached; event dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_use_tagged_json() {
        let s = serde_json::to_string(&DisplayEvent::Count { count: 414.0 }).unwrap();
        assert_eq!(s, r#"{"type":"count","count":414.0}"#);
        let s = serde_json::to_string(&DisplayEvent::Loading).unwrap();
        assert_eq!(s, r#"{"type":"loading"}"#);
    }

    #[test]
    fn commands_parse_from_json() {
        let c: Command = serde_json::from_str(r#"{"type":"refresh"}"#).unwrap();
        assert_eq!(c, Command::Refresh);
        let c: Command = serde_json::from_str(r#"{"type":"close"}"#).unwrap();
        assert_eq!(c, Command::Close);
        assert!(serde_json::from_str::<Command>(r#"{"type":"explode"}"#).is_err());
    }

    #[tokio::test]
    async fn zero_capacity_is_rejected() {
        let cfg = SessionConfig {
            event_capacity: 0,
            ..Default::default()
        };
        let res = Session::spawn(
            Arc::new(Document::default()),
            Arc::new(crate::Preloaded),
            cfg,
        );
        assert!(matches!(res, Err(Error::ConfigError(_))));
    }
}
