use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use recinto_overlay::SeatingPanel;
use recinto_protocol::GlobalState;

use crate::PollError;

/// A panel receiving every poll result.
pub trait PanelSink: Send {
    /// A snapshot was fetched. Panel-local errors stay inside the panel.
    fn on_state(
        &mut self,
        state: &GlobalState,
        now: DateTime<Utc>,
    ) -> impl Future<Output = ()> + Send;

    /// The tick failed; the panel keeps its last rendered state apart from
    /// timed clears that fall due at `now`.
    fn on_error(
        &mut self,
        error: &PollError,
        now: DateTime<Utc>,
    ) -> impl Future<Output = ()> + Send;
}

impl PanelSink for SeatingPanel {
    async fn on_state(&mut self, state: &GlobalState, now: DateTime<Utc>) {
        if let Err(e) = SeatingPanel::on_state(self, state, now) {
            tracing::debug!(error = %e, "Seating panel shows an error");
        }
    }

    async fn on_error(&mut self, error: &PollError, now: DateTime<Utc>) {
        SeatingPanel::on_error(self, error, now);
    }
}

/// Panels shared with a renderer.
impl<T> PanelSink for Arc<RwLock<T>>
where
    T: PanelSink + Send + Sync,
{
    async fn on_state(&mut self, state: &GlobalState, now: DateTime<Utc>) {
        self.write().await.on_state(state, now).await;
    }

    async fn on_error(&mut self, error: &PollError, now: DateTime<Utc>) {
        self.write().await.on_error(error, now).await;
    }
}
