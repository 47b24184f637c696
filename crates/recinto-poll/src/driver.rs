//! The poll loop.
//!
//! One tick is `fetch → fan-out`, then the driver sleeps for the poll
//! interval. A failed fetch is fanned out as an error and the loop keeps
//! going; only the shutdown signal stops it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use recinto_protocol::POLL_INTERVAL_MS;

use crate::{PanelSink, PollError, StateSource};

#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Pause between the end of a tick and the start of the next.
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(POLL_INTERVAL_MS),
        }
    }
}

/// Reachability of the backend as seen by the driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Connectivity {
    /// No tick has completed yet.
    #[default]
    Connecting,
    Connected,
    Disconnected,
}

impl std::fmt::Display for Connectivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Connectivity::Connecting => write!(f, "Connecting"),
            Connectivity::Connected => write!(f, "Connected"),
            Connectivity::Disconnected => write!(f, "Disconnected"),
        }
    }
}

/// Published after every tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollStatus {
    pub connectivity: Connectivity,
    pub ticks: u64,
    pub consecutive_failures: u32,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

pub struct PollDriver<S, K> {
    config: PollConfig,
    source: S,
    sinks: Vec<K>,
    status: watch::Sender<PollStatus>,
}

impl<S, K> PollDriver<S, K>
where
    S: StateSource,
    K: PanelSink,
{
    pub fn new(config: PollConfig, source: S) -> Self {
        let (status, _) = watch::channel(PollStatus::default());
        Self {
            config,
            source,
            sinks: Vec::new(),
            status,
        }
    }

    pub fn add_sink(&mut self, sink: K) {
        self.sinks.push(sink);
    }

    pub fn sinks(&self) -> &[K] {
        &self.sinks
    }

    /// Watch the driver's status from another task.
    pub fn subscribe(&self) -> watch::Receiver<PollStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> PollStatus {
        self.status.borrow().clone()
    }

    /// Run one tick. Returns `true` when the fetch succeeded.
    pub async fn tick(&mut self) -> bool {
        match self.source.fetch().await {
            Ok(state) => {
                let now = Utc::now();
                for sink in &mut self.sinks {
                    sink.on_state(&state, now).await;
                }
                self.record_success(now);
                true
            }
            Err(e) => {
                let now = Utc::now();
                for sink in &mut self.sinks {
                    sink.on_error(&e, now).await;
                }
                self.record_failure(&e);
                false
            }
        }
    }

    /// Tick until `shutdown` turns `true` or its sender goes away.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            interval_ms = self.config.interval.as_millis() as u64,
            panels = self.sinks.len(),
            "Poll driver started"
        );

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }
            self.tick().await;

            tokio::select! {
                _ = tokio::time::sleep(self.config.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        tracing::info!(ticks = self.status.borrow().ticks, "Poll driver stopped");
    }

    fn record_success(&mut self, now: DateTime<Utc>) {
        self.status.send_modify(|status| {
            if status.connectivity != Connectivity::Connected {
                tracing::info!(
                    after_failures = status.consecutive_failures,
                    "Backend reachable"
                );
            }
            status.connectivity = Connectivity::Connected;
            status.ticks += 1;
            status.consecutive_failures = 0;
            status.last_success = Some(now);
            status.last_error = None;
        });
    }

    fn record_failure(&mut self, error: &PollError) {
        self.status.send_modify(|status| {
            if status.connectivity != Connectivity::Disconnected {
                tracing::warn!(error = %error, "Backend unreachable, keeping last state");
            } else {
                tracing::debug!(
                    error = %error,
                    failures = status.consecutive_failures + 1,
                    "Poll failed again"
                );
            }
            status.connectivity = Connectivity::Disconnected;
            status.ticks += 1;
            status.consecutive_failures += 1;
            status.last_error = Some(error.to_string());
        });
    }
}
