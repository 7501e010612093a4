//! Process-wide front-end to the collector.
//!
//! The usual APM agent shape: initialize once at startup from a configuration
//! file, then record transactions and custom events from anywhere in the
//! process. Sends go onto an unbounded channel and a background drain task
//! forwards them to the collector; delivery failures are logged and never
//! surface to instrumented code.

use std::sync::Arc;

use chrono::Utc;
use once_cell::sync::OnceCell;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::collector::{AgentEvent, Collector, CustomEvent, HttpCollector};
use crate::common::error::Result;
use crate::config::AgentConfig;
use crate::stats::EventStats;
use crate::transaction::{InstrumentedStream, TransactionGuard};

static GLOBAL: OnceCell<Agent> = OnceCell::new();

/// Cheap cloneable handle; every clone feeds the same drain task.
#[derive(Debug, Clone)]
pub struct Agent {
    tx: mpsc::UnboundedSender<AgentEvent>,
}

impl Agent {
    /// Starts an agent over an arbitrary collector transport.
    ///
    /// Returns the handle plus the drain task, which runs until every handle
    /// is dropped. Must be called within a Tokio runtime.
    pub fn start(collector: Arc<dyn Collector>) -> (Agent, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let drain = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Err(e) = collector.send_event(event).await {
                    warn!("failed to deliver agent event: {e}");
                }
            }
        });
        (Agent { tx }, drain)
    }

    /// Records one structured event of the given kind.
    pub fn record_custom_event(&self, event_type: &'static str, attributes: EventStats) {
        self.send(AgentEvent::Custom(CustomEvent {
            event_type,
            timestamp: Utc::now(),
            attributes,
        }));
    }

    /// Opens a background transaction. The returned guard reports the end,
    /// once, when finished or dropped.
    pub fn start_transaction(&self, name: impl Into<String>) -> TransactionGuard {
        TransactionGuard::begin(self.clone(), name.into())
    }

    /// Wraps a stream of parse outputs in a background transaction that stays
    /// active until the stream is exhausted or dropped.
    pub fn instrument_stream<S>(&self, name: &str, stream: S) -> InstrumentedStream<S> {
        InstrumentedStream::new(self, name, stream)
    }

    pub(crate) fn send(&self, event: AgentEvent) {
        if self.tx.send(event).is_err() {
            debug!("agent drain task gone, dropping event");
        }
    }
}

/// Initializes the process-global agent from a TOML configuration file,
/// pointing it at the HTTP collector the file describes.
///
/// Idempotent: later calls return the already-initialized handle. The drain
/// task is detached and lives for the rest of the process. Must be called
/// within a Tokio runtime.
pub fn init(config_path: impl AsRef<std::path::Path>) -> Result<Agent> {
    dotenv::dotenv().ok();
    let agent = GLOBAL.get_or_try_init(|| {
        let config = AgentConfig::from_file(config_path)?;
        let collector = Arc::new(HttpCollector::new(&config)?);
        let (agent, _drain) = Agent::start(collector);
        debug!("telemetry agent initialized");
        Ok::<_, crate::common::error::TelemetryError>(agent)
    })?;
    Ok(agent.clone())
}

/// The process-global agent, if [`init`] has run.
pub fn global() -> Option<Agent> {
    GLOBAL.get().cloned()
}
