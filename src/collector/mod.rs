//! Transport to the external collector.
//!
//! Everything the agent emits is an [`AgentEvent`]; a [`Collector`] owns
//! delivery. Instrumented code never waits on delivery: events are queued and
//! the agent's drain task is the only place collector I/O happens.

mod http;
mod memory;

pub use http::HttpCollector;
pub use memory::MemoryCollector;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::common::error::Result;
use crate::stats::EventStats;

/// One structured event of a named kind, carrying the final stats mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomEvent {
    #[serde(rename = "eventType")]
    pub event_type: &'static str,
    pub timestamp: DateTime<Utc>,
    pub attributes: EventStats,
}

/// How a background transaction ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransactionOutcome {
    Success,
    Failed { kind: String, message: String },
}

/// Events queued from instrumented code to the collector transport.
///
/// Transaction start/end notifications are paired by `id`; the id is minted
/// per invocation, so concurrent wrapped callables cannot cross wires.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentEvent {
    TransactionStart {
        id: Uuid,
        name: String,
        started_at: DateTime<Utc>,
    },
    TransactionEnd {
        id: Uuid,
        name: String,
        duration_ms: u64,
        outcome: TransactionOutcome,
    },
    Custom(CustomEvent),
}

/// Delivery port for agent events.
///
/// Callers treat sends as fire-and-forget; an implementation reports failures
/// through its `Result` and the drain task logs them.
#[async_trait]
pub trait Collector: Send + Sync {
    async fn send_event(&self, event: AgentEvent) -> Result<()>;
}
