//! Background-transaction instrumentation.
//!
//! A unit of work the host schedules outside any web request gets a start/end
//! notification pair. The pair is invocation-scoped: each guard mints its own
//! transaction id, so concurrently running wrapped callables cannot cross
//! wires. Failures are recorded on the transaction and then propagate to the
//! caller unchanged.

use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use chrono::Utc;
use futures::Stream;
use pin_project_lite::pin_project;
use uuid::Uuid;

use crate::agent::Agent;
use crate::collector::{AgentEvent, TransactionOutcome};

/// A live background transaction.
///
/// Exactly one end notification is sent, when the guard is finished or
/// dropped, carrying the elapsed wall-clock duration and the outcome.
#[derive(Debug)]
pub struct TransactionGuard {
    agent: Agent,
    id: Uuid,
    name: String,
    started: Instant,
    outcome: Option<TransactionOutcome>,
    ended: bool,
}

impl TransactionGuard {
    pub(crate) fn begin(agent: Agent, name: String) -> Self {
        let id = Uuid::new_v4();
        agent.send(AgentEvent::TransactionStart {
            id,
            name: name.clone(),
            started_at: Utc::now(),
        });
        Self {
            agent,
            id,
            name,
            started: Instant::now(),
            outcome: None,
            ended: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Marks the transaction failed. The error itself still belongs to the
    /// caller; this only records it.
    pub fn record_failure(&mut self, kind: &str, message: impl Display) {
        self.outcome = Some(TransactionOutcome::Failed {
            kind: kind.to_string(),
            message: message.to_string(),
        });
    }

    /// Ends the transaction now rather than at drop.
    pub fn finish(mut self) {
        self.end();
    }

    fn end(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        let outcome = self.outcome.take().unwrap_or(TransactionOutcome::Success);
        self.agent.send(AgentEvent::TransactionEnd {
            id: self.id,
            name: std::mem::take(&mut self.name),
            duration_ms: self.started.elapsed().as_millis() as u64,
            outcome,
        });
    }
}

impl Drop for TransactionGuard {
    fn drop(&mut self) {
        self.end();
    }
}

/// Runs `work` as one background transaction.
///
/// A failure is recorded on the transaction before the error returns to the
/// caller, unchanged; nothing is retried or suppressed.
pub async fn background_task<F, T, E>(agent: &Agent, name: &str, work: F) -> std::result::Result<T, E>
where
    F: Future<Output = std::result::Result<T, E>>,
    E: Display,
{
    let mut guard = agent.start_transaction(name);
    match work.await {
        Ok(value) => {
            guard.finish();
            Ok(value)
        }
        Err(e) => {
            guard.record_failure(type_kind::<E>(), &e);
            Err(e)
        }
    }
}

pin_project! {
    /// Stream wrapper keeping its transaction active for the stream's whole
    /// life: the end notification goes out when the underlying stream is
    /// exhausted, or at drop if the consumer stops early.
    pub struct InstrumentedStream<S> {
        #[pin]
        inner: S,
        guard: Option<TransactionGuard>,
    }
}

impl<S> InstrumentedStream<S> {
    pub fn new(agent: &Agent, name: &str, inner: S) -> Self {
        Self {
            inner,
            guard: Some(agent.start_transaction(name)),
        }
    }

    /// Id of the wrapping transaction, until the stream ends.
    pub fn transaction_id(&self) -> Option<Uuid> {
        self.guard.as_ref().map(|guard| guard.id())
    }
}

impl<S, T, E> Stream for InstrumentedStream<S>
where
    S: Stream<Item = std::result::Result<T, E>>,
    E: Display,
{
    type Item = std::result::Result<T, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        match this.inner.poll_next(cx) {
            Poll::Ready(None) => {
                if let Some(guard) = this.guard.take() {
                    guard.finish();
                }
                Poll::Ready(None)
            }
            Poll::Ready(Some(Err(e))) => {
                if let Some(guard) = this.guard.as_mut() {
                    guard.record_failure(type_kind::<E>(), &e);
                }
                Poll::Ready(Some(Err(e)))
            }
            other => other,
        }
    }
}

/// Short type name, the stable failure-kind label for arbitrary error types.
fn type_kind<E>() -> &'static str {
    let full = std::any::type_name::<E>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
