//! Payloads for the lifecycle notifications a crawling host raises.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity of the crawl a notification belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlInfo {
    pub name: String,
}

impl CrawlInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Why a crawl stopped. Accepted by the close handler for future use; nothing
/// is recorded from it today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Finished,
    Cancelled,
    Shutdown,
}

impl CloseReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloseReason::Finished => "finished",
            CloseReason::Cancelled => "cancelled",
            CloseReason::Shutdown => "shutdown",
        }
    }
}

/// Why the host discarded a scraped item.
///
/// A closed set: the per-reason drop counters are keyed by [`DropReason::kind`],
/// which depends on the variant alone, never on the message.
#[derive(Debug, Error)]
pub enum DropReason {
    #[error("required field missing: {0}")]
    MissingField(String),

    #[error("payload malformed: {0}")]
    Malformed(String),

    #[error("duplicate of an already scraped item: {0}")]
    Duplicate(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("rejected by an item filter: {0}")]
    Filtered(String),
}

impl DropReason {
    /// Stable symbolic name used in stats keys.
    pub fn kind(&self) -> &'static str {
        match self {
            DropReason::MissingField(_) => "MissingField",
            DropReason::Malformed(_) => "Malformed",
            DropReason::Duplicate(_) => "Duplicate",
            DropReason::Timeout(_) => "Timeout",
            DropReason::Filtered(_) => "Filtered",
        }
    }
}
