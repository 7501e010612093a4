//! Crawl lifecycle telemetry.
//!
//! Attaches monitoring instrumentation to a web-crawling host: parse callbacks
//! are wrapped as background transactions, and crawl lifecycle notifications
//! (opened, item scraped, item dropped, response received, closed) feed a
//! per-crawl statistics accumulator that is emitted to an external collector
//! as a single custom event when the crawl closes.
//!
//! The crawling framework and the collector backend are both external; this
//! crate only produces the telemetry between them.
//!
//! ```rust,ignore
//! use crawl_telemetry::{agent, CrawlMonitor, CrawlObserver, MonitorSettings};
//!
//! let handle = agent::init("telemetry.toml")?;
//! let mut monitor = CrawlMonitor::from_settings(&settings, handle.clone())?;
//!
//! // The host invokes the lifecycle handlers at its fixed callback points,
//! // and wraps its parse callback as a background transaction:
//! let stream = handle.instrument_stream("parse", parse(response));
//! ```

pub mod agent;
pub mod collector;
pub mod common;
pub mod config;
pub mod monitor;
pub mod observability;
pub mod signals;
pub mod stats;
pub mod transaction;

pub use agent::Agent;
pub use collector::{
    AgentEvent, Collector, CustomEvent, HttpCollector, MemoryCollector, TransactionOutcome,
};
pub use common::error::{Result, TelemetryError};
pub use config::{AgentConfig, MonitorSettings};
pub use monitor::{CrawlMonitor, CrawlObserver, CRAWL_EVENT_TYPE};
pub use signals::{CloseReason, CrawlInfo, DropReason};
pub use stats::{EventStats, StatValue};
pub use transaction::{background_task, InstrumentedStream, TransactionGuard};
