//! Crawl lifecycle extension.
//!
//! One [`CrawlMonitor`] per crawl: the host constructs it when a crawl opens,
//! invokes the [`CrawlObserver`] handlers at its fixed callback points, and
//! the close handler emits the accumulated statistics as a single custom
//! event before the monitor is discarded. Handlers run host-sequentially, one
//! notification at a time, so no locking is involved.

use tracing::{debug, warn};

use crate::agent::Agent;
use crate::common::error::{Result, TelemetryError};
use crate::config::MonitorSettings;
use crate::signals::{CloseReason, CrawlInfo, DropReason};
use crate::stats::{EventStats, StatValue};

/// Kind name of the per-crawl summary event.
pub const CRAWL_EVENT_TYPE: &str = "CrawlEvent";

/// Lifecycle hooks a crawling host invokes.
///
/// An explicit interface rather than string-keyed signal dispatch: the host
/// holds the implementor and calls these directly. Item payloads are accepted
/// to mirror the host's notification signatures; recording does not read them.
pub trait CrawlObserver {
    fn crawl_opened(&mut self, crawl: &CrawlInfo);
    fn item_scraped(&mut self, item: &serde_json::Value, crawl: &CrawlInfo);
    fn response_received(&mut self, crawl: &CrawlInfo);
    fn item_dropped(&mut self, item: &serde_json::Value, crawl: &CrawlInfo, reason: &DropReason);
    fn crawl_closed(&mut self, crawl: &CrawlInfo, reason: CloseReason);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Open,
    Closed,
}

/// Accumulates per-crawl statistics and emits them at close.
#[derive(Debug)]
pub struct CrawlMonitor {
    stats: EventStats,
    state: State,
    agent: Agent,
}

impl CrawlMonitor {
    /// Refuses construction when the extension is disabled; the host matches
    /// on [`TelemetryError::Disabled`] and registers nothing.
    pub fn from_settings(settings: &MonitorSettings, agent: Agent) -> Result<Self> {
        if !settings.extension_enabled {
            return Err(TelemetryError::Disabled);
        }
        Ok(Self {
            stats: EventStats::new(),
            state: State::Open,
            agent,
        })
    }

    /// Statistics recorded so far.
    pub fn stats(&self) -> &EventStats {
        &self.stats
    }

    // Handlers arriving after close are a host lifecycle bug; ignore them
    // rather than corrupt an already-emitted mapping.
    fn guard_open(&self, handler: &'static str) -> bool {
        if self.state == State::Closed {
            warn!(handler, "lifecycle handler invoked on a closed monitor, ignoring");
            return false;
        }
        true
    }
}

impl CrawlObserver for CrawlMonitor {
    fn crawl_opened(&mut self, crawl: &CrawlInfo) {
        if !self.guard_open("crawl_opened") {
            return;
        }
        debug!(crawl = %crawl.name, "crawl opened");
        self.stats.set_value("start_time", StatValue::Time(chrono::Utc::now()));
    }

    fn item_scraped(&mut self, _item: &serde_json::Value, _crawl: &CrawlInfo) {
        if !self.guard_open("item_scraped") {
            return;
        }
        self.stats.inc("item_scraped_count");
    }

    fn response_received(&mut self, _crawl: &CrawlInfo) {
        if !self.guard_open("response_received") {
            return;
        }
        self.stats.inc("response_received_count");
    }

    fn item_dropped(&mut self, _item: &serde_json::Value, _crawl: &CrawlInfo, reason: &DropReason) {
        if !self.guard_open("item_dropped") {
            return;
        }
        self.stats.inc("item_dropped_count");
        self.stats
            .inc(&format!("item_dropped_reasons_count/{}", reason.kind()));
    }

    /// Records the finish, emits the whole mapping as one custom event and
    /// closes the monitor. The close reason is accepted for future use.
    fn crawl_closed(&mut self, crawl: &CrawlInfo, reason: CloseReason) {
        if !self.guard_open("crawl_closed") {
            return;
        }
        debug!(crawl = %crawl.name, reason = reason.as_str(), "crawl closed");
        self.stats.set_value("finish_time", StatValue::Time(chrono::Utc::now()));
        self.stats
            .set_value("spider", StatValue::Text(crawl.name.clone()));
        self.state = State::Closed;
        self.agent
            .record_custom_event(CRAWL_EVENT_TYPE, self.stats.clone());
    }
}
