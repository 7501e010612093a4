//! End-to-end lifecycle scenarios: the host drives the monitor through its
//! callback points and the collector receives exactly one summary event.

use std::sync::Arc;

use serde_json::json;

use crawl_telemetry::{
    Agent, CloseReason, CrawlInfo, CrawlMonitor, CrawlObserver, MemoryCollector, MonitorSettings,
    StatValue, TelemetryError, CRAWL_EVENT_TYPE,
};

fn enabled() -> MonitorSettings {
    MonitorSettings {
        extension_enabled: true,
    }
}

/// Drops every agent handle and waits for the drain task, so the collector
/// buffer is complete before asserting.
async fn settle(agent: Agent, monitor: CrawlMonitor, drain: tokio::task::JoinHandle<()>) {
    drop(monitor);
    drop(agent);
    drain.await.unwrap();
}

#[tokio::test]
async fn scraped_and_response_counts_end_up_in_one_event() -> anyhow::Result<()> {
    let sink = MemoryCollector::new();
    let (agent, drain) = Agent::start(Arc::new(sink.clone()));
    let mut monitor = CrawlMonitor::from_settings(&enabled(), agent.clone())?;
    let crawl = CrawlInfo::new("quotes");

    monitor.crawl_opened(&crawl);
    let item = json!({"text": "quote", "author": "someone"});
    for _ in 0..3 {
        monitor.item_scraped(&item, &crawl);
    }
    for _ in 0..2 {
        monitor.response_received(&crawl);
    }
    monitor.crawl_closed(&crawl, CloseReason::Finished);
    settle(agent, monitor, drain).await;

    let events = sink.custom_events();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.event_type, CRAWL_EVENT_TYPE);
    assert_eq!(event.attributes.count("item_scraped_count"), 3);
    assert_eq!(event.attributes.count("response_received_count"), 2);
    assert!(matches!(
        event.attributes.get("start_time"),
        Some(StatValue::Time(_))
    ));
    assert!(matches!(
        event.attributes.get("finish_time"),
        Some(StatValue::Time(_))
    ));
    assert_eq!(
        event.attributes.get("spider"),
        Some(&StatValue::Text("quotes".into()))
    );
    Ok(())
}

#[tokio::test]
async fn drop_reasons_are_counted_per_kind() {
    use crawl_telemetry::DropReason;

    let sink = MemoryCollector::new();
    let (agent, drain) = Agent::start(Arc::new(sink.clone()));
    let mut monitor = CrawlMonitor::from_settings(&enabled(), agent.clone()).unwrap();
    let crawl = CrawlInfo::new("venues");
    let item = json!({"venue": "The Crocodile"});

    monitor.crawl_opened(&crawl);
    monitor.item_dropped(&item, &crawl, &DropReason::Timeout("after 30s".into()));
    monitor.item_dropped(&item, &crawl, &DropReason::Timeout("slow upstream".into()));
    monitor.item_dropped(&item, &crawl, &DropReason::Malformed("no date field".into()));
    monitor.crawl_closed(&crawl, CloseReason::Finished);
    settle(agent, monitor, drain).await;

    let events = sink.custom_events();
    assert_eq!(events.len(), 1);
    let attributes = &events[0].attributes;
    assert_eq!(attributes.count("item_dropped_count"), 3);
    assert_eq!(attributes.count("item_dropped_reasons_count/Timeout"), 2);
    assert_eq!(attributes.count("item_dropped_reasons_count/Malformed"), 1);
}

#[tokio::test]
async fn disabled_settings_refuse_construction_and_nothing_is_emitted() {
    let sink = MemoryCollector::new();
    let (agent, drain) = Agent::start(Arc::new(sink.clone()));

    let refused = CrawlMonitor::from_settings(&MonitorSettings::default(), agent.clone());
    assert!(matches!(refused, Err(TelemetryError::Disabled)));

    // No monitor exists, so the host has nothing to register and no
    // notification can ever reach a handler.
    drop(agent);
    drain.await.unwrap();
    assert!(sink.events().is_empty());
}

#[tokio::test]
async fn handlers_after_close_are_ignored() {
    let sink = MemoryCollector::new();
    let (agent, drain) = Agent::start(Arc::new(sink.clone()));
    let mut monitor = CrawlMonitor::from_settings(&enabled(), agent.clone()).unwrap();
    let crawl = CrawlInfo::new("quotes");
    let item = json!({"text": "late"});

    monitor.crawl_opened(&crawl);
    monitor.item_scraped(&item, &crawl);
    monitor.crawl_closed(&crawl, CloseReason::Shutdown);

    // Host lifecycle bug: notifications after close must not mutate or
    // re-emit the mapping.
    monitor.item_scraped(&item, &crawl);
    monitor.response_received(&crawl);
    monitor.crawl_closed(&crawl, CloseReason::Shutdown);
    settle(agent, monitor, drain).await;

    let events = sink.custom_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].attributes.count("item_scraped_count"), 1);
    assert_eq!(events[0].attributes.count("response_received_count"), 0);
}

#[tokio::test]
async fn emitted_event_serializes_flat() {
    let sink = MemoryCollector::new();
    let (agent, drain) = Agent::start(Arc::new(sink.clone()));
    let mut monitor = CrawlMonitor::from_settings(&enabled(), agent.clone()).unwrap();
    let crawl = CrawlInfo::new("quotes");

    monitor.crawl_opened(&crawl);
    monitor.item_scraped(&json!({}), &crawl);
    monitor.crawl_closed(&crawl, CloseReason::Finished);
    settle(agent, monitor, drain).await;

    let event = sink.events().pop().unwrap();
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["kind"], "custom");
    assert_eq!(value["eventType"], "CrawlEvent");
    assert_eq!(value["attributes"]["item_scraped_count"], 1);
    assert_eq!(value["attributes"]["spider"], "quotes");
}
