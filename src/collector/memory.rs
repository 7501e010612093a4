use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{AgentEvent, Collector, CustomEvent};
use crate::common::error::Result;

/// In-process event sink, for tests and local runs without a collector.
///
/// Clones share the same buffer, so a host can keep one handle and give
/// another to the agent.
#[derive(Debug, Clone, Default)]
pub struct MemoryCollector {
    events: Arc<Mutex<Vec<AgentEvent>>>,
}

impl MemoryCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything received so far, in delivery order.
    pub fn events(&self) -> Vec<AgentEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Only the custom events, in delivery order.
    pub fn custom_events(&self) -> Vec<CustomEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                AgentEvent::Custom(custom) => Some(custom.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Collector for MemoryCollector {
    async fn send_event(&self, event: AgentEvent) -> Result<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}
