use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{AgentEvent, Collector};
use crate::common::error::{Result, TelemetryError};
use crate::config::AgentConfig;

/// Pushes agent events to the collector's HTTP event endpoint as JSON.
pub struct HttpCollector {
    client: reqwest::Client,
    endpoint: String,
    license_key: String,
    app_name: String,
}

impl HttpCollector {
    pub fn new(config: &AgentConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/v1/events", config.host.trim_end_matches('/')),
            license_key: config.license_key.clone(),
            app_name: config.app_name.clone(),
        })
    }
}

#[async_trait]
impl Collector for HttpCollector {
    async fn send_event(&self, event: AgentEvent) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-License-Key", &self.license_key)
            .query(&[("app", self.app_name.as_str())])
            .json(&event)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TelemetryError::CollectorStatus(status.as_u16()));
        }
        debug!(endpoint = %self.endpoint, "delivered agent event");
        Ok(())
    }
}
