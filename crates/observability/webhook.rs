use super::notifier::{AlertEvent, AlertSink};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use url::Url;

/// Posts alerts as JSON to a generic incoming-webhook endpoint.
pub(crate) struct WebhookAlertSink {
    webhook_url: Url,
    client: Client,
}

impl WebhookAlertSink {
    pub(crate) fn new(webhook_url: Url) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(3)).build()?;
        Ok(Self {
            webhook_url,
            client,
        })
    }
}

pub(crate) fn alert_payload(event: &AlertEvent) -> Value {
    let summary = format!(
        "[{}] {} {} {}: {}",
        event.level.as_str(),
        event.service_name,
        event.environment,
        event.component,
        event.message.as_deref().unwrap_or("<no message>")
    );

    json!({
        "text": summary,
        "level": event.level.as_str(),
        "timestamp": event.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        "target": event.target,
        "fields": event.fields,
    })
}

#[async_trait]
impl AlertSink for WebhookAlertSink {
    async fn send(&self, event: &AlertEvent) -> Result<()> {
        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(&alert_payload(event))
            .send()
            .await
            // reqwest errors echo the URL, which carries the webhook token.
            .map_err(|err| anyhow!("alert webhook request failed: {}", err.without_url()))?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(anyhow!(
            "alert webhook returned non-success status: {}",
            response.status()
        ))
    }

    fn sink_name(&self) -> &'static str {
        "webhook"
    }
}
