mod config;
mod layer;
mod notifier;
mod webhook;

use anyhow::Result;
use config::ObservabilityConfig;
use layer::AlertLayer;
use notifier::Notifier;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use webhook::WebhookAlertSink;

/// Installs the global subscriber: RUST_LOG filtered fmt output with local
/// timestamps, plus the webhook alert layer when `ALERT_WEBHOOK_URL` is set.
/// Must run inside the Tokio runtime.
pub fn init_observability(component: &str) -> Result<()> {
    let mut config = ObservabilityConfig::from_env(component);

    let alert_layer = match config.alert.as_ref() {
        Some(alert) => match WebhookAlertSink::new(alert.webhook_url.clone()) {
            Ok(sink) => Some(AlertLayer::new(
                Notifier::spawn(vec![Arc::new(sink)]),
                config.service_context.clone(),
                alert.min_level,
            )),
            Err(err) => {
                config
                    .warnings
                    .push(format!("alert webhook client could not be built: {err}"));
                None
            }
        },
        None => None,
    };

    let alerts_enabled = alert_layer.is_some();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(alert_layer)
        .try_init()?;

    for warning in &config.warnings {
        warn!(
            service = %config.service_context.service_name,
            component = %config.service_context.component,
            warning = %warning,
            "Observability config warning"
        );
    }

    info!(
        service = %config.service_context.service_name,
        environment = %config.service_context.environment,
        component = %config.service_context.component,
        alerts_enabled,
        "Observability initialised"
    );

    Ok(())
}
