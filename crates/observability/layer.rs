use super::config::ServiceContext;
use super::notifier::{AlertEvent, Notifier};
use chrono::Utc;
use std::collections::BTreeMap;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Events carrying this field set to `true` are always alerted, whatever their level.
pub(crate) const ALERT_FIELD: &str = "ledger_inconsistency";

pub(crate) struct AlertLayer {
    notifier: Notifier,
    service_context: ServiceContext,
    min_level: Level,
}

impl AlertLayer {
    pub(crate) fn new(notifier: Notifier, service_context: ServiceContext, min_level: Level) -> Self {
        Self {
            notifier,
            service_context,
            min_level,
        }
    }
}

#[derive(Default)]
pub(crate) struct FieldCollector {
    pub(crate) values: BTreeMap<String, String>,
    pub(crate) forced: bool,
}

impl FieldCollector {
    fn insert(&mut self, field: &Field, value: String) {
        self.values
            .insert(field.name().to_string(), redact(field.name(), value));
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == ALERT_FIELD && value {
            self.forced = true;
        }
        self.insert(field, value.to_string());
    }
}

pub(crate) fn should_alert(level: Level, min_level: Level, forced: bool) -> bool {
    // tracing orders levels by verbosity: ERROR < WARN < ... < TRACE.
    forced || level <= min_level
}

impl<S: Subscriber> Layer<S> for AlertLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = FieldCollector::default();
        event.record(&mut fields);

        let level = *event.metadata().level();
        if !should_alert(level, self.min_level, fields.forced) {
            return;
        }

        let message = fields
            .values
            .remove("message")
            .map(|raw| raw.trim_matches('"').to_string());

        self.notifier.try_notify(AlertEvent {
            level,
            timestamp: Utc::now(),
            service_name: self.service_context.service_name.clone(),
            environment: self.service_context.environment.clone(),
            component: self.service_context.component.clone(),
            target: event.metadata().target().to_string(),
            message,
            fields: fields.values,
        });
    }
}

fn redact(field_name: &str, value: String) -> String {
    let field = field_name.to_ascii_lowercase();
    let sensitive = ["secret", "password", "token", "authorization", "hmac", "api_key"]
        .iter()
        .any(|needle| field.contains(needle));

    if sensitive {
        return "[REDACTED]".to_string();
    }
    value
}
