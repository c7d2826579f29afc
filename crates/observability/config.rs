use std::env;
use tracing::Level;
use url::Url;

#[derive(Debug, Clone)]
pub(crate) struct ServiceContext {
    pub(crate) service_name: String,
    pub(crate) environment: String,
    pub(crate) component: String,
}

#[derive(Debug, Clone)]
pub(crate) struct AlertConfig {
    pub(crate) webhook_url: Url,
    pub(crate) min_level: Level,
}

#[derive(Debug, Clone)]
pub(crate) struct ObservabilityConfig {
    pub(crate) service_context: ServiceContext,
    pub(crate) alert: Option<AlertConfig>,
    /// Parse problems, logged once tracing is up.
    pub(crate) warnings: Vec<String>,
}

impl ObservabilityConfig {
    pub(crate) fn from_env(component: &str) -> Self {
        let component = component.trim().to_string();
        let service_name = env_string("SERVICE_NAME").unwrap_or_else(|| component.clone());
        let environment = env_string("STAGE").unwrap_or_else(|| "unknown".to_string());

        let (alert, warnings) = alert_from_values(
            env_string("ALERT_WEBHOOK_URL").as_deref(),
            env_string("ALERT_NOTIFY_LEVEL").as_deref(),
        );

        Self {
            service_context: ServiceContext {
                service_name,
                environment,
                component,
            },
            alert,
            warnings,
        }
    }
}

pub(crate) fn alert_from_values(
    webhook_url: Option<&str>,
    level: Option<&str>,
) -> (Option<AlertConfig>, Vec<String>) {
    let mut warnings = Vec::new();

    let Some(raw_url) = webhook_url else {
        return (None, warnings);
    };

    let webhook_url = match Url::parse(raw_url) {
        Ok(url) => url,
        Err(err) => {
            // The URL itself may embed a token, so only the parse error is reported.
            warnings.push(format!(
                "ALERT_WEBHOOK_URL is set but invalid; alerts disabled (parse error: {err})"
            ));
            return (None, warnings);
        }
    };

    let min_level = match level {
        None => Level::ERROR,
        Some(raw) => parse_level(raw).unwrap_or_else(|| {
            warnings.push(format!(
                "ALERT_NOTIFY_LEVEL is invalid (value: {raw}); defaulting to ERROR"
            ));
            Level::ERROR
        }),
    };

    (
        Some(AlertConfig {
            webhook_url,
            min_level,
        }),
        warnings,
    )
}

pub(crate) fn parse_level(input: &str) -> Option<Level> {
    match input.trim().to_ascii_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alerts_are_disabled_without_url() {
        let (alert, warnings) = alert_from_values(None, Some("warn"));
        assert!(alert.is_none());
        assert!(warnings.is_empty());
    }

    #[test]
    fn invalid_url_disables_alerts_with_warning() {
        let (alert, warnings) = alert_from_values(Some("not a url"), None);
        assert!(alert.is_none());
        assert_eq!(warnings.len(), 1);
        assert!(!warnings[0].contains("not a url"));
    }

    #[test]
    fn level_defaults_to_error() {
        let (alert, warnings) = alert_from_values(Some("https://hooks.example.com/x"), Some("loud"));
        assert_eq!(alert.unwrap().min_level, Level::ERROR);
        assert_eq!(warnings.len(), 1);

        let (alert, _) = alert_from_values(Some("https://hooks.example.com/x"), Some(" Warning "));
        assert_eq!(alert.unwrap().min_level, Level::WARN);
    }
}
