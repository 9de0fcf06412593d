//! Tracing subscriber configuration.

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "info";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event (default).
    #[default]
    Json,
    /// Human-readable lines for local development.
    Pretty,
}

impl LogFormat {
    /// Unknown values fall back to JSON.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberSettings {
    /// `EnvFilter` directive, e.g. `info,storefront_inventory=debug`.
    pub directive: String,
    pub format: LogFormat,
}

impl Default for SubscriberSettings {
    fn default() -> Self {
        Self {
            directive: DEFAULT_DIRECTIVE.to_string(),
            format: LogFormat::Json,
        }
    }
}

impl SubscriberSettings {
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var(EnvFilter::DEFAULT_ENV).ok(),
            std::env::var("LOG_FORMAT").ok(),
        )
    }

    fn from_values(directive: Option<String>, format: Option<String>) -> Self {
        Self {
            directive: directive
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DIRECTIVE.to_string()),
            format: format.as_deref().map(LogFormat::parse).unwrap_or_default(),
        }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
    }
}

/// Install the global subscriber. Later calls are ignored.
pub fn init(settings: &SubscriberSettings) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(settings.filter())
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    let _ = match settings.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
}
