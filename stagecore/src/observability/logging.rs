//! Process-wide tracing subscriber setup.

use std::sync::OnceLock;
use tracing::debug;
use tracing_subscriber::EnvFilter;

static INIT: OnceLock<()> = OnceLock::new();

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`. Only the first call
/// has an effect; later calls, and calls made after another subscriber was
/// installed, are ignored.
pub fn init_tracing(default_filter: &str, format: LogFormat) {
    INIT.get_or_init(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true);
        let installed = match format {
            LogFormat::Text => builder.try_init(),
            LogFormat::Json => builder.json().with_current_span(true).try_init(),
        };
        if let Err(err) = installed {
            debug!(error = %err, "Tracing subscriber not installed");
        }
    });
}
