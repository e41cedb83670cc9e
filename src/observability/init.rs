//! Tracing subscriber setup.

use super::tracer::file_tracer_provider;
use crate::infrastructure::paths::{default_trace_file, ensure_dir};
use crate::Config;
use opentelemetry::trace::TracerProvider as _;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Service name attached to every exported span.
pub const SERVICE_NAME: &str = "brainbox";

/// Resolves the filter directive: `RUST_LOG`, then the configured level,
/// then `info`.
#[must_use]
pub fn resolve_level(env: Option<String>, configured: Option<&str>) -> String {
    env.filter(|value| !value.trim().is_empty())
        .or_else(|| configured.map(String::from))
        .unwrap_or_else(|| "info".to_string())
}

/// Installs the global subscriber.
///
/// Logs go to stderr in compact form. When `config.trace_file` is set, spans
/// are also exported as JSON to the data directory. Calling this more than
/// once is harmless: only the first call installs a subscriber, and failures
/// to prepare the span file leave plain logging in place.
///
/// ```
/// use brainbox::observability::init_tracing;
/// use brainbox::Config;
///
/// init_tracing(&Config::default());
/// tracing::debug!("tracing is active");
/// ```
pub fn init_tracing(config: &Config) {
    let level = resolve_level(std::env::var("RUST_LOG").ok(), config.trace_level.as_deref());
    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().compact().with_writer(std::io::stderr);

    let otel_layer = config.trace_file.then(default_trace_file).and_then(|path| {
        let dir = path.parent()?;
        ensure_dir(dir).ok()?;
        let provider = file_tracer_provider(path, SERVICE_NAME);
        opentelemetry::global::set_tracer_provider(provider.clone());
        Some(OpenTelemetryLayer::new(provider.tracer(SERVICE_NAME)))
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init();
}

/// Flushes and shuts down the span exporter, if one was installed.
pub fn shutdown_tracing() {
    opentelemetry::global::shutdown_tracer_provider();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_precedence() {
        assert_eq!(resolve_level(Some("trace".into()), Some("debug")), "trace");
        assert_eq!(resolve_level(Some("  ".into()), Some("debug")), "debug");
        assert_eq!(resolve_level(None, None), "info");
    }
}
