use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, Registry, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

#[derive(Debug, Clone, Copy)]
enum Sink {
    Stdout,
    Stderr,
}

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();
    install(logging, Sink::Stdout)
}

/// Same as [`init`], but logs go to stderr so stdout stays machine readable.
pub fn init_for_cli(logging: &LoggingSettings) -> Result<(), InfraError> {
    install(logging, Sink::Stderr)
}

fn install(logging: &LoggingSettings, sink: Sink) -> Result<(), InfraError> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = match (logging.format, sink) {
        (LogFormat::Json, Sink::Stdout) => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        (LogFormat::Json, Sink::Stderr) => fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        (LogFormat::Compact, Sink::Stdout) => fmt::layer().compact().with_target(true).boxed(),
        (LogFormat::Compact, Sink::Stderr) => fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "fieldnotes_relay_commits_total",
            Unit::Count,
            "Total number of publish batches fully written upstream."
        );
        describe_counter!(
            "fieldnotes_relay_files_written_total",
            Unit::Count,
            "Total number of files written upstream by the relay."
        );
        describe_counter!(
            "fieldnotes_relay_rejections_total",
            Unit::Count,
            "Total number of publish requests rejected before any write."
        );
    });
}
