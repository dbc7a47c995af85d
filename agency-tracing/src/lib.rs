#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![cfg_attr(feature = "fail-on-warnings", deny(clippy::all))]

use opentelemetry::{global, trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{propagation::TraceContextPropagator, runtime, trace, Resource};
use opentelemetry_semantic_conventions::resource;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub use tracing::*;

const DEFAULT_FILTER: &str = "info,agency_ledger=info,sqlx=warn";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TracingConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Emit JSON lines instead of human readable output.
    #[serde(default)]
    pub json: bool,
    /// OTLP/HTTP collector endpoint. Spans are only exported when set.
    #[serde(default)]
    pub otel_endpoint: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            json: false,
            otel_endpoint: None,
        }
    }
}

fn default_service_name() -> String {
    "agency-ledger-dev".to_string()
}

pub fn init_tracer(config: TracingConfig) -> anyhow::Result<()> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    let telemetry = match config.otel_endpoint.as_deref() {
        Some(endpoint) => {
            let provider = opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(
                    opentelemetry_otlp::new_exporter()
                        .http()
                        .with_endpoint(endpoint),
                )
                .with_trace_config(
                    trace::Config::default().with_resource(telemetry_resource(&config)),
                )
                .install_batch(runtime::Tokio)?;
            let tracer = provider.tracer(config.service_name.clone());
            global::set_tracer_provider(provider);
            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        }
        None => None,
    };

    let filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;
    let json_layer = config.json.then(|| fmt::layer().json());
    let pretty_layer = (!config.json).then(fmt::layer);
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(json_layer)
        .with(pretty_layer)
        .with(telemetry)
        .try_init()?;

    Ok(())
}

/// Flushes pending spans. Call before the process exits.
pub fn shutdown_tracer() {
    global::shutdown_tracer_provider();
}

fn telemetry_resource(config: &TracingConfig) -> Resource {
    Resource::default().merge(&Resource::new(vec![
        KeyValue::new(resource::SERVICE_NAME, config.service_name.clone()),
        KeyValue::new(resource::SERVICE_NAMESPACE, "agency"),
    ]))
}
