//! Logging and OpenTelemetry tracing setup.
//!
//! Installs the global `tracing` subscriber for the harness binary: an
//! `EnvFilter`, a human-readable `fmt` layer and, when an OTLP endpoint is
//! configured, a span exporter so scenario runs can be inspected in a trace
//! backend next to the connector's own telemetry.
//!
//! # Usage
//!
//! ```rust,ignore
//! use search_client::telemetry::TracingConfig;
//!
//! let guard = TracingConfig::new()
//!     .with_otlp_endpoint("http://localhost:4317")
//!     .init()?;
//! // Run scenarios...
//! guard.shutdown(); // Flush spans before exit
//! ```

use opentelemetry::trace::TracerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming the OTLP gRPC endpoint.
pub const ENV_OTLP_ENDPOINT: &str = "HARNESS_OTLP_ENDPOINT";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

const TRACER_NAME: &str = "connector-harness";

/// Configuration for logging and OpenTelemetry tracing.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// OTLP endpoint (e.g., "http://localhost:4317")
    pub otlp_endpoint: Option<String>,
    /// Service name for trace attribution
    pub service_name: String,
    pub service_version: String,
    /// Whether to enable the stdout logging layer
    pub enable_stdout: bool,
    /// Filter directive used when `RUST_LOG` is unset
    pub default_filter: String,
    /// Exporter timeout
    pub timeout: Duration,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            otlp_endpoint: std::env::var(ENV_OTLP_ENDPOINT)
                .ok()
                .filter(|v| !v.trim().is_empty()),
            service_name: TRACER_NAME.to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            enable_stdout: true,
            default_filter: DEFAULT_FILTER.to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl TracingConfig {
    /// Create a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_otlp_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    pub fn with_service_version(mut self, version: impl Into<String>) -> Self {
        self.service_version = version.into();
        self
    }

    pub fn with_stdout(mut self, enable: bool) -> Self {
        self.enable_stdout = enable;
        self
    }

    /// Set the filter used when `RUST_LOG` is unset (e.g. `"debug"`).
    pub fn with_default_filter(mut self, directive: impl Into<String>) -> Self {
        self.default_filter = directive.into();
        self
    }

    /// Install the global subscriber.
    ///
    /// The returned guard must be held until shutdown so pending spans are
    /// flushed.
    ///
    /// # Errors
    /// Returns an error if the OTLP pipeline fails to initialize or a global
    /// subscriber is already installed.
    pub fn init(&self) -> Result<TracingGuard, TracingError> {
        use tracing_subscriber::fmt;

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.default_filter));

        let provider = match self.otlp_endpoint.as_deref() {
            Some(endpoint) => Some(self.create_tracer_provider(endpoint)?),
            None => None,
        };

        let otel_layer = provider.as_ref().map(|provider| {
            tracing_opentelemetry::layer().with_tracer(provider.tracer(TRACER_NAME))
        });
        let fmt_layer = self
            .enable_stdout
            .then(|| fmt::layer().with_writer(std::io::stderr));

        tracing_subscriber::registry()
            .with(env_filter)
            .with(otel_layer)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TracingError::InitError(e.to_string()))?;

        Ok(TracingGuard { provider })
    }

    fn create_tracer_provider(&self, endpoint: &str) -> Result<SdkTracerProvider, TracingError> {
        use opentelemetry_otlp::{Protocol, WithExportConfig};
        use opentelemetry_sdk::trace::{BatchConfig, BatchSpanProcessor, Sampler};

        let otlp_exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint)
            .with_timeout(self.timeout)
            .with_protocol(Protocol::Grpc)
            .build()
            .map_err(|e| TracingError::InitError(e.to_string()))?;

        let batch_processor = BatchSpanProcessor::builder(otlp_exporter)
            .with_batch_config(BatchConfig::default())
            .build();

        let resource = opentelemetry_sdk::Resource::builder()
            .with_attributes(vec![
                opentelemetry::KeyValue::new("service.name", self.service_name.clone()),
                opentelemetry::KeyValue::new("service.version", self.service_version.clone()),
                opentelemetry::KeyValue::new("telemetry.sdk.name", "opentelemetry-rust"),
                opentelemetry::KeyValue::new("telemetry.sdk.language", "rust"),
            ])
            .build();

        Ok(SdkTracerProvider::builder()
            .with_span_processor(batch_processor)
            .with_resource(resource)
            .with_sampler(Sampler::AlwaysOn)
            .build())
    }
}

/// Keeps the tracer provider alive for the lifetime of the process.
pub struct TracingGuard {
    provider: Option<SdkTracerProvider>,
}

impl TracingGuard {
    /// Whether spans are being exported.
    pub fn is_exporting(&self) -> bool {
        self.provider.is_some()
    }

    /// Flush pending spans and stop the exporter.
    pub fn shutdown(&self) {
        if let Some(ref provider) = self.provider
            && let Err(e) = provider.shutdown()
        {
            eprintln!("Failed to flush trace spans: {e}");
        }
    }
}

/// Errors that can occur during tracing initialization.
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Failed to initialize tracing: {0}")]
    InitError(String),
}

/// Add W3C `traceparent` headers for the current span to a request.
pub fn inject_trace_context(builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    use opentelemetry::propagation::TextMapPropagator;
    use opentelemetry_sdk::propagation::TraceContextPropagator;
    use std::collections::HashMap;
    use tracing_opentelemetry::OpenTelemetrySpanExt;

    let propagator = TraceContextPropagator::new();
    let mut headers = HashMap::new();
    let context = tracing::Span::current().context();

    propagator.inject_context(&context, &mut headers);

    headers
        .into_iter()
        .fold(builder, |builder, (key, value)| builder.header(key, value))
}
