use crate::config::LogFormat;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::TracerProvider;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_DIRECTIVES: &str = "info";
const TRACER_NAME: &str = "student-api";

/// Install the global subscriber and W3C trace-context propagator.
///
/// The returned provider must be kept alive for spans to keep their otel ids.
pub fn logger_setup(format: LogFormat) -> anyhow::Result<TracerProvider> {
    opentelemetry::global::set_text_map_propagator(TraceContextPropagator::new());

    let provider = TracerProvider::builder().build();
    let tracer = provider.tracer(TRACER_NAME);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_opentelemetry::layer().with_tracer(tracer));

    match format {
        LogFormat::Json => subscriber
            .with(fmt::layer().json().with_current_span(true))
            .try_init()?,
        LogFormat::Stackdriver => subscriber.with(tracing_stackdriver::layer()).try_init()?,
        LogFormat::Pretty => subscriber.with(fmt::layer()).try_init()?,
    }

    Ok(provider)
}
