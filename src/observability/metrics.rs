use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

/// Render every registered metric in the Prometheus text format.
pub async fn render_metrics() -> String {
    let metrics = get_metrics().await;
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&metrics.registry.gather(), &mut buffer) {
        return format!("# failed to encode metrics: {e}\n");
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Token cache metrics
    pub token_cache_hits: IntCounter,
    pub token_refresh_requests: IntCounter,
    pub token_refresh_failures: IntCounterVec,
    pub token_refresh_duration: Histogram,

    // API metrics
    pub api_requests: IntCounterVec,
    pub api_failures: IntCounterVec,

    // Stream metrics
    pub stream_events: IntCounterVec,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("gigachat".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Token cache
            token_cache_hits: IntCounter::new("token_cache_hits_total", "Tokens served from the cache").unwrap(),
            token_refresh_requests: IntCounter::new("token_refresh_requests_total", "Requests sent to the authorization endpoint").unwrap(),
            token_refresh_failures: IntCounterVec::new(Opts::new("token_refresh_failures_total", "Token refresh failures by reason"), &["reason"]).unwrap(),
            token_refresh_duration: Histogram::with_opts(HistogramOpts::new("token_refresh_duration_seconds", "Token refresh duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0])).unwrap(),

            // API
            api_requests: IntCounterVec::new(Opts::new("api_requests_total", "API requests by endpoint"), &["endpoint"]).unwrap(),
            api_failures: IntCounterVec::new(Opts::new("api_failures_total", "API failures by endpoint and reason"), &["endpoint", "reason"]).unwrap(),

            // Stream
            stream_events: IntCounterVec::new(Opts::new("stream_events_total", "Decoded stream events by kind"), &["kind"]).unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.token_cache_hits.clone())).unwrap();
        reg.register(Box::new(metrics.token_refresh_requests.clone())).unwrap();
        reg.register(Box::new(metrics.token_refresh_failures.clone())).unwrap();
        reg.register(Box::new(metrics.token_refresh_duration.clone())).unwrap();
        reg.register(Box::new(metrics.api_requests.clone())).unwrap();
        reg.register(Box::new(metrics.api_failures.clone())).unwrap();
        reg.register(Box::new(metrics.stream_events.clone())).unwrap();

        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rendered_metrics_carry_namespace() {
        let metrics = get_metrics().await;
        metrics.token_cache_hits.inc();
        metrics.stream_events.with_label_values(&["chunk"]).inc();

        let text = render_metrics().await;
        assert!(text.contains("gigachat_token_cache_hits_total"));
        assert!(text.contains("gigachat_stream_events_total{kind=\"chunk\"}"));
    }
}
