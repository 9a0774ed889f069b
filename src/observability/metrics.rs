use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

pub const OUTCOME_OK: &str = "ok";

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

/// Text exposition of every registered metric.
pub async fn render() -> anyhow::Result<String> {
    let metrics = get_metrics().await;
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&metrics.registry.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Token lifecycle
    pub token_fetch_total: IntCounterVec,
    pub token_refresh_total: IntCounterVec,
    pub token_expiry_unix: IntGauge,

    // Authenticated API calls
    pub api_requests_total: IntCounterVec,
    pub api_request_duration: HistogramVec,

    // Config
    pub config_parse_failures: IntCounter,
    pub config_validation_errors: IntCounter,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("ihealth".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            token_fetch_total: IntCounterVec::new(Opts::new("token_fetch_total", "Authorization-code exchanges by outcome"), &["outcome"]).unwrap(),
            token_refresh_total: IntCounterVec::new(Opts::new("token_refresh_total", "Token refreshes by outcome"), &["outcome"]).unwrap(),
            token_expiry_unix: IntGauge::new("token_expiry_unix_seconds", "Expiry of the current token").unwrap(),

            api_requests_total: IntCounterVec::new(Opts::new("api_requests_total", "Authenticated API calls by service and outcome"), &["service", "outcome"]).unwrap(),
            api_request_duration: HistogramVec::new(HistogramOpts::new("api_request_duration_seconds", "Authenticated API call duration seconds").buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]), &["service"]).unwrap(),

            config_parse_failures: IntCounter::new("config_parse_failures_total", "Config files that failed to parse").unwrap(),
            config_validation_errors: IntCounter::new("config_validation_errors_total", "Configs rejected by validation").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.token_fetch_total.clone())).unwrap();
        reg.register(Box::new(metrics.token_refresh_total.clone())).unwrap();
        reg.register(Box::new(metrics.token_expiry_unix.clone())).unwrap();
        reg.register(Box::new(metrics.api_requests_total.clone())).unwrap();
        reg.register(Box::new(metrics.api_request_duration.clone())).unwrap();
        reg.register(Box::new(metrics.config_parse_failures.clone())).unwrap();
        reg.register(Box::new(metrics.config_validation_errors.clone())).unwrap();

        metrics
    }
}
