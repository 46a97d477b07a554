use crate::pricing::models::{Category, Provider};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics exporter
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    init_metric_descriptions();

    Ok(handle)
}

/// Initialize metric descriptions (can be called multiple times safely)
fn init_metric_descriptions() {
    describe_counter!(
        "pricing_requests_total",
        "Total number of catalog requests"
    );
    describe_counter!(
        "pricing_lookups_total",
        "Per-SKU raw pricing lookups by outcome"
    );
    describe_counter!(
        "pricing_fallbacks_total",
        "Categories answered from static default tables"
    );
    describe_histogram!(
        "pricing_build_duration_seconds",
        "Time to build one provider catalog"
    );
    describe_gauge!(
        "pricing_service_info",
        "Service version information"
    );

    gauge!("pricing_service_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record a catalog request
pub fn record_request(endpoint: &str) {
    counter!("pricing_requests_total", "endpoint" => endpoint.to_string()).increment(1);
}

/// Record one SKU lookup
pub fn record_lookup(provider: Provider, category: Category, found: bool) {
    counter!(
        "pricing_lookups_total",
        "provider" => provider.as_str(),
        "category" => category.as_str(),
        "outcome" => if found { "hit" } else { "miss" },
    )
    .increment(1);
}

/// Record a wholesale default substitution
pub fn record_fallback(provider: Provider, category: Category) {
    counter!(
        "pricing_fallbacks_total",
        "provider" => provider.as_str(),
        "category" => category.as_str(),
    )
    .increment(1);
}

/// Record catalog build duration
pub fn record_build_duration(provider: Provider, duration: Duration) {
    histogram!(
        "pricing_build_duration_seconds",
        "provider" => provider.as_str(),
    )
    .record(duration.as_secs_f64());
}
