use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    register();
    Ok(handle)
}

/// Handle backed by a recorder that is not installed globally. Rendering it
/// yields an empty payload; used where no exporter is wanted (tests).
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

fn register() {
    describe_counter!("tool_calls_total", "Tool invocations by tool name");
    describe_counter!("tool_failures_total", "Tool invocations that returned a failure payload");
    describe_counter!("dune_poll_attempts_total", "Dune execution status polls");
    describe_counter!("quote_requests_total", "1inch quote requests sent");
    describe_counter!("quote_failures_total", "1inch quote requests that failed");
    describe_counter!("price_lookup_failures_total", "CoinGecko lookups reported as zero");
    describe_histogram!(
        "report_latency_seconds",
        Unit::Seconds,
        "Wall time to build a swap report"
    );

    // Pre-register counters so they appear even before the first increment.
    counter!("dune_poll_attempts_total").absolute(0);
    counter!("quote_requests_total").absolute(0);
    counter!("quote_failures_total").absolute(0);
    counter!("price_lookup_failures_total").absolute(0);

    // Histogram is lazily created on first record; force creation.
    histogram!("report_latency_seconds").record(0.0);
}
