use std::sync::OnceLock;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus exporter and register all application metrics.
/// Returns a `PrometheusHandle` whose `render()` method produces the
/// text/plain Prometheus scrape payload. Idempotent; the first recorder
/// stays installed for the life of the process.
pub fn init_metrics() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder");

            // Pre-register counters so they appear even before the first increment.
            counter!("buys_total").absolute(0);
            counter!("sells_total").absolute(0);
            counter!("trades_rejected_total").absolute(0);
            counter!("price_observations_total").absolute(0);

            gauge!("open_positions").set(0.0);

            handle
        })
        .clone()
}
