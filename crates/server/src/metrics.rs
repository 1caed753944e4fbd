//! Prometheus metrics
//!
//! The recorder is installed once at startup; `/metrics` renders whatever
//! has been recorded since. Handler-side counters live next to the handlers
//! that increment them.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder. Safe to call once per process; a second
/// install attempt (another recorder already registered) is logged and
/// ignored.
pub fn init_metrics() -> Option<&'static PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(HANDLE.get_or_init(|| handle)),
        Err(e) => {
            tracing::warn!(error = %e, "Prometheus recorder not installed");
            None
        }
    }
}

/// Render current metrics in the Prometheus exposition format.
pub async fn metrics_handler() -> String {
    HANDLE.get().map(|h| h.render()).unwrap_or_default()
}
