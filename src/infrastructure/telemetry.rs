//! Logging and metrics setup

use metrics::describe_counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` overrides `default_level` when set.
pub fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))
}

/// Install the Prometheus recorder and describe the role counters
pub fn install_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_metrics();
    Ok(handle)
}

pub fn describe_metrics() {
    describe_counter!("group_roles_saved_total", "Total number of group roles saved");
    describe_counter!(
        "group_role_conflicts_total",
        "Total number of group role saves rejected because the id was taken"
    );
    describe_counter!(
        "group_permissions_resolved_total",
        "Total number of permissions returned by catalog resolutions"
    );
}
