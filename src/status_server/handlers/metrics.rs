//! Prometheus metrics handler.

use std::fmt::Write;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::super::types::StatusState;

/// Prometheus-compatible metrics endpoint
pub async fn metrics_handler(State(state): State<StatusState>) -> Response {
    let statistics = match state.api.statistics().await {
        Ok(statistics) => statistics,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to read site statistics: {}", e),
            )
                .into_response();
        }
    };

    let mut metrics = String::new();
    let _ = writeln!(
        metrics,
        "# HELP mirror_status_sites Number of sites per status\n# TYPE mirror_status_sites gauge"
    );
    for (status, count) in &statistics.status_distribution {
        let _ = writeln!(metrics, "mirror_status_sites{{status=\"{}\"}} {}", status, count);
    }

    let _ = writeln!(
        metrics,
        r#"
# HELP mirror_status_sweep_running Whether a sweep currently holds the sweep lock
# TYPE mirror_status_sweep_running gauge
mirror_status_sweep_running {}

# HELP mirror_status_sweeps_completed_total Full sweeps completed since start
# TYPE mirror_status_sweeps_completed_total counter
mirror_status_sweeps_completed_total {}

# HELP mirror_status_uptime_seconds Seconds since the service started
# TYPE mirror_status_uptime_seconds gauge
mirror_status_uptime_seconds {}

# HELP mirror_status_errors_total Transient failures by kind
# TYPE mirror_status_errors_total counter"#,
        u8::from(state.monitor.is_sweep_running()),
        state.monitor.sweeps_completed(),
        state.start_time.elapsed().as_secs_f64(),
    );
    for (error_type, count) in state.error_stats.snapshot() {
        let _ = writeln!(
            metrics,
            "mirror_status_errors_total{{kind=\"{}\"}} {}",
            error_type.as_ref(),
            count
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4")],
        metrics,
    )
        .into_response()
}
