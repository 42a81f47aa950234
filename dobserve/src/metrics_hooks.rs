//! Metrics-based hooks for transport attempts.
//!
//! ```rust
//! use dobserve::MetricsTransportHooks;
//! use dtransport::TransportHooks;
//!
//! let hooks = MetricsTransportHooks;
//! hooks.on_attempt_start("GET /chat/session/{id}", 1);
//! ```

use std::time::Duration;

use dtransport::{TransportError, TransportHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsTransportHooks;

impl TransportHooks for MetricsTransportHooks {
    fn on_attempt_start(&self, route: &str, _attempt: u32) {
        metrics::counter!(
            "draftboard_transport_attempt_start_total",
            "route" => route.to_string()
        )
        .increment(1);
    }

    fn on_attempt_failure(&self, route: &str, _attempt: u32, error: &TransportError) {
        metrics::counter!(
            "draftboard_transport_attempt_failure_total",
            "route" => route.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
    }

    fn on_retry_scheduled(
        &self,
        route: &str,
        _attempt: u32,
        delay: Duration,
        error: &TransportError,
    ) {
        metrics::counter!(
            "draftboard_transport_retry_scheduled_total",
            "route" => route.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "draftboard_transport_retry_delay_seconds",
            "route" => route.to_string()
        )
        .record(delay.as_secs_f64());
    }

    fn on_success(&self, route: &str, attempts: u32) {
        metrics::counter!(
            "draftboard_transport_success_total",
            "route" => route.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "draftboard_transport_attempts_per_success",
            "route" => route.to_string()
        )
        .record(attempts as f64);
    }

    fn on_failure(&self, route: &str, attempts: u32, error: &TransportError) {
        metrics::counter!(
            "draftboard_transport_failure_total",
            "route" => route.to_string(),
            "error_kind" => format!("{:?}", error.kind)
        )
        .increment(1);
        metrics::histogram!(
            "draftboard_transport_attempts_per_failure",
            "route" => route.to_string()
        )
        .record(attempts as f64);
    }
}
