//! Tracing-based hooks for transport attempts.
//!
//! Timeout cancellations are logged as their own event so they can be told apart from
//! connection failures in aggregated logs.

use std::time::Duration;

use dtransport::{TransportError, TransportHooks};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTransportHooks;

impl TransportHooks for TracingTransportHooks {
    fn on_attempt_start(&self, route: &str, attempt: u32) {
        tracing::debug!(phase = "transport", event = "attempt_start", route, attempt);
    }

    fn on_attempt_failure(&self, route: &str, attempt: u32, error: &TransportError) {
        if error.is_timeout() {
            tracing::warn!(
                phase = "transport",
                event = "attempt_timed_out",
                route,
                attempt,
                error = %error
            );
        } else {
            tracing::warn!(
                phase = "transport",
                event = "attempt_failed",
                route,
                attempt,
                error_kind = ?error.kind,
                retryable = error.retryable,
                error = %error
            );
        }
    }

    fn on_retry_scheduled(
        &self,
        route: &str,
        attempt: u32,
        delay: Duration,
        error: &TransportError,
    ) {
        tracing::info!(
            phase = "transport",
            event = "retry_scheduled",
            route,
            attempt,
            delay_ms = delay.as_millis() as u64,
            error_kind = ?error.kind
        );
    }

    fn on_success(&self, route: &str, attempts: u32) {
        tracing::debug!(phase = "transport", event = "success", route, attempts);
    }

    fn on_failure(&self, route: &str, attempts: u32, error: &TransportError) {
        tracing::error!(
            phase = "transport",
            event = "failure",
            route,
            attempts,
            error_kind = ?error.kind,
            retryable = error.retryable,
            error = %error
        );
    }
}
