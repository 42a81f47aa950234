use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use dtransport::{TransportError, TransportHooks};

/// Swallows panics raised by the wrapped hooks so diagnostics never abort a request.
pub struct SafeTransportHooks<H> {
    inner: H,
}

impl<H> SafeTransportHooks<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

impl<H> TransportHooks for SafeTransportHooks<H>
where
    H: TransportHooks,
{
    fn on_attempt_start(&self, route: &str, attempt: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_attempt_start(route, attempt)
        }));
    }

    fn on_attempt_failure(&self, route: &str, attempt: u32, error: &TransportError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_attempt_failure(route, attempt, error)
        }));
    }

    fn on_retry_scheduled(
        &self,
        route: &str,
        attempt: u32,
        delay: Duration,
        error: &TransportError,
    ) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner
                .on_retry_scheduled(route, attempt, delay, error)
        }));
    }

    fn on_success(&self, route: &str, attempts: u32) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_success(route, attempts)
        }));
    }

    fn on_failure(&self, route: &str, attempts: u32, error: &TransportError) {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            self.inner.on_failure(route, attempts, error)
        }));
    }
}
