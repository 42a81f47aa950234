use std::sync::{Arc, Mutex};
use std::time::Duration;

use dtransport::prelude::*;
use dtransport::StatusCode;

use crate::{MetricsTransportHooks, SafeTransportHooks, TracingTransportHooks};

fn exercise(hooks: &dyn TransportHooks) {
    let timeout = TransportError::timeout("attempt cancelled after 30000 ms");
    let reset = TransportError::connection("connection reset");

    hooks.on_attempt_start("POST /api/generate-image", 1);
    hooks.on_attempt_failure("POST /api/generate-image", 1, &timeout);
    hooks.on_retry_scheduled(
        "POST /api/generate-image",
        1,
        Duration::from_millis(2000),
        &timeout,
    );
    hooks.on_attempt_failure("POST /api/generate-image", 2, &reset);
    hooks.on_success("POST /api/generate-image", 3);
    hooks.on_failure("GET /chat/sessions", 3, &reset);
}

#[test]
fn tracing_hooks_smoke_test_all_callbacks() {
    exercise(&TracingTransportHooks);
}

#[test]
fn metrics_hooks_smoke_test_all_callbacks() {
    exercise(&MetricsTransportHooks);
}

#[derive(Default, Clone)]
struct RecordingHooks {
    events: Arc<Mutex<Vec<&'static str>>>,
}

impl TransportHooks for RecordingHooks {
    fn on_attempt_start(&self, _endpoint: &str, _attempt: u32) {
        self.events
            .lock()
            .expect("events lock")
            .push("attempt_start");
    }

    fn on_attempt_failure(&self, _endpoint: &str, _attempt: u32, error: &TransportError) {
        let event = if error.is_timeout() {
            "attempt_timed_out"
        } else {
            "attempt_failed"
        };
        self.events.lock().expect("events lock").push(event);
    }

    fn on_retry_scheduled(
        &self,
        _endpoint: &str,
        _attempt: u32,
        _delay: Duration,
        _error: &TransportError,
    ) {
        self.events
            .lock()
            .expect("events lock")
            .push("retry_scheduled");
    }

    fn on_success(&self, _endpoint: &str, _attempts: u32) {
        self.events.lock().expect("events lock").push("success");
    }

    fn on_failure(&self, _endpoint: &str, _attempts: u32, _error: &TransportError) {
        self.events.lock().expect("events lock").push("failure");
    }
}

struct PanicHooks;

impl TransportHooks for PanicHooks {
    fn on_attempt_start(&self, _endpoint: &str, _attempt: u32) {
        panic!("attempt_start hook panicked");
    }

    fn on_attempt_failure(&self, _endpoint: &str, _attempt: u32, _error: &TransportError) {
        panic!("attempt_failure hook panicked");
    }

    fn on_retry_scheduled(
        &self,
        _endpoint: &str,
        _attempt: u32,
        _delay: Duration,
        _error: &TransportError,
    ) {
        panic!("retry hook panicked");
    }

    fn on_success(&self, _endpoint: &str, _attempts: u32) {
        panic!("success hook panicked");
    }

    fn on_failure(&self, _endpoint: &str, _attempts: u32, _error: &TransportError) {
        panic!("failure hook panicked");
    }
}

#[test]
fn safe_hooks_forward_every_callback() {
    let recording = RecordingHooks::default();
    let events = recording.events.clone();
    let hooks = SafeTransportHooks::new(recording);

    exercise(&hooks);

    assert_eq!(
        *events.lock().expect("events lock"),
        vec![
            "attempt_start",
            "attempt_timed_out",
            "retry_scheduled",
            "attempt_failed",
            "success",
            "failure",
        ]
    );
}

#[test]
fn safe_hooks_swallow_panics() {
    exercise(&SafeTransportHooks::new(PanicHooks));
}

#[derive(Debug)]
struct OkTransport;

impl HttpTransport for OkTransport {
    fn send<'a>(
        &'a self,
        _request: HttpRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportError>> {
        Box::pin(async { Ok(HttpResponse::new(StatusCode::OK, "[]")) })
    }
}

#[tokio::test]
async fn panicking_hooks_never_fail_a_request() {
    let transport = ResilientTransport::new(Arc::new(OkTransport))
        .with_hooks(Arc::new(SafeTransportHooks::new(PanicHooks)));

    let response = transport
        .send(HttpRequest::get("/chat/sessions"))
        .await
        .expect("request succeeds despite hook panics");

    assert!(response.is_success());
}
