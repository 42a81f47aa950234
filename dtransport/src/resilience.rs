//! Timeout, retry/backoff policy, and the resilient transport decorator.
//!
//! ```rust
//! use std::time::Duration;
//! use dtransport::RetryPolicy;
//!
//! let policy = RetryPolicy::default();
//! assert_eq!(policy.max_retries, 2);
//! assert_eq!(policy.backoff_after_failure(1), Duration::from_millis(2000));
//! assert_eq!(policy.backoff_after_failure(2), Duration::from_millis(4000));
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dcommon::BoxFuture;

use crate::{HttpRequest, HttpResponse, HttpTransport, TransportError};

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub max_retries: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
    pub backoff_multiplier: f64,
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            attempt_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// `failures` counts failed attempts so far, including the one just observed.
    pub fn should_retry(&self, failures: u32, error: &TransportError) -> bool {
        error.retryable && failures <= self.max_retries
    }

    /// Delay inserted after the k-th failure: `base * multiplier^k`, capped at `max_backoff`.
    pub fn backoff_after_failure(&self, failures: u32) -> Duration {
        let exponent = failures.min(i32::MAX as u32) as i32;
        let unbounded = self.base_backoff.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        Duration::from_secs_f64(unbounded.min(self.max_backoff.as_secs_f64()))
    }
}

/// Per-call overrides layered over the transport's default [`RetryPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestOptions {
    pub max_retries: Option<u32>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn apply(&self, policy: &RetryPolicy) -> RetryPolicy {
        let mut policy = policy.clone();
        if let Some(max_retries) = self.max_retries {
            policy.max_retries = max_retries;
        }

        if let Some(timeout) = self.timeout {
            policy.attempt_timeout = timeout;
        }

        policy
    }
}

/// Observability callbacks for each attempt. Implementations must not alter control flow.
pub trait TransportHooks: Send + Sync {
    fn on_attempt_start(&self, _route: &str, _attempt: u32) {}

    fn on_attempt_failure(&self, _route: &str, _attempt: u32, _error: &TransportError) {}

    fn on_retry_scheduled(
        &self,
        _route: &str,
        _attempt: u32,
        _delay: Duration,
        _error: &TransportError,
    ) {
    }

    fn on_success(&self, _route: &str, _attempts: u32) {}

    fn on_failure(&self, _route: &str, _attempts: u32, _error: &TransportError) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTransportHooks;

impl TransportHooks for NoopTransportHooks {}

pub trait Sleeper: Send + Sync {
    fn sleep(&self, delay: Duration) -> BoxFuture<'static, ()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, delay: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(delay))
    }
}

pub async fn execute_with_retry<T, Op, OpFuture, Sleep, SleepFuture>(
    route: &str,
    policy: &RetryPolicy,
    hooks: &dyn TransportHooks,
    mut execute: Op,
    mut sleep: Sleep,
) -> Result<T, TransportError>
where
    Op: FnMut(u32) -> OpFuture,
    OpFuture: Future<Output = Result<T, TransportError>>,
    Sleep: FnMut(Duration) -> SleepFuture,
    SleepFuture: Future<Output = ()>,
{
    let mut attempt = 1;

    loop {
        hooks.on_attempt_start(route, attempt);

        // Dropping the attempt future on expiry cancels the in-flight call.
        let outcome = match tokio::time::timeout(policy.attempt_timeout, execute(attempt)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(TransportError::timeout(format!(
                "{route} attempt {attempt} cancelled after {} ms",
                policy.attempt_timeout.as_millis()
            ))),
        };

        match outcome {
            Ok(value) => {
                hooks.on_success(route, attempt);
                return Ok(value);
            }
            Err(error) => {
                hooks.on_attempt_failure(route, attempt, &error);

                if policy.should_retry(attempt, &error) {
                    let delay = policy.backoff_after_failure(attempt);
                    hooks.on_retry_scheduled(route, attempt, delay, &error);
                    sleep(delay).await;
                    attempt += 1;
                    continue;
                }

                hooks.on_failure(route, attempt, &error);
                return Err(error);
            }
        }
    }
}

/// Decorates any [`HttpTransport`] with per-attempt timeouts and bounded exponential backoff.
#[derive(Clone)]
pub struct ResilientTransport {
    inner: Arc<dyn HttpTransport>,
    policy: RetryPolicy,
    hooks: Arc<dyn TransportHooks>,
    sleeper: Arc<dyn Sleeper>,
}

impl std::fmt::Debug for ResilientTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientTransport")
            .field("inner", &self.inner)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ResilientTransport {
    pub fn new(inner: Arc<dyn HttpTransport>) -> Self {
        Self {
            inner,
            policy: RetryPolicy::default(),
            hooks: Arc::new(NoopTransportHooks),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn TransportHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.request(request, RequestOptions::default()).await
    }

    /// Returns the first response that arrives without a transport failure, whatever its status.
    ///
    /// Hooks are labelled with [`HttpRequest::route`].
    pub async fn request(
        &self,
        request: HttpRequest,
        options: RequestOptions,
    ) -> Result<HttpResponse, TransportError> {
        let policy = options.apply(&self.policy);
        let route = request.route();

        execute_with_retry(
            &route,
            &policy,
            self.hooks.as_ref(),
            |_| self.inner.send(request.clone()),
            |delay| self.sleeper.sleep(delay),
        )
        .await
    }
}
