//! Client configuration surface for facade consumers.
//!
//! Every field has a default, so a host can deserialize a partial table from its own
//! config file and fill in the rest through the `with_*` builders.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use dchat::{DEFAULT_NOTIFICATION_TTL, DEFAULT_SESSION_NAME};
use dobserve::{MetricsTransportHooks, SafeTransportHooks, TracingTransportHooks};
use dsession::{FileSessionSlot, InMemorySessionSlot, SessionSlot, SessionStore};
use dtransport::{
    DEFAULT_CSRF_HEADER, NoopTransportHooks, RetryPolicy, SecurityContext, TransportError,
    TransportHooks,
};
use serde::Deserialize;

const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_MAX_RETRIES: u32 = 2;

/// Where the active session id is persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionSlotConfig {
    #[default]
    Memory,
    File {
        path: PathBuf,
    },
}

/// Which transport hooks observe request attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Diagnostics {
    #[default]
    Tracing,
    Metrics,
    Silent,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub csrf_header: String,
    pub csrf_token: Option<String>,
    pub session_slot: SessionSlotConfig,
    pub notification_ttl_secs: u64,
    pub default_session_name: String,
    pub diagnostics: Diagnostics,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            csrf_header: DEFAULT_CSRF_HEADER.to_string(),
            csrf_token: None,
            session_slot: SessionSlotConfig::Memory,
            notification_ttl_secs: DEFAULT_NOTIFICATION_TTL.as_secs(),
            default_session_name: DEFAULT_SESSION_NAME.to_string(),
            diagnostics: Diagnostics::Tracing,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    pub fn with_csrf_header(mut self, header: impl Into<String>) -> Self {
        self.csrf_header = header.into();
        self
    }

    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_slot = SessionSlotConfig::File { path: path.into() };
        self
    }

    pub fn with_notification_ttl(mut self, ttl: Duration) -> Self {
        self.notification_ttl_secs = ttl.as_secs();
        self
    }

    pub fn with_default_session_name(mut self, name: impl Into<String>) -> Self {
        self.default_session_name = name.into();
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_ttl_secs)
    }

    pub fn validate(&self) -> Result<(), TransportError> {
        if self.base_url.trim().is_empty() {
            return Err(TransportError::invalid_request(
                "client base_url must not be empty",
            ));
        }
        if self.timeout_ms == 0 {
            return Err(TransportError::invalid_request(
                "client timeout must be at least one millisecond",
            ));
        }
        if self.csrf_header.trim().is_empty() {
            return Err(TransportError::invalid_request(
                "csrf header name must not be empty",
            ));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries).with_attempt_timeout(self.timeout())
    }

    /// A blank token yields an anonymous context that stamps no header.
    pub fn security_context(&self) -> SecurityContext {
        let context = match self.csrf_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => SecurityContext::new(token),
            _ => SecurityContext::anonymous(),
        };
        context.with_header_name(self.csrf_header.clone())
    }

    pub fn session_store(&self) -> SessionStore {
        let slot: Arc<dyn SessionSlot> = match &self.session_slot {
            SessionSlotConfig::Memory => Arc::new(InMemorySessionSlot::new()),
            SessionSlotConfig::File { path } => Arc::new(FileSessionSlot::new(path)),
        };
        SessionStore::new(slot)
    }

    pub fn transport_hooks(&self) -> Arc<dyn TransportHooks> {
        match self.diagnostics {
            Diagnostics::Tracing => Arc::new(SafeTransportHooks::new(TracingTransportHooks)),
            Diagnostics::Metrics => Arc::new(SafeTransportHooks::new(MetricsTransportHooks)),
            Diagnostics::Silent => Arc::new(NoopTransportHooks),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_client_contract() {
        let config = ClientConfig::new("http://localhost:5000");

        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.csrf_header, "X-CSRFToken");
        assert_eq!(config.notification_ttl(), Duration::from_secs(4));
        assert_eq!(config.session_slot, SessionSlotConfig::Memory);
        assert_eq!(config.default_session_name, "New chat");

        let policy = config.retry_policy();
        assert_eq!(policy.total_attempts(), 3);
        assert_eq!(policy.attempt_timeout, Duration::from_secs(30));
        assert_eq!(policy.backoff_after_failure(1), Duration::from_millis(2000));
        assert_eq!(policy.backoff_after_failure(2), Duration::from_millis(4000));
    }

    #[test]
    fn partial_json_table_fills_in_defaults() {
        let config: ClientConfig = serde_json::from_str(
            r#"{
                "base_url": "https://designs.example",
                "max_retries": 0,
                "session_slot": { "kind": "file", "path": "/tmp/draftboard-session" },
                "diagnostics": "metrics"
            }"#,
        )
        .expect("config should parse");

        assert_eq!(config.base_url, "https://designs.example");
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.timeout_ms, 30_000);
        assert_eq!(
            config.session_slot,
            SessionSlotConfig::File {
                path: PathBuf::from("/tmp/draftboard-session")
            }
        );
        assert_eq!(config.diagnostics, Diagnostics::Metrics);
    }

    #[test]
    fn validate_rejects_missing_base_url_and_zero_timeout() {
        let error = ClientConfig::default()
            .validate()
            .expect_err("empty base url should fail");
        assert_eq!(error.kind, dtransport::TransportErrorKind::InvalidRequest);

        let error = ClientConfig::new("http://localhost")
            .with_timeout(Duration::ZERO)
            .validate()
            .expect_err("zero timeout should fail");
        assert!(error.message.contains("timeout"));

        let error = ClientConfig::new("http://localhost")
            .with_timeout(Duration::from_micros(400))
            .validate()
            .expect_err("timeout below one millisecond should fail");
        assert!(error.message.contains("timeout"));

        assert!(ClientConfig::new("http://localhost").validate().is_ok());
    }

    #[test]
    fn sub_second_timeouts_keep_their_precision() {
        let config = ClientConfig::new("http://localhost").with_timeout(Duration::from_millis(1500));
        assert_eq!(config.timeout_ms, 1500);
        assert_eq!(config.timeout(), Duration::from_millis(1500));
        assert_eq!(
            config.retry_policy().attempt_timeout,
            Duration::from_millis(1500)
        );

        let short = ClientConfig::new("http://localhost").with_timeout(Duration::from_millis(200));
        assert!(short.validate().is_ok());
        assert_eq!(short.timeout(), Duration::from_millis(200));

        let parsed: ClientConfig =
            serde_json::from_str(r#"{"base_url": "http://localhost", "timeout_ms": 2500}"#)
                .expect("config should parse");
        assert_eq!(parsed.timeout(), Duration::from_millis(2500));
    }

    #[test]
    fn security_context_tracks_token_and_header() {
        let anonymous = ClientConfig::new("http://localhost").with_csrf_token("   ");
        assert!(!anonymous.security_context().has_token());

        let context = ClientConfig::new("http://localhost")
            .with_csrf_token("tok-1")
            .with_csrf_header("X-Custom-Token")
            .security_context();
        assert!(context.has_token());
        assert_eq!(context.header_name(), "X-Custom-Token");
    }
}
