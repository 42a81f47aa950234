//! Network plumbing for the draftboard client: HTTP transport contract, CSRF stamping, and a
//! retry/backoff decorator that bounds every attempt with a timeout.
//!
//! ```rust
//! use dtransport::{RequestOptions, RetryPolicy};
//! use std::time::Duration;
//!
//! let policy = RequestOptions::default()
//!     .with_max_retries(0)
//!     .apply(&RetryPolicy::default());
//! assert_eq!(policy.total_attempts(), 1);
//! assert_eq!(policy.attempt_timeout, Duration::from_secs(30));
//! ```

mod csrf;
mod error;
mod resilience;
mod transport;

pub mod prelude {
    pub use crate::{
        HttpRequest, HttpResponse, HttpTransport, NoopTransportHooks, RequestOptions,
        ResilientTransport, RetryPolicy, SecurityContext, Sleeper, TokioSleeper, TransportError,
        TransportErrorKind, TransportHooks, execute_with_retry,
    };
    pub use dcommon::BoxFuture;
}

pub use crate::csrf::{DEFAULT_CSRF_COOKIE, DEFAULT_CSRF_HEADER, SecretString, SecurityContext};
pub use crate::error::{TransportError, TransportErrorKind};
#[cfg(feature = "reqwest-transport")]
pub use crate::transport::ReqwestTransport;
pub use crate::resilience::{
    NoopTransportHooks, RequestOptions, ResilientTransport, RetryPolicy, Sleeper, TokioSleeper,
    TransportHooks, execute_with_retry,
};
pub use crate::transport::{HttpRequest, HttpResponse, HttpTransport, encode_path_segment};
pub use http::{Method, StatusCode};
