//! Tracing subscriber initialization for host applications.
//!
//! ```no_run
//! draftboard::init_tracing("draftboard=info").expect("subscriber installs once");
//! ```

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// `RUST_LOG` wins when set; otherwise `default_directives` is used.
pub fn env_filter(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives))
}

/// Installs a global `fmt` subscriber with target visibility.
///
/// # Errors
///
/// Fails if a global subscriber has already been set.
pub fn init_tracing(default_directives: &str) -> Result<(), TryInitError> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

    tracing_subscriber::registry()
        .with(env_filter(default_directives))
        .with(fmt_layer)
        .try_init()
}
