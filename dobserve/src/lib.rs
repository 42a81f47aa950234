//! Observability hooks for the resilient transport: structured tracing, metrics, and a
//! panic-isolating wrapper.
//!
//! ```rust
//! use dobserve::{MetricsTransportHooks, SafeTransportHooks, TracingTransportHooks};
//! use dtransport::TransportHooks;
//!
//! fn accepts_hooks(_hooks: &dyn TransportHooks) {}
//!
//! accepts_hooks(&SafeTransportHooks::new(TracingTransportHooks));
//! accepts_hooks(&MetricsTransportHooks);
//! ```

mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsTransportHooks;
pub use safe_hooks::SafeTransportHooks;
pub use tracing_hooks::TracingTransportHooks;

pub mod prelude {
    pub use crate::{MetricsTransportHooks, SafeTransportHooks, TracingTransportHooks};
}

#[cfg(test)]
mod tests;
