//! Unified facade over the draftboard workspace crates.
//!
//! This crate is the single dependency most hosts need. It re-exports the client crates and
//! wires a transport, session store, and [`ChatController`] from one [`ClientConfig`].
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use draftboard::{AlwaysConfirm, ClientConfig, RecordingSurface, build_client};
//!
//! let config = ClientConfig::new("http://localhost:5000").with_csrf_token("token");
//! let bundle = build_client(
//!     &config,
//!     Arc::new(RecordingSurface::new()),
//!     Arc::new(AlwaysConfirm),
//! )
//! .expect("client should build");
//!
//! assert_eq!(bundle.api.transport().policy().max_retries, 2);
//! ```

mod config;
mod runtime;
mod telemetry;

pub mod prelude;

pub use dchat;
pub use dcommon;
pub use dobserve;
pub use dsession;
pub use dtransport;

pub use dchat::{
    ActionHandle, ActionKind, ActionRegistry, AlwaysConfirm, ChatController, ChatError,
    ChatErrorKind, Confirm, DeleteOutcome, DesignApi, FavoriteRecord, FavoriteState,
    Message, NeverConfirm, Notification, NotificationLevel, RatingRecord, RatingScores,
    RatingState, RecordingSurface, RenderSurface, RenderedMessage, Resolution, ResolutionOrigin,
    Role, SentTurn, Session, SessionResolver, SideState, StateReconciler, StyleInfo,
    validate_prompt,
};
pub use dcommon::{BoxFuture, FavoriteId, ImageRef, MessageId, SessionId};
pub use dobserve::{MetricsTransportHooks, SafeTransportHooks, TracingTransportHooks};
pub use dsession::{FileSessionSlot, InMemorySessionSlot, SessionSlot, SessionStore};
pub use dtransport::{
    HttpRequest, HttpResponse, HttpTransport, ResilientTransport, RetryPolicy, SecurityContext,
    TransportError, TransportErrorKind, TransportHooks,
};

pub use config::{ClientConfig, Diagnostics, SessionSlotConfig};
pub use runtime::{ClientBundle, build_client, build_client_with, build_client_with_transport};
pub use telemetry::{env_filter, init_tracing};
