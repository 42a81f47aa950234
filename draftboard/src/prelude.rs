//! Common imports for most draftboard hosts.

pub use crate::{
    build_client, build_client_with, build_client_with_transport, init_tracing,
};
pub use crate::{
    AlwaysConfirm, BoxFuture, ChatController, ChatError, ChatErrorKind, ClientBundle,
    ClientConfig, Confirm, DeleteOutcome, Diagnostics, HttpRequest, HttpResponse, HttpTransport,
    ImageRef, Message, Notification, NotificationLevel, RatingScores, RecordingSurface,
    RenderSurface, RenderedMessage, Role, SecurityContext, SentTurn, Session, SessionId,
    SessionStore, TransportError,
};
