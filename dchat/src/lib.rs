//! Design-chat client core: session resolution, chat operations, and side-state reconciliation.
//!
//! ```rust
//! use dchat::{PromptIssue, RatingScores, RatingState, validate_prompt};
//!
//! assert_eq!(validate_prompt("  a neon koi logo "), Ok("a neon koi logo"));
//! assert_eq!(validate_prompt("hi"), Err(PromptIssue::TooShort));
//!
//! let rated = RatingState::Submitted(RatingScores::new(5, 4, 4));
//! assert!(!rated.submit_enabled());
//! ```

mod actions;
mod api;
mod controller;
mod error;
mod reconcile;
mod resolver;
mod surface;
mod types;
mod wire;

pub mod prelude {
    pub use crate::{
        ActionHandle, ActionKind, ActionRegistry, AlwaysConfirm, ChatController, ChatError,
        ChatErrorKind, Confirm, DeleteOutcome, DesignApi, FavoriteRecord, FavoriteState,
        GenerationReply, GenerationRequest, Message, NeverConfirm, Notification,
        NotificationLevel, RatingRecord, RatingScores, RatingState, RecordingSurface,
        RenderSurface, RenderedMessage, Resolution, ResolutionOrigin, Role, SentTurn, Session,
        SessionResolver, SideState, StateReconciler, StyleInfo,
    };
    pub use dcommon::{FavoriteId, ImageRef, MessageId, SessionId};
}

pub use actions::{ActionHandle, ActionKind, ActionRegistry, Registration};
pub use api::{
    DesignApi, FAVORITES_PAGE_SIZE, FavoriteRemoval, GeneratedImage, GenerationReply,
    GenerationRequest, RatingSubmission,
};
pub use controller::{ChatController, DeleteOutcome, SentTurn};
pub use error::{ChatError, ChatErrorKind};
pub use reconcile::{SideState, StateReconciler};
pub use resolver::{DEFAULT_SESSION_NAME, Resolution, ResolutionOrigin, SessionResolver};
pub use surface::{
    AlwaysConfirm, Confirm, DEFAULT_NOTIFICATION_TTL, NeverConfirm, Notification,
    NotificationLevel, RecordingSurface, RenderSurface, SurfaceSnapshot,
};
pub use types::{
    DEFAULT_STYLE, FavoriteRecord, FavoriteState, Message, PROMPT_MAX_CHARS, PROMPT_MIN_CHARS,
    PromptIssue, RATING_MAX, RATING_MIN, RatingRecord, RatingScores, RatingState,
    RenderedMessage, Role, SESSION_NAME_MAX_CHARS, Session, StyleInfo, normalize_image_payload,
    validate_prompt, validate_session_name,
};
pub use dcommon::{FavoriteId, ImageRef, MessageId, SessionId};
