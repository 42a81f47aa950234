//! Presentation seam: the controller drives a [`RenderSurface`] and never touches a UI directly.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use dcommon::{ImageRef, SessionId};

use crate::{FavoriteState, RatingState, RenderedMessage, Session};

pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub ttl: Duration,
    pub raised_at: Instant,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            ttl: DEFAULT_NOTIFICATION_TTL,
            raised_at: Instant::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) >= self.ttl
    }
}

pub trait RenderSurface: Send + Sync {
    fn show_welcome(&self);
    fn show_messages(&self, messages: &[RenderedMessage]);
    fn append_message(&self, message: &RenderedMessage);
    fn show_sessions(&self, sessions: &[Session], active: Option<&SessionId>);
    fn update_session_label(&self, id: &SessionId, name: &str);
    fn remove_session(&self, id: &SessionId);
    fn set_loading(&self, loading: bool);
    fn apply_rating(&self, image_ref: &ImageRef, state: &RatingState);
    fn apply_favorite(&self, image_ref: &ImageRef, state: &FavoriteState);
    fn notify(&self, notification: Notification);
}

/// Gate for irreversible actions.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NeverConfirm;

impl Confirm for NeverConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceSnapshot {
    pub welcome_visible: bool,
    pub messages: Vec<RenderedMessage>,
    pub sessions: Vec<Session>,
    pub highlighted_session: Option<SessionId>,
    pub loading: bool,
    pub loading_transitions: Vec<bool>,
    pub notifications: Vec<Notification>,
}

/// Headless surface that keeps the last rendered state in memory.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    state: Mutex<SurfaceSnapshot>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> SurfaceSnapshot {
        self.state().clone()
    }

    pub fn messages(&self) -> Vec<RenderedMessage> {
        self.state().messages.clone()
    }

    pub fn sessions(&self) -> Vec<Session> {
        self.state().sessions.clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.state().notifications.clone()
    }

    pub fn last_notification(&self) -> Option<Notification> {
        self.state().notifications.last().cloned()
    }

    /// Notifications still on screen at `now`.
    pub fn visible_notifications(&self, now: Instant) -> Vec<Notification> {
        self.state()
            .notifications
            .iter()
            .filter(|notification| !notification.is_expired_at(now))
            .cloned()
            .collect()
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    fn state(&self) -> MutexGuard<'_, SurfaceSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update_image<F>(&self, image_ref: &ImageRef, mut apply: F)
    where
        F: FnMut(&mut RenderedMessage),
    {
        let mut state = self.state();
        for message in state
            .messages
            .iter_mut()
            .filter(|message| message.image_ref() == Some(image_ref))
        {
            apply(message);
        }
    }
}

impl RenderSurface for RecordingSurface {
    fn show_welcome(&self) {
        let mut state = self.state();
        state.welcome_visible = true;
        state.messages.clear();
    }

    fn show_messages(&self, messages: &[RenderedMessage]) {
        let mut state = self.state();
        state.welcome_visible = messages.is_empty();
        state.messages = messages.to_vec();
    }

    fn append_message(&self, message: &RenderedMessage) {
        let mut state = self.state();
        state.welcome_visible = false;
        state.messages.push(message.clone());
    }

    fn show_sessions(&self, sessions: &[Session], active: Option<&SessionId>) {
        let mut state = self.state();
        state.sessions = sessions.to_vec();
        state.highlighted_session = active.cloned();
    }

    fn update_session_label(&self, id: &SessionId, name: &str) {
        let mut state = self.state();
        if let Some(session) = state.sessions.iter_mut().find(|session| &session.id == id) {
            session.display_name = name.to_string();
        }
    }

    fn remove_session(&self, id: &SessionId) {
        let mut state = self.state();
        state.sessions.retain(|session| &session.id != id);
        if state.highlighted_session.as_ref() == Some(id) {
            state.highlighted_session = None;
        }
    }

    fn set_loading(&self, loading: bool) {
        let mut state = self.state();
        state.loading = loading;
        state.loading_transitions.push(loading);
    }

    fn apply_rating(&self, image_ref: &ImageRef, state: &RatingState) {
        self.update_image(image_ref, |message| message.rating = Some(state.clone()));
    }

    fn apply_favorite(&self, image_ref: &ImageRef, state: &FavoriteState) {
        self.update_image(image_ref, |message| message.favorite = Some(state.clone()));
    }

    fn notify(&self, notification: Notification) {
        self.state().notifications.push(notification);
    }
}
