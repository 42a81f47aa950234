//! Picks the session the client works in: persisted id, then newest listed, then a new one.

use std::sync::Arc;

use dcommon::SessionId;
use dsession::SessionStore;

use crate::{ChatError, DesignApi, Message};

pub const DEFAULT_SESSION_NAME: &str = "New chat";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOrigin {
    Persisted,
    Latest,
    Created,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub session_id: SessionId,
    pub origin: ResolutionOrigin,
    /// History fetched while validating a persisted id; `None` for other origins.
    pub history: Option<Vec<Message>>,
}

#[derive(Debug, Clone)]
pub struct SessionResolver {
    api: Arc<DesignApi>,
    store: Arc<SessionStore>,
    default_name: String,
}

impl SessionResolver {
    pub fn new(api: Arc<DesignApi>, store: Arc<SessionStore>) -> Self {
        Self {
            api,
            store,
            default_name: DEFAULT_SESSION_NAME.to_string(),
        }
    }

    pub fn with_default_name(mut self, name: impl Into<String>) -> Self {
        self.default_name = name.into();
        self
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    /// Runs the fallback chain and adopts the result as the active session.
    ///
    /// Lookup failures in the first two steps fall through to the next step. Only a failure
    /// to create a session is fatal.
    pub async fn resolve(&self) -> Result<Resolution, ChatError> {
        let resolution = if let Some((session_id, history)) = self.persisted_candidate().await {
            Resolution {
                session_id,
                origin: ResolutionOrigin::Persisted,
                history: Some(history),
            }
        } else if let Some(session_id) = self.latest_listed().await {
            Resolution {
                session_id,
                origin: ResolutionOrigin::Latest,
                history: None,
            }
        } else {
            let session = self
                .api
                .create_session(&self.default_name)
                .await
                .map_err(|error| {
                    tracing::error!(
                        phase = "resolver",
                        event = "create_failed",
                        error = %error,
                    );
                    ChatError::state(format!("Could not start a chat session: {}", error.message))
                })?;
            Resolution {
                session_id: session.id,
                origin: ResolutionOrigin::Created,
                history: None,
            }
        };

        self.store.set(resolution.session_id.clone())?;
        tracing::info!(
            phase = "resolver",
            event = "session_resolved",
            session_id = %resolution.session_id,
            origin = ?resolution.origin,
        );

        Ok(resolution)
    }

    /// Returns the active id when one is set; otherwise resolves one.
    pub async fn ensure_session(&self) -> Result<SessionId, ChatError> {
        if let Some(active) = self.store.get() {
            return Ok(active);
        }

        self.resolve().await.map(|resolution| resolution.session_id)
    }

    async fn persisted_candidate(&self) -> Option<(SessionId, Vec<Message>)> {
        let candidate = match self.store.load_persisted() {
            Ok(candidate) => candidate?,
            Err(error) => {
                tracing::warn!(
                    phase = "resolver",
                    event = "persisted_unreadable",
                    error = %error,
                );
                return None;
            }
        };

        match self.api.fetch_session(&candidate).await {
            Ok(history) => Some((candidate, history)),
            Err(error) => {
                tracing::warn!(
                    phase = "resolver",
                    event = "persisted_rejected",
                    session_id = %candidate,
                    error = %error,
                );
                None
            }
        }
    }

    async fn latest_listed(&self) -> Option<SessionId> {
        match self.api.list_sessions().await {
            Ok(sessions) => sessions.into_iter().next().map(|session| session.id),
            Err(error) => {
                tracing::warn!(
                    phase = "resolver",
                    event = "listing_unavailable",
                    error = %error,
                );
                None
            }
        }
    }
}
