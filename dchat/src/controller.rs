//! User-facing chat operations.
//!
//! [`ChatController`] owns no UI. It reads and writes the [`SessionStore`], talks to the
//! server through [`DesignApi`], and reports every visible change to a [`RenderSurface`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use dcommon::{FavoriteId, ImageRef, MessageId, SessionId};
use dsession::SessionStore;

use crate::surface::DEFAULT_NOTIFICATION_TTL;
use crate::{
    ActionKind, ActionRegistry, ChatError, Confirm, DesignApi, FavoriteRemoval, FavoriteState,
    GenerationReply, GenerationRequest, Message, Notification, RatingScores, RatingState,
    RatingSubmission, RenderSurface, RenderedMessage, Resolution, ResolutionOrigin, Role,
    DEFAULT_STYLE, Session, SessionResolver, SideState, StateReconciler, validate_prompt,
    validate_session_name,
};

const BUSY_MESSAGE: &str = "Please wait for the current image to finish generating";
const DELETE_PROMPT: &str = "Delete this chat? This cannot be undone.";
const DELETE_FAILED: &str = "Failed to delete chat. Please try again.";
const REMOVE_FAVORITE_FAILED: &str = "Failed to remove from favorites. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentTurn {
    pub session_id: SessionId,
    pub user: RenderedMessage,
    pub assistant: RenderedMessage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Cancelled,
    Deleted { next_active: Option<SessionId> },
}

/// Shows the loading indicator for as long as it is alive.
struct LoadingScope<'a> {
    surface: &'a dyn RenderSurface,
}

impl<'a> LoadingScope<'a> {
    fn enter(surface: &'a dyn RenderSurface) -> Self {
        surface.set_loading(true);
        Self { surface }
    }
}

impl Drop for LoadingScope<'_> {
    fn drop(&mut self) {
        self.surface.set_loading(false);
    }
}

pub struct ChatController {
    api: Arc<DesignApi>,
    store: Arc<SessionStore>,
    resolver: SessionResolver,
    reconciler: StateReconciler,
    surface: Arc<dyn RenderSurface>,
    confirm: Arc<dyn Confirm>,
    actions: ActionRegistry,
    sessions: Mutex<Vec<Session>>,
    image_styles: Mutex<HashMap<ImageRef, String>>,
    local_ids: AtomicU64,
    notification_ttl: Duration,
}

impl std::fmt::Debug for ChatController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatController")
            .field("store", &self.store)
            .field("notification_ttl", &self.notification_ttl)
            .finish_non_exhaustive()
    }
}

impl ChatController {
    pub fn new(
        api: Arc<DesignApi>,
        store: Arc<SessionStore>,
        surface: Arc<dyn RenderSurface>,
        confirm: Arc<dyn Confirm>,
    ) -> Self {
        Self {
            resolver: SessionResolver::new(api.clone(), store.clone()),
            reconciler: StateReconciler::new(api.clone()),
            api,
            store,
            surface,
            confirm,
            actions: ActionRegistry::new(),
            sessions: Mutex::new(Vec::new()),
            image_styles: Mutex::new(HashMap::new()),
            local_ids: AtomicU64::new(0),
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
        }
    }

    pub fn with_resolver(mut self, resolver: SessionResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_notification_ttl(mut self, ttl: Duration) -> Self {
        self.notification_ttl = ttl;
        self
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn api(&self) -> &Arc<DesignApi> {
        &self.api
    }

    pub fn resolver(&self) -> &SessionResolver {
        &self.resolver
    }

    pub fn actions(&self) -> &ActionRegistry {
        &self.actions
    }

    /// Last session listing received from the server.
    pub fn sessions(&self) -> Vec<Session> {
        self.session_cache().clone()
    }

    /// Startup: resolve the working session, show the listing, then show the conversation.
    pub async fn initialize(&self) -> Result<Resolution, ChatError> {
        let resolution = self
            .resolver
            .resolve()
            .await
            .map_err(|error| self.fail(error))?;

        if let Err(error) = self.refresh_sessions().await {
            tracing::warn!(
                phase = "controller",
                event = "listing_refresh_failed",
                error = %error,
            );
        }

        match (resolution.origin, resolution.history.clone()) {
            (ResolutionOrigin::Created, _) => {
                self.actions.clear();
                self.surface.show_welcome();
            }
            (_, Some(history)) => {
                self.show_history(&resolution.session_id, history).await;
            }
            (_, None) => {
                self.load_session(resolution.session_id.clone()).await?;
            }
        }

        Ok(resolution)
    }

    /// Replaces the cached listing; failures are returned without a notification.
    pub async fn refresh_sessions(&self) -> Result<Vec<Session>, ChatError> {
        let sessions = self.api.list_sessions().await?;
        *self.session_cache() = sessions.clone();
        self.surface
            .show_sessions(&sessions, self.store.get().as_ref());
        Ok(sessions)
    }

    pub async fn create_session(&self) -> Result<SessionId, ChatError> {
        let session = self
            .api
            .create_session(self.resolver.default_name())
            .await
            .map_err(|error| self.fail(error))?;
        self.store
            .set(session.id.clone())
            .map_err(|error| self.fail(error.into()))?;

        self.actions.clear();
        self.surface.show_welcome();

        if let Err(error) = self.refresh_sessions().await {
            tracing::warn!(
                phase = "controller",
                event = "listing_refresh_failed",
                error = %error,
            );
            let sessions = {
                let mut cache = self.session_cache();
                cache.retain(|existing| existing.id != session.id);
                cache.insert(0, session.clone());
                cache.clone()
            };
            self.surface.show_sessions(&sessions, Some(&session.id));
        }

        tracing::info!(
            phase = "controller",
            event = "session_created",
            session_id = %session.id,
        );
        Ok(session.id)
    }

    /// Makes `id` active and renders its history merged with ratings and favorites.
    ///
    /// A failed fetch leaves the rendered conversation as it was.
    pub async fn load_session(&self, id: SessionId) -> Result<Vec<RenderedMessage>, ChatError> {
        self.store
            .set(id.clone())
            .map_err(|error| self.fail(error.into()))?;

        let messages = self
            .api
            .fetch_session(&id)
            .await
            .map_err(|error| self.fail(error))?;
        Ok(self.show_history(&id, messages).await)
    }

    async fn show_history(&self, id: &SessionId, messages: Vec<Message>) -> Vec<RenderedMessage> {
        let mut rendered = self.reconciler.load(messages).await;

        self.actions.clear();
        for message in &mut rendered {
            self.bind_actions(message);
        }

        self.surface.show_messages(&rendered);
        self.surface.show_sessions(&self.sessions(), Some(id));
        rendered
    }

    /// Returns `false` when the trimmed name equals the current one and nothing was sent.
    pub async fn rename_session(&self, id: &SessionId, name: &str) -> Result<bool, ChatError> {
        let name = validate_session_name(name).map_err(|error| self.fail(error))?;

        let unchanged = self
            .session_cache()
            .iter()
            .any(|session| &session.id == id && session.display_name == name);
        if unchanged {
            return Ok(false);
        }

        self.api
            .rename_session(id, name)
            .await
            .map_err(|error| self.fail(error))?;

        if let Some(session) = self
            .session_cache()
            .iter_mut()
            .find(|session| &session.id == id)
        {
            session.display_name = name.to_string();
        }
        self.surface.update_session_label(id, name);
        Ok(true)
    }

    pub async fn delete_session(&self, id: &SessionId) -> Result<DeleteOutcome, ChatError> {
        if !self.confirm.confirm(DELETE_PROMPT) {
            return Ok(DeleteOutcome::Cancelled);
        }

        let server_message = match self.api.delete_session(id).await {
            Ok(message) => message,
            Err(error) => return Err(self.fail_generic(error, DELETE_FAILED)),
        };

        let next = {
            let mut cache = self.session_cache();
            cache.retain(|session| &session.id != id);
            cache.first().map(|session| session.id.clone())
        };
        self.surface.remove_session(id);
        self.notify(Notification::success(
            server_message.unwrap_or_else(|| "Chat deleted".to_string()),
        ));

        if self.store.get().as_ref() != Some(id) {
            return Ok(DeleteOutcome::Deleted { next_active: None });
        }

        let next_active = match next {
            Some(next) => {
                self.load_session(next.clone()).await?;
                next
            }
            None => self.create_session().await?,
        };

        Ok(DeleteOutcome::Deleted {
            next_active: Some(next_active),
        })
    }

    /// Sends one prompt and appends the generated image to the conversation.
    ///
    /// At most one send is in flight: the generation guard is taken before the first
    /// network call and released on every exit path together with the loading indicator.
    pub async fn send_message(&self, text: &str, style: &str) -> Result<SentTurn, ChatError> {
        if self.store.is_generating() {
            return Err(self.fail(ChatError::validation(BUSY_MESSAGE)));
        }

        let prompt = validate_prompt(text).map_err(|issue| self.fail(issue.into()))?;
        let Some(_generation) = self.store.try_begin_generation() else {
            return Err(self.fail(ChatError::validation(BUSY_MESSAGE)));
        };

        let session_id = self
            .resolver
            .ensure_session()
            .await
            .map_err(|error| self.fail(error))?;

        let user = RenderedMessage::plain(Message::new(
            self.next_local_id(),
            Role::User,
            prompt,
        ));
        self.surface.append_message(&user);

        let _loading = LoadingScope::enter(self.surface.as_ref());
        let request = GenerationRequest {
            prompt: prompt.to_string(),
            style: style_or_default(style),
            session_id: session_id.clone(),
        };

        match self.api.generate_image(&request).await {
            Ok(GenerationReply::Generated(image)) => {
                let mut message = Message::new(self.next_local_id(), Role::Assistant, image.message)
                    .with_image(image.image_ref);
                if let Some(style_info) = image.style_info {
                    message = message.with_style_info(style_info);
                }

                let mut assistant = StateReconciler::render(message, &SideState::default());
                self.bind_actions(&mut assistant);
                self.surface.append_message(&assistant);

                tracing::info!(
                    phase = "controller",
                    event = "image_generated",
                    session_id = %session_id,
                );
                Ok(SentTurn {
                    session_id,
                    user,
                    assistant,
                })
            }
            Ok(GenerationReply::Rejected(content)) => {
                let assistant = RenderedMessage::plain(Message::new(
                    self.next_local_id(),
                    Role::Assistant,
                    content.clone(),
                ));
                self.surface.append_message(&assistant);
                Err(self.fail(ChatError::domain_rejection(content)))
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    pub async fn rate_image(
        &self,
        image_ref: &ImageRef,
        scores: RatingScores,
    ) -> Result<(), ChatError> {
        scores.validate().map_err(|error| self.fail(error))?;

        let submission = RatingSubmission {
            image_ref: image_ref.clone(),
            scores,
            style_tag: self.style_of(image_ref),
        };
        self.api
            .submit_rating(&submission)
            .await
            .map_err(|error| self.fail(error))?;

        self.surface
            .apply_rating(image_ref, &RatingState::Submitted(scores));
        self.notify(Notification::success("Thank you for your rating!"));
        Ok(())
    }

    pub async fn add_favorite(
        &self,
        image_ref: &ImageRef,
        prompt: &str,
        style_name: &str,
    ) -> Result<FavoriteId, ChatError> {
        let added = self
            .api
            .add_favorite(image_ref, prompt, style_name)
            .await
            .map_err(|error| self.fail(error))?;

        let favorite_id = match added {
            Some(favorite_id) => favorite_id,
            None => self
                .recover_favorite_id(image_ref)
                .await
                .map_err(|error| self.fail(error))?,
        };

        self.surface
            .apply_favorite(image_ref, &FavoriteState::Favorited(favorite_id.clone()));
        self.notify(Notification::success("Added to favorites"));
        Ok(favorite_id)
    }

    /// A favorite the server no longer knows is treated as removed.
    pub async fn remove_favorite(
        &self,
        image_ref: &ImageRef,
        favorite_id: &FavoriteId,
    ) -> Result<(), ChatError> {
        let removal = self
            .api
            .remove_favorite(favorite_id)
            .await
            .map_err(|error| self.fail_generic(error, REMOVE_FAVORITE_FAILED))?;

        if removal == FavoriteRemoval::AlreadyGone {
            tracing::debug!(
                phase = "controller",
                event = "favorite_already_removed",
                favorite_id = %favorite_id,
            );
        }

        self.surface
            .apply_favorite(image_ref, &FavoriteState::NotFavorited);
        self.notify(Notification::success("Removed from favorites"));
        Ok(())
    }

    pub async fn submit_style_feedback(
        &self,
        image_ref: &ImageRef,
        original_style: &str,
        corrected_style: &str,
    ) -> Result<(), ChatError> {
        let original_style = original_style.trim();
        let corrected_style = corrected_style.trim();
        if original_style.is_empty() || corrected_style.is_empty() {
            return Err(self.fail(ChatError::validation(
                "Please choose both the detected and the correct style",
            )));
        }

        let message = self
            .api
            .submit_style_feedback(image_ref, original_style, corrected_style)
            .await
            .map_err(|error| self.fail(error))?;

        self.image_styles_cache()
            .insert(image_ref.clone(), corrected_style.to_string());
        self.notify(Notification::success(
            message.unwrap_or_else(|| "Thanks for the style feedback!".to_string()),
        ));
        Ok(())
    }

    async fn recover_favorite_id(&self, image_ref: &ImageRef) -> Result<FavoriteId, ChatError> {
        self.api
            .list_favorites()
            .await?
            .into_iter()
            .find(|favorite| &favorite.image_ref == image_ref)
            .map(|favorite| favorite.favorite_id)
            .ok_or_else(|| ChatError::state("Favorite saved, but its id could not be found"))
    }

    fn bind_actions(&self, rendered: &mut RenderedMessage) {
        let Some(image_ref) = rendered.message.image_ref.clone() else {
            return;
        };

        let mut kinds = ActionKind::IMAGE.to_vec();
        if let Some(style_info) = &rendered.message.style_info {
            kinds.push(ActionKind::StyleFeedback);
            self.image_styles_cache()
                .insert(image_ref, style_info.detected_style.clone());
        }

        let element = rendered.message.id.clone();
        rendered.actions = kinds
            .into_iter()
            .map(|kind| (kind, self.actions.register(&element, kind).handle()))
            .collect();
    }

    fn style_of(&self, image_ref: &ImageRef) -> Option<String> {
        self.image_styles_cache().get(image_ref).cloned()
    }

    fn next_local_id(&self) -> MessageId {
        let next = self.local_ids.fetch_add(1, Ordering::Relaxed) + 1;
        MessageId::from(format!("local-{next}"))
    }

    fn notify(&self, notification: Notification) {
        self.surface
            .notify(notification.with_ttl(self.notification_ttl));
    }

    fn fail(&self, error: ChatError) -> ChatError {
        tracing::warn!(
            phase = "controller",
            event = "operation_failed",
            kind = ?error.kind,
            error = %error.message,
        );
        self.notify(Notification::error(error.message.clone()));
        error
    }

    /// Logs the detail and shows only `generic` to the user.
    fn fail_generic(&self, error: ChatError, generic: &str) -> ChatError {
        tracing::error!(
            phase = "controller",
            event = "operation_failed",
            kind = ?error.kind,
            error = %error.message,
        );
        self.notify(Notification::error(generic));
        ChatError::new(error.kind, generic)
    }

    fn session_cache(&self) -> MutexGuard<'_, Vec<Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn image_styles_cache(&self) -> MutexGuard<'_, HashMap<ImageRef, String>> {
        self.image_styles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// A blank style asks the server to detect one.
fn style_or_default(style: &str) -> String {
    match style.trim() {
        "" => DEFAULT_STYLE.to_string(),
        style => style.to_string(),
    }
}
