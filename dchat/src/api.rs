//! Typed client for the design-chat HTTP endpoints.

use serde::Serialize;
use serde::de::DeserializeOwned;

use dcommon::{FavoriteId, ImageRef, SessionId};
use dtransport::{
    HttpRequest, HttpResponse, ResilientTransport, SecurityContext, StatusCode,
    encode_path_segment,
};

use crate::wire::{
    AddFavoriteBody, AddedFavoriteBody, CreateSessionBody, FailureBody, FavoriteBody, FavoritesBody,
    GenerateBody, GeneratedBody, HistoryBody, MessageBody, RateImageBody, RatingsBody,
    RenameSessionBody, SessionIdBody, SessionSummaryBody, StyleFeedbackBody, id_string,
    session_id_of,
};
use crate::{
    ChatError, FavoriteRecord, Message, RatingRecord, RatingScores, Session, StyleInfo,
    normalize_image_payload,
};

/// Largest page the favorites endpoint serves.
pub const FAVORITES_PAGE_SIZE: usize = 50;

const MAX_FAVORITE_PAGES: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub style: String,
    pub session_id: SessionId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub image_ref: ImageRef,
    pub message: String,
    pub style_info: Option<StyleInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationReply {
    Generated(GeneratedImage),
    /// The server declined the prompt with text meant for the conversation.
    Rejected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteRemoval {
    Removed,
    AlreadyGone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingSubmission {
    pub image_ref: ImageRef,
    pub scores: RatingScores,
    pub style_tag: Option<String>,
}

/// Endpoint-level operations over a [`ResilientTransport`]; every request is CSRF-stamped.
#[derive(Debug)]
pub struct DesignApi {
    transport: ResilientTransport,
    security: SecurityContext,
}

impl DesignApi {
    pub fn new(transport: ResilientTransport, security: SecurityContext) -> Self {
        Self {
            transport,
            security,
        }
    }

    pub fn transport(&self) -> &ResilientTransport {
        &self.transport
    }

    /// Any 2xx answer means the session exists and is readable.
    pub async fn fetch_session(&self, id: &SessionId) -> Result<Vec<Message>, ChatError> {
        let path = format!("/chat/session/{}", encode_path_segment(id.as_str()));
        let request = HttpRequest::get(path).with_route("/chat/session/{id}");
        let response = self.send(request).await?;
        let body: HistoryBody = decode(&response, "Failed to load chat history")?;

        Ok(body
            .messages
            .into_iter()
            .enumerate()
            .map(|(position, message)| message.into_message(position))
            .collect())
    }

    /// Sessions ordered most recent first.
    pub async fn list_sessions(&self) -> Result<Vec<Session>, ChatError> {
        let response = self.send(HttpRequest::get("/chat/sessions")).await?;
        let sessions: Vec<SessionSummaryBody> = decode(&response, "Failed to load chats")?;
        Ok(sessions
            .into_iter()
            .map(SessionSummaryBody::into_session)
            .collect())
    }

    pub async fn create_session(&self, name: &str) -> Result<Session, ChatError> {
        let request = json_request(HttpRequest::post("/chat/new"), &CreateSessionBody { name })?;
        let response = self.send(request).await?;
        let body: serde_json::Value = decode(&response, "Failed to create a new chat")?;
        let id = session_id_of(&body).ok_or_else(|| ChatError::state("invalid response"))?;
        let display_name = body
            .get("name")
            .and_then(serde_json::Value::as_str)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(name);

        Ok(Session::new(id, display_name))
    }

    pub async fn rename_session(&self, id: &SessionId, name: &str) -> Result<(), ChatError> {
        let request = json_request(
            HttpRequest::post("/chat/rename"),
            &RenameSessionBody {
                session_id: id.as_str(),
                name,
            },
        )?;
        let response = self.send(request).await?;
        ensure_success(&response, "Failed to rename chat")
    }

    pub async fn delete_session(&self, id: &SessionId) -> Result<Option<String>, ChatError> {
        let request = json_request(
            HttpRequest::post("/chat/delete"),
            &SessionIdBody {
                session_id: id.as_str(),
            },
        )?;
        let response = self.send(request).await?;
        ensure_success(&response, "Failed to delete chat")?;
        Ok(response.json::<MessageBody>().unwrap_or_default().message)
    }

    pub async fn generate_image(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationReply, ChatError> {
        let http_request = json_request(
            HttpRequest::post("/api/generate-image"),
            &GenerateBody {
                prompt: &request.prompt,
                style: &request.style,
                session_id: request.session_id.as_str(),
            },
        )?;
        let response = self.send(http_request).await?;

        if !response.is_success() {
            let failure = FailureBody::parse(&response.body);
            if let Some(content) = failure.assistant_visible() {
                return Ok(GenerationReply::Rejected(content));
            }

            return Err(ChatError::server_fault(
                failure
                    .detail()
                    .unwrap_or_else(|| "Failed to generate image".to_string()),
            ));
        }

        let body: GeneratedBody = response.json().map_err(ChatError::from)?;
        let (Some(image), Some(message)) = (body.image, body.message) else {
            return Err(ChatError::state("invalid response"));
        };

        Ok(GenerationReply::Generated(GeneratedImage {
            image_ref: normalize_image_payload(&image)?,
            message,
            style_info: body.style_data.and_then(|data| data.into_style_info()),
        }))
    }

    /// Walks every page until the reported total is reached or a short page arrives.
    pub async fn list_favorites(&self) -> Result<Vec<FavoriteRecord>, ChatError> {
        let mut records = Vec::new();
        let mut received = 0;

        for page in 1..=MAX_FAVORITE_PAGES {
            let request = HttpRequest::get("/api/favorites")
                .with_query("page", page)
                .with_query("page_size", FAVORITES_PAGE_SIZE);
            let response = self.send(request).await?;
            let body: FavoritesBody = decode(&response, "Failed to load favorites")?;

            let rows = body.favorites.len();
            received += rows;
            records.extend(body.favorites.into_iter().filter_map(FavoriteBody::into_record));

            let reached_total = body.total.is_some_and(|total| received >= total);
            if rows < FAVORITES_PAGE_SIZE || reached_total {
                return Ok(records);
            }
        }

        tracing::warn!(
            phase = "design_api",
            event = "favorites_truncated",
            pages = MAX_FAVORITE_PAGES,
            received,
        );
        Ok(records)
    }

    /// Returns the new favorite id, or `None` when the server acknowledged without one
    /// (the image was already a favorite).
    pub async fn add_favorite(
        &self,
        image_ref: &ImageRef,
        prompt: &str,
        style_name: &str,
    ) -> Result<Option<FavoriteId>, ChatError> {
        let request = json_request(
            HttpRequest::post("/api/favorite"),
            &AddFavoriteBody {
                image_url: image_ref.as_str(),
                prompt,
                style_name,
            },
        )?;
        let response = self.send(request).await?;
        let body: AddedFavoriteBody = decode(&response, "Failed to add favorite")?;
        Ok(id_string(&body.favorite_id).map(FavoriteId::from))
    }

    pub async fn remove_favorite(
        &self,
        favorite_id: &FavoriteId,
    ) -> Result<FavoriteRemoval, ChatError> {
        let path = format!("/api/favorites/{}", encode_path_segment(favorite_id.as_str()));
        let request = HttpRequest::delete(path).with_route("/api/favorites/{id}");
        let response = self.send(request).await?;

        if response.status == StatusCode::NOT_FOUND {
            return Ok(FavoriteRemoval::AlreadyGone);
        }

        ensure_success(&response, "Failed to remove favorite")?;
        Ok(FavoriteRemoval::Removed)
    }

    pub async fn list_ratings(&self) -> Result<Vec<RatingRecord>, ChatError> {
        let response = self.send(HttpRequest::get("/api/ratings")).await?;
        let body: RatingsBody = decode(&response, "Failed to load ratings")?;
        Ok(body
            .ratings
            .into_iter()
            .map(|rating| rating.into_record())
            .collect())
    }

    pub async fn submit_rating(&self, submission: &RatingSubmission) -> Result<(), ChatError> {
        let request = json_request(
            HttpRequest::post("/api/rate-image"),
            &RateImageBody {
                image_url: submission.image_ref.as_str(),
                prompt_relevance: submission.scores.relevance,
                image_quality: submission.scores.quality,
                style_accuracy: submission.scores.style,
                style_tag: submission.style_tag.as_deref(),
            },
        )?;
        let response = self.send(request).await?;
        ensure_success(&response, "Failed to submit rating")
    }

    pub async fn submit_style_feedback(
        &self,
        image_ref: &ImageRef,
        original_style: &str,
        corrected_style: &str,
    ) -> Result<Option<String>, ChatError> {
        let request = json_request(
            HttpRequest::post("/api/style-feedback"),
            &StyleFeedbackBody {
                image_url: image_ref.as_str(),
                original_style,
                corrected_style,
            },
        )?;
        let response = self.send(request).await?;
        ensure_success(&response, "Failed to submit style feedback")?;
        Ok(response.json::<MessageBody>().unwrap_or_default().message)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ChatError> {
        let route = request.route();
        self.transport
            .send(self.security.apply(request))
            .await
            .map_err(|error| {
                tracing::warn!(
                    phase = "design_api",
                    event = "request_failed",
                    route = %route,
                    kind = ?error.kind,
                    error = %error.message,
                );
                ChatError::from(error)
            })
    }
}

fn json_request<T: Serialize>(request: HttpRequest, body: &T) -> Result<HttpRequest, ChatError> {
    request
        .with_json(body)
        .map_err(|error| ChatError::validation(error.message))
}

fn server_fault(response: &HttpResponse, fallback: &str) -> ChatError {
    let detail = FailureBody::parse(&response.body).detail();
    ChatError::server_fault(detail.unwrap_or_else(|| fallback.to_string()))
}

fn ensure_success(response: &HttpResponse, fallback: &str) -> Result<(), ChatError> {
    if response.is_success() {
        Ok(())
    } else {
        Err(server_fault(response, fallback))
    }
}

fn decode<T: DeserializeOwned>(response: &HttpResponse, fallback: &str) -> Result<T, ChatError> {
    ensure_success(response, fallback)?;
    response.json().map_err(ChatError::from)
}
