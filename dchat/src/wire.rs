//! JSON bodies exchanged with the design-chat server.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use dcommon::{FavoriteId, ImageRef, MessageId, SessionId};

use crate::{FavoriteRecord, Message, RatingRecord, RatingScores, Role, Session, StyleInfo};

/// Server ids arrive as numbers for some tables and strings for others.
pub(crate) fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionSummaryBody {
    pub session_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl SessionSummaryBody {
    pub fn into_session(self) -> Session {
        let display_name = self
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| "Untitled chat".to_string());
        Session::new(self.session_id, display_name)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateSessionBody<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RenameSessionBody<'a> {
    pub session_id: &'a str,
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionIdBody<'a> {
    pub session_id: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MessageBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum StyleReasonsBody {
    List(Vec<String>),
    Joined(String),
}

impl StyleReasonsBody {
    fn into_reasons(self) -> Vec<String> {
        match self {
            Self::List(reasons) => reasons,
            Self::Joined(text) => text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

fn style_info(style: Option<String>, reasons: Option<StyleReasonsBody>) -> Option<StyleInfo> {
    let detected_style = style.filter(|style| !style.trim().is_empty())?;
    Some(StyleInfo {
        detected_style,
        reasons: reasons.map(StyleReasonsBody::into_reasons).unwrap_or_default(),
    })
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryMessageBody {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_user: Option<bool>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub detected_style: Option<String>,
    #[serde(default)]
    pub style_reasons: Option<StyleReasonsBody>,
}

impl HistoryMessageBody {
    pub fn into_message(self, position: usize) -> Message {
        let role = match (self.is_user, self.role.as_deref()) {
            (Some(true), _) | (None, Some("user")) => Role::User,
            _ => Role::Assistant,
        };
        let id = id_string(&self.id).unwrap_or_else(|| format!("history-{position}"));
        let mut message = Message::new(MessageId::from(id), role, self.content);

        if let Some(image) = self.image_url.filter(|image| !image.trim().is_empty()) {
            message = message.with_image(ImageRef::from(image));
        }

        if let Some(info) = style_info(self.detected_style, self.style_reasons) {
            message = message.with_style_info(info);
        }

        message
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct HistoryBody {
    #[serde(default)]
    pub messages: Vec<HistoryMessageBody>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateBody<'a> {
    pub prompt: &'a str,
    pub style: &'a str,
    pub session_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StyleDataBody {
    #[serde(default, alias = "style")]
    pub detected_style: Option<String>,
    #[serde(default, alias = "style_reasons")]
    pub reasons: Option<StyleReasonsBody>,
}

impl StyleDataBody {
    pub fn into_style_info(self) -> Option<StyleInfo> {
        style_info(self.detected_style, self.reasons)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeneratedBody {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub style_data: Option<StyleDataBody>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ValidationBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Shape of every non-2xx body the server produces.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct FailureBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub assistant_message: Option<String>,
    #[serde(default)]
    pub validation: Option<ValidationBody>,
}

impl FailureBody {
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    /// Content the server intends to appear in the conversation as an assistant reply.
    pub fn assistant_visible(&self) -> Option<String> {
        let from_validation = self.validation.as_ref().and_then(|validation| {
            validation
                .message
                .clone()
                .or_else(|| self.error.clone())
        });

        self.assistant_message
            .clone()
            .or(from_validation)
            .filter(|text| !text.trim().is_empty())
    }

    pub fn detail(&self) -> Option<String> {
        self.message
            .clone()
            .or_else(|| self.error.clone())
            .filter(|text| !text.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FavoriteBody {
    pub id: Value,
    pub image_url: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub style_name: Option<String>,
}

impl FavoriteBody {
    pub fn into_record(self) -> Option<FavoriteRecord> {
        Some(FavoriteRecord {
            favorite_id: FavoriteId::from(id_string(&self.id)?),
            image_ref: ImageRef::from(self.image_url),
            prompt: self.prompt,
            style_name: self.style_name,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FavoritesBody {
    #[serde(default)]
    pub favorites: Vec<FavoriteBody>,
    /// Favorites across all pages.
    #[serde(default)]
    pub total: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AddFavoriteBody<'a> {
    pub image_url: &'a str,
    pub prompt: &'a str,
    pub style_name: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AddedFavoriteBody {
    #[serde(default)]
    pub favorite_id: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RatingBody {
    pub image_url: String,
    #[serde(default)]
    pub prompt_relevance: Option<u8>,
    #[serde(default)]
    pub image_quality: Option<u8>,
    #[serde(default)]
    pub style_accuracy: Option<u8>,
    #[serde(default)]
    pub style_tag: Option<String>,
}

impl RatingBody {
    pub fn into_record(self) -> RatingRecord {
        RatingRecord {
            image_ref: ImageRef::from(self.image_url),
            scores: RatingScores::new(
                self.prompt_relevance.unwrap_or_default(),
                self.image_quality.unwrap_or_default(),
                self.style_accuracy.unwrap_or_default(),
            ),
            style_tag: self.style_tag,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RatingsBody {
    #[serde(default)]
    pub ratings: Vec<RatingBody>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RateImageBody<'a> {
    pub image_url: &'a str,
    pub prompt_relevance: u8,
    pub image_quality: u8,
    pub style_accuracy: u8,
    pub style_tag: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct StyleFeedbackBody<'a> {
    pub image_url: &'a str,
    pub original_style: &'a str,
    pub corrected_style: &'a str,
}

pub(crate) fn session_id_of(body: &Value) -> Option<SessionId> {
    body.get("session_id").and_then(id_string).map(SessionId::from)
}
