//! Conversation, session, and side-state types plus the client-side input rules.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use dcommon::{FavoriteId, ImageRef, MessageId, SessionId};

use crate::ChatError;
use crate::actions::{ActionHandle, ActionKind};

pub const PROMPT_MIN_CHARS: usize = 3;
pub const PROMPT_MAX_CHARS: usize = 500;
pub const SESSION_NAME_MAX_CHARS: usize = 120;
pub const RATING_MIN: u8 = 1;
pub const RATING_MAX: u8 = 5;
pub const DEFAULT_STYLE: &str = "auto";

const RAW_IMAGE_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub display_name: String,
}

impl Session {
    pub fn new(id: impl Into<SessionId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleInfo {
    pub detected_style: String,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub text: String,
    pub image_ref: Option<ImageRef>,
    pub style_info: Option<StyleInfo>,
}

impl Message {
    pub fn new(id: impl Into<MessageId>, role: Role, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            text: text.into(),
            image_ref: None,
            style_info: None,
        }
    }

    pub fn with_image(mut self, image_ref: ImageRef) -> Self {
        self.image_ref = Some(image_ref);
        self
    }

    pub fn with_style_info(mut self, style_info: StyleInfo) -> Self {
        self.style_info = Some(style_info);
        self
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// Prompt relevance, image quality and style accuracy on a 1..=5 scale. Zero means unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RatingScores {
    pub relevance: u8,
    pub quality: u8,
    pub style: u8,
}

impl RatingScores {
    pub fn new(relevance: u8, quality: u8, style: u8) -> Self {
        Self {
            relevance,
            quality,
            style,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.relevance > 0 && self.quality > 0 && self.style > 0
    }

    pub fn validate(&self) -> Result<(), ChatError> {
        for (label, score) in [
            ("prompt relevance", self.relevance),
            ("image quality", self.quality),
            ("style accuracy", self.style),
        ] {
            if !(RATING_MIN..=RATING_MAX).contains(&score) {
                return Err(ChatError::validation(format!(
                    "Please rate {label} from {RATING_MIN} to {RATING_MAX} stars"
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingRecord {
    pub image_ref: ImageRef,
    pub scores: RatingScores,
    pub style_tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteRecord {
    pub favorite_id: FavoriteId,
    pub image_ref: ImageRef,
    pub prompt: String,
    pub style_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RatingState {
    /// Submit stays enabled; partial scores from an earlier attempt pre-fill the widgets.
    NotSubmitted { prefill: Option<RatingScores> },
    Submitted(RatingScores),
}

impl RatingState {
    pub fn from_record(record: Option<&RatingRecord>) -> Self {
        match record {
            Some(record) if record.scores.is_complete() => Self::Submitted(record.scores),
            Some(record) => Self::NotSubmitted {
                prefill: Some(record.scores),
            },
            None => Self::NotSubmitted { prefill: None },
        }
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted(_))
    }

    pub fn submit_enabled(&self) -> bool {
        !self.is_submitted()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoriteState {
    NotFavorited,
    Favorited(FavoriteId),
}

impl FavoriteState {
    pub fn is_favorited(&self) -> bool {
        matches!(self, Self::Favorited(_))
    }
}

/// A message ready for display: image messages carry rating and favorite flags plus the
/// action handles bound to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub message: Message,
    pub rating: Option<RatingState>,
    pub favorite: Option<FavoriteState>,
    pub actions: Vec<(ActionKind, ActionHandle)>,
}

impl RenderedMessage {
    pub fn plain(message: Message) -> Self {
        Self {
            message,
            rating: None,
            favorite: None,
            actions: Vec::new(),
        }
    }

    pub fn image_ref(&self) -> Option<&ImageRef> {
        self.message.image_ref.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptIssue {
    Empty,
    TooShort,
    TooLong,
}

impl PromptIssue {
    pub fn message(&self) -> String {
        match self {
            Self::Empty => "Prompt cannot be empty".to_string(),
            Self::TooShort => {
                format!("Prompt is too short (minimum {PROMPT_MIN_CHARS} characters)")
            }
            Self::TooLong => {
                format!("Prompt is too long (maximum {PROMPT_MAX_CHARS} characters)")
            }
        }
    }
}

impl From<PromptIssue> for ChatError {
    fn from(value: PromptIssue) -> Self {
        ChatError::validation(value.message())
    }
}

/// Returns the trimmed prompt when its length (in characters) is within bounds.
pub fn validate_prompt(text: &str) -> Result<&str, PromptIssue> {
    let trimmed = text.trim();
    let length = trimmed.chars().count();

    if length == 0 {
        Err(PromptIssue::Empty)
    } else if length < PROMPT_MIN_CHARS {
        Err(PromptIssue::TooShort)
    } else if length > PROMPT_MAX_CHARS {
        Err(PromptIssue::TooLong)
    } else {
        Ok(trimmed)
    }
}

pub fn validate_session_name(name: &str) -> Result<&str, ChatError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ChatError::validation("Chat name cannot be empty"));
    }

    if trimmed.chars().count() > SESSION_NAME_MAX_CHARS {
        return Err(ChatError::validation(format!(
            "Chat name must be {SESSION_NAME_MAX_CHARS} characters or fewer"
        )));
    }

    Ok(trimmed)
}

/// Data URIs and URLs pass through; a bare payload must be valid base64 and is wrapped as PNG.
pub fn normalize_image_payload(raw: &str) -> Result<ImageRef, ChatError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ChatError::state("invalid response"));
    }

    if raw.starts_with("data:")
        || raw.starts_with("http://")
        || raw.starts_with("https://")
        || raw.starts_with('/')
    {
        return Ok(ImageRef::from(raw));
    }

    STANDARD
        .decode(raw)
        .map_err(|_| ChatError::state("invalid response"))?;

    Ok(ImageRef::from(format!("{RAW_IMAGE_PREFIX}{raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChatErrorKind;

    #[test]
    fn prompt_bounds_follow_trimmed_character_count() {
        assert_eq!(validate_prompt(""), Err(PromptIssue::Empty));
        assert_eq!(validate_prompt("   "), Err(PromptIssue::Empty));
        assert_eq!(validate_prompt(" ab "), Err(PromptIssue::TooShort));
        assert_eq!(validate_prompt("  abc  "), Ok("abc"));
        assert_eq!(validate_prompt(&"é".repeat(500)).map(str::len), Ok(1000));
        assert_eq!(validate_prompt(&"a".repeat(501)), Err(PromptIssue::TooLong));

        for length in 0..=PROMPT_MAX_CHARS + 2 {
            let text = "x".repeat(length);
            assert_eq!(
                validate_prompt(&text).is_ok(),
                (PROMPT_MIN_CHARS..=PROMPT_MAX_CHARS).contains(&length),
                "length {length}"
            );
        }
    }

    #[test]
    fn prompt_issue_messages_name_the_problem() {
        assert!(PromptIssue::Empty.message().contains("cannot be empty"));
        assert!(PromptIssue::TooShort.message().contains("too short"));
        assert!(PromptIssue::TooLong.message().contains("too long"));
        assert_eq!(ChatError::from(PromptIssue::Empty).kind, ChatErrorKind::Validation);
    }

    #[test]
    fn session_names_are_trimmed_and_bounded() {
        assert_eq!(validate_session_name("  Logo ideas "), Ok("Logo ideas"));
        assert!(validate_session_name("   ").is_err());
        assert!(validate_session_name(&"n".repeat(SESSION_NAME_MAX_CHARS)).is_ok());
        assert!(validate_session_name(&"n".repeat(SESSION_NAME_MAX_CHARS + 1)).is_err());
    }

    #[test]
    fn rating_state_requires_all_three_scores() {
        let record = |scores| RatingRecord {
            image_ref: ImageRef::from("/img/1.png"),
            scores,
            style_tag: None,
        };

        assert_eq!(
            RatingState::from_record(None),
            RatingState::NotSubmitted { prefill: None }
        );

        let partial = RatingState::from_record(Some(&record(RatingScores::new(4, 0, 3))));
        assert!(partial.submit_enabled());

        let full = RatingState::from_record(Some(&record(RatingScores::new(4, 5, 3))));
        assert!(full.is_submitted());
        assert!(!full.submit_enabled());
    }

    #[test]
    fn rating_scores_validate_range() {
        assert!(RatingScores::new(1, 5, 3).validate().is_ok());
        assert!(RatingScores::new(0, 5, 3).validate().is_err());
        let error = RatingScores::new(5, 5, 6).validate().expect_err("out of range");
        assert!(error.message.contains("style accuracy"));
    }

    #[test]
    fn image_payloads_are_normalized() {
        assert_eq!(
            normalize_image_payload("data:image/jpeg;base64,AAAA").expect("data uri"),
            ImageRef::from("data:image/jpeg;base64,AAAA")
        );
        assert_eq!(
            normalize_image_payload("https://cdn.example.test/a.png").expect("url"),
            ImageRef::from("https://cdn.example.test/a.png")
        );
        assert_eq!(
            normalize_image_payload("/static/generated/a.png").expect("path"),
            ImageRef::from("/static/generated/a.png")
        );
        assert_eq!(
            normalize_image_payload("iVBORw0KGgo=").expect("raw base64"),
            ImageRef::from("data:image/png;base64,iVBORw0KGgo=")
        );

        let error = normalize_image_payload("not base64 at all!").expect_err("garbage");
        assert_eq!(error.kind, ChatErrorKind::State);
        assert!(normalize_image_payload("").is_err());
    }
}
