//! Chat-layer errors and classification.

use std::error::Error;
use std::fmt::{Display, Formatter};

use dsession::StoreError;
use dtransport::{TransportError, TransportErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    /// Input failed local rules; nothing was sent.
    Validation,
    /// The server declined with content meant for the conversation itself.
    DomainRejection,
    /// Timeout or network failure that outlasted every retry.
    Transport,
    /// Non-2xx status without a domain-rejection shape.
    ServerFault,
    /// No resolvable session, or a success response missing required fields.
    State,
    Storage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatError {
    pub kind: ChatErrorKind,
    pub message: String,
}

impl ChatError {
    pub fn new(kind: ChatErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Validation, message)
    }

    pub fn domain_rejection(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::DomainRejection, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Transport, message)
    }

    pub fn server_fault(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::ServerFault, message)
    }

    pub fn state(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::State, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ChatErrorKind::Storage, message)
    }

    /// Validation and state errors never reach the network.
    pub fn is_local(&self) -> bool {
        matches!(self.kind, ChatErrorKind::Validation | ChatErrorKind::State)
    }
}

impl Display for ChatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ChatError {}

impl From<TransportError> for ChatError {
    fn from(value: TransportError) -> Self {
        match value.kind {
            TransportErrorKind::Timeout => {
                ChatError::transport("The server took too long to respond. Please try again.")
            }
            TransportErrorKind::Connection => ChatError::transport(
                "Could not reach the server. Please check your connection and try again.",
            ),
            TransportErrorKind::Decode => ChatError::state("invalid response"),
            TransportErrorKind::InvalidRequest | TransportErrorKind::Other => {
                ChatError::transport(value.message)
            }
        }
    }
}

impl From<StoreError> for ChatError {
    fn from(value: StoreError) -> Self {
        ChatError::storage(value.to_string())
    }
}
