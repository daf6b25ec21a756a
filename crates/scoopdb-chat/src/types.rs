//! Conversation types and the `generateContent` wire shapes.

use serde::{Deserialize, Serialize};

/// Role tag on a conversation turn, as the API clients send it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of the conversation received from the frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

// ---------------------------------------------------------------------------
// generateContent request/response shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Content {
    /// `"user"` or `"model"` — the API has no `"assistant"` role.
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Part {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    pub content: Content,
}

impl Content {
    pub(crate) fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_owned(),
            parts: vec![Part { text: text.into() }],
        }
    }

    pub(crate) fn model(text: impl Into<String>) -> Self {
        Self {
            role: "model".to_owned(),
            parts: vec![Part { text: text.into() }],
        }
    }
}

impl From<&ChatMessage> for Content {
    fn from(message: &ChatMessage) -> Self {
        match message.role {
            ChatRole::User => Self::user(message.content.clone()),
            ChatRole::Assistant => Self::model(message.content.clone()),
        }
    }
}
