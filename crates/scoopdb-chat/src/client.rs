//! HTTP client for the Gemini `generateContent` REST API.
//!
//! Wraps `reqwest` with typed error handling and API-key management. The
//! conversation is mapped into the API's `user`/`model` role scheme with the
//! standing instructions and product context prepended as a primed exchange.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::context::SYSTEM_PROMPT;
use crate::error::ChatError;
use crate::types::{ChatMessage, Content, GenerateContentRequest, GenerateContentResponse};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";

/// Client for the Gemini generative-language API.
///
/// Use [`GeminiClient::new`] for production or
/// [`GeminiClient::with_base_url`] to point at a mock server in tests.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: Url,
}

impl GeminiClient {
    /// Creates a new client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, ChatError> {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ChatError::InvalidBaseUrl`] if `base_url`
    /// does not parse.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        // Ensure exactly one trailing slash so join() appends rather than
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ChatError::InvalidBaseUrl {
            base_url: normalised.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            base_url,
        })
    }

    /// Sends the conversation plus the product-context snapshot and returns
    /// the assistant's text reply.
    ///
    /// `messages` is the ordered history including the latest user message.
    ///
    /// # Errors
    ///
    /// - [`ChatError::EmptyConversation`] if `messages` is empty.
    /// - [`ChatError::ApiError`] if the API returns a non-2xx status.
    /// - [`ChatError::Http`] on network failure.
    /// - [`ChatError::Deserialize`] if the response body does not match the
    ///   expected shape.
    /// - [`ChatError::EmptyReply`] if the response carries no text.
    pub async fn generate_reply(
        &self,
        messages: &[ChatMessage],
        product_context: &str,
    ) -> Result<String, ChatError> {
        if messages.is_empty() {
            return Err(ChatError::EmptyConversation);
        }

        let request = GenerateContentRequest {
            contents: Self::build_contents(messages, product_context),
        };

        let url = self.generate_url()?;
        let response = self.client.post(url).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ChatError::ApiError {
                status: status.as_u16(),
                message: truncate(&body, 200),
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| ChatError::Deserialize {
                context: format!("generateContent({})", self.model),
                source: e,
            })?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or(ChatError::EmptyReply)
    }

    /// Prepends the primed instruction exchange to the mapped conversation.
    fn build_contents(messages: &[ChatMessage], product_context: &str) -> Vec<Content> {
        let priming = format!(
            "{SYSTEM_PROMPT}\n\nHere is the current product catalog:\n\n{product_context}"
        );
        let mut contents = vec![
            Content::user(priming),
            Content::model(
                "Understood. I will answer using only the provided product catalog.",
            ),
        ];
        contents.extend(messages.iter().map(Content::from));
        contents
    }

    fn generate_url(&self) -> Result<Url, ChatError> {
        let mut url = self
            .base_url
            .join(&format!("models/{}:generateContent", self.model))
            .map_err(|e| ChatError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_owned()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatRole;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn messages() -> Vec<ChatMessage> {
        vec![
            ChatMessage {
                role: ChatRole::User,
                content: "Which whey has the best value?".to_owned(),
            },
            ChatMessage {
                role: ChatRole::Assistant,
                content: "The Impact Whey Isolate, mate.".to_owned(),
            },
            ChatMessage {
                role: ChatRole::User,
                content: "And the cheapest per kilo?".to_owned(),
            },
        ]
    }

    async fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::with_base_url("test-key", "gemini-2.0-flash", 5, &server.uri())
            .expect("client should build")
    }

    #[tokio::test]
    async fn sends_primed_conversation_and_returns_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{"text": "The WPI at $39/kg."}]
                    }
                }]
            })))
            .mount(&server)
            .await;

        let reply = client_for(&server)
            .await
            .generate_reply(&messages(), "Impact Whey Isolate (Myprotein)")
            .await
            .expect("reply should succeed");
        assert_eq!(reply, "The WPI at $39/kg.");

        let received: Vec<Request> = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        let contents = body["contents"].as_array().unwrap();
        // Primed user turn + primed model ack + 3 conversation turns.
        assert_eq!(contents.len(), 5);
        assert_eq!(contents[0]["role"], "user");
        assert!(contents[0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Impact Whey Isolate"));
        assert_eq!(contents[1]["role"], "model");
        // The frontend's "assistant" role maps to the API's "model".
        assert_eq!(contents[3]["role"], "model");
        assert_eq!(contents[4]["role"], "user");
    }

    #[tokio::test]
    async fn maps_api_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .generate_reply(&messages(), "")
            .await
            .unwrap_err();
        match err {
            ChatError::ApiError { status, message } => {
                assert_eq!(status, 429);
                assert!(message.contains("quota exceeded"));
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_candidates_map_to_empty_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .generate_reply(&messages(), "")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::EmptyReply));
    }

    #[tokio::test]
    async fn malformed_body_maps_to_deserialize_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .generate_reply(&messages(), "")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Deserialize { .. }));
    }

    #[tokio::test]
    async fn empty_conversation_is_rejected_before_any_request() {
        let server = MockServer::start().await;
        let err = client_for(&server)
            .await
            .generate_reply(&[], "")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::EmptyConversation));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[test]
    fn request_body_serializes_expected_shape() {
        let request = GenerateContentRequest {
            contents: vec![Content::user("hello")],
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
    }
}
