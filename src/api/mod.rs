//! OpenAI-compatible chat completions wire types and request path.
//!
//! OpenAI and OpenRouter share the same request/response shape, so a single
//! code path parameterized by base URL and bearer key covers both.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::session::ProviderConfig;

pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 150;
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Deserialize)]
pub struct ChatResponseMessage {
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub struct ChatResponseChoice {
    pub message: ChatResponseMessage,
}

#[derive(Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatResponseChoice>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatError {
    /// Connection failure or client-side timeout.
    Network(String),
    /// The provider rejected the API key (401/403).
    AuthFailed,
    /// Any other non-2xx status from the provider.
    ProviderError(u16),
    /// A 2xx response without the expected completion fields.
    MalformedResponse,
    /// Empty input, missing configuration, or a turn already in flight.
    InvalidInput(String),
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::Network(detail) => write!(f, "network error: {detail}"),
            ChatError::AuthFailed => write!(f, "authentication failed: check your API key"),
            ChatError::ProviderError(status) => {
                write!(f, "the provider returned an error (HTTP {status})")
            }
            ChatError::MalformedResponse => {
                write!(f, "the provider sent a response we couldn't read")
            }
            ChatError::InvalidInput(detail) => write!(f, "{detail}"),
        }
    }
}

impl std::error::Error for ChatError {}

impl ChatError {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => ChatError::AuthFailed,
            other => ChatError::ProviderError(other),
        }
    }

    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChatError::Network("request timed out".to_string())
        } else {
            ChatError::Network(err.to_string())
        }
    }
}

/// Pull the first completion's text out of a decoded response body.
pub fn extract_reply(response: ChatResponse) -> Result<String, ChatError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(ChatError::MalformedResponse)
}

/// Send the full transcript to the provider and return the assistant's reply.
pub async fn send_chat_completion(
    http: &reqwest::Client,
    config: &ProviderConfig,
    messages: Vec<ChatMessage>,
) -> Result<String, ChatError> {
    let request = ChatRequest {
        model: config.model.clone(),
        messages,
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
    };

    let response = http
        .post(config.chat_completions_url())
        .header("Authorization", format!("Bearer {}", config.api_key))
        .json(&request)
        .send()
        .await
        .map_err(ChatError::from_transport)?;

    let status = response.status();
    if !status.is_success() {
        return Err(ChatError::from_status(status.as_u16()));
    }

    let body: ChatResponse = response
        .json()
        .await
        .map_err(|_| ChatError::MalformedResponse)?;
    extract_reply(body)
}

/// Check a key against the provider's models listing, as a cheap probe that
/// the key is accepted before any chat turn is attempted.
pub async fn verify_key(http: &reqwest::Client, config: &ProviderConfig) -> Result<(), ChatError> {
    let response = http
        .get(config.models_url())
        .header("Authorization", format!("Bearer {}", config.api_key))
        .send()
        .await
        .map_err(ChatError::from_transport)?;

    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ChatError::from_status(status.as_u16()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(body: &str) -> ChatResponse {
        serde_json::from_str(body).expect("response body should decode")
    }

    #[test]
    fn status_mapping_distinguishes_auth_from_provider_failures() {
        assert_eq!(ChatError::from_status(401), ChatError::AuthFailed);
        assert_eq!(ChatError::from_status(403), ChatError::AuthFailed);
        assert_eq!(ChatError::from_status(429), ChatError::ProviderError(429));
        assert_eq!(ChatError::from_status(500), ChatError::ProviderError(500));
    }

    #[test]
    fn extract_reply_returns_trimmed_first_choice() {
        let body = decode(
            r#"{"choices":[{"message":{"content":"  You're not alone in this.  "}}]}"#,
        );
        assert_eq!(
            extract_reply(body).unwrap(),
            "You're not alone in this."
        );
    }

    #[test]
    fn extract_reply_rejects_missing_choices() {
        let body = decode(r#"{"choices":[]}"#);
        assert_eq!(extract_reply(body), Err(ChatError::MalformedResponse));
    }

    #[test]
    fn extract_reply_rejects_missing_content() {
        let body = decode(r#"{"choices":[{"message":{}}]}"#);
        assert_eq!(extract_reply(body), Err(ChatError::MalformedResponse));
    }

    #[test]
    fn request_serializes_with_sampling_parameters() {
        let request = ChatRequest {
            model: "gpt-3.5-turbo".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "Hello".to_string(),
            }],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["max_tokens"], 150);
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
