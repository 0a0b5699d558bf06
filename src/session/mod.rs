//! Conversation state: the transcript, the provider configuration, and the
//! request payloads built from them.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::api::{ChatError, ChatMessage};

/// The persona carried on every request, taken verbatim from the product copy.
pub const SYSTEM_PROMPT: &str = "You are Solace, a warm and empathetic mental health companion. Your role is to:
- Listen deeply and reflect back what you hear with genuine compassion
- Validate emotions without judgment
- Ask thoughtful, open-ended questions to help the user explore their feelings
- Offer gentle, evidence-based coping strategies when appropriate (breathing exercises, grounding techniques, journaling prompts)
- Recognize when someone may need professional help and gently encourage it
- Never diagnose or prescribe
- Keep responses concise (2-4 sentences usually), warm, and conversational
- Use simple, accessible language
- If someone expresses suicidal ideation or self-harm, ALWAYS provide crisis resources: 988 Suicide & Crisis Lifeline (call/text 988 in the US)

Always respond with warmth, patience, and genuine care.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: u64,
}

impl Message {
    fn new(role: Role, content: String) -> Self {
        Self {
            role,
            content,
            timestamp: unix_timestamp(),
        }
    }
}

fn unix_timestamp() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration.as_secs(),
        Err(_) => 0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    OpenRouter,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::OpenAi, Provider::OpenRouter];

    pub fn display_name(self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::OpenRouter => "OpenRouter",
        }
    }

    pub fn base_url(self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::OpenRouter => "https://openrouter.ai/api/v1",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-3.5-turbo",
            Provider::OpenRouter => "anthropic/claude-3-haiku",
        }
    }

    pub fn key_env_var(self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::OpenRouter => "OPENROUTER_API_KEY",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub provider: Provider,
    pub base_url: String,
    pub model: String,
    pub api_key: String,
}

impl ProviderConfig {
    pub fn for_provider(provider: Provider, api_key: String) -> Self {
        Self {
            provider,
            base_url: provider.base_url().to_string(),
            model: provider.default_model().to_string(),
            api_key,
        }
    }

    pub fn validate(&self) -> Result<(), ChatError> {
        if self.api_key.trim().is_empty() {
            return Err(ChatError::InvalidInput(format!(
                "enter your {} API key and connect first",
                self.provider.display_name()
            )));
        }
        if self.model.trim().is_empty() {
            return Err(ChatError::InvalidInput("choose a model first".to_string()));
        }
        Ok(())
    }

    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    pub fn models_url(&self) -> String {
        format!("{}/models", self.base_url.trim_end_matches('/'))
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::for_provider(Provider::OpenRouter, String::new())
    }
}

/// Owns the transcript and the active provider configuration. The transcript
/// is append-only: sends append a user entry up front, and the resolved turn
/// appends either the assistant reply or a system-role error entry.
pub struct ChatSession {
    transcript: Vec<Message>,
    config: ProviderConfig,
    pending: bool,
}

impl ChatSession {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            transcript: Vec::new(),
            config,
            pending: false,
        }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ProviderConfig) {
        self.config = config;
    }

    /// Validate and record a user turn, returning the outbound payload.
    /// The transcript is untouched on any rejection.
    pub fn begin_send(&mut self, text: &str) -> Result<Vec<ChatMessage>, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::InvalidInput("message is empty".to_string()));
        }
        if self.pending {
            return Err(ChatError::InvalidInput(
                "a reply is still pending".to_string(),
            ));
        }
        self.config.validate()?;

        self.transcript
            .push(Message::new(Role::User, text.to_string()));
        self.pending = true;
        Ok(self.request_messages())
    }

    /// Payload for the opening greeting: the persona plus a bare "Hello"
    /// that is never recorded, so the greeting lands as an assistant
    /// message only.
    pub fn begin_greeting(&mut self) -> Result<Vec<ChatMessage>, ChatError> {
        if self.pending {
            return Err(ChatError::InvalidInput(
                "a reply is still pending".to_string(),
            ));
        }
        self.config.validate()?;

        self.pending = true;
        Ok(vec![
            ChatMessage {
                role: Role::System.as_str().to_string(),
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: Role::User.as_str().to_string(),
                content: "Hello".to_string(),
            },
        ])
    }

    pub fn complete_reply(&mut self, text: String) {
        self.pending = false;
        self.transcript.push(Message::new(Role::Assistant, text));
    }

    /// Record a failed turn as an inline system entry. The user message from
    /// the failed turn stays; no assistant message is added.
    pub fn fail(&mut self, err: &ChatError) {
        self.pending = false;
        self.transcript
            .push(Message::new(Role::System, err.to_string()));
    }

    /// Persona first, then the transcript oldest-first. System-role entries
    /// are inline error notices from earlier turns, not conversation, and
    /// are never forwarded.
    fn request_messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.transcript.len() + 1);
        messages.push(ChatMessage {
            role: Role::System.as_str().to_string(),
            content: SYSTEM_PROMPT.to_string(),
        });
        for message in &self.transcript {
            if message.role == Role::System {
                continue;
            }
            messages.push(ChatMessage {
                role: message.role.as_str().to_string(),
                content: message.content.clone(),
            });
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected_session() -> ChatSession {
        ChatSession::new(ProviderConfig::for_provider(
            Provider::OpenRouter,
            "test-key".to_string(),
        ))
    }

    #[test]
    fn successful_turns_alternate_user_and_assistant() {
        let mut session = connected_session();
        for i in 0..3 {
            session.begin_send(&format!("message {i}")).unwrap();
            session.complete_reply(format!("reply {i}"));
        }

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 6);
        for (i, message) in transcript.iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(message.role, expected);
        }
        assert_eq!(transcript[0].content, "message 0");
        assert_eq!(transcript[5].content, "reply 2");
    }

    #[test]
    fn whitespace_only_input_is_rejected_without_mutation() {
        let mut session = connected_session();
        let err = session.begin_send("   \n\t ").unwrap_err();
        assert!(matches!(err, ChatError::InvalidInput(_)));
        assert!(session.transcript().is_empty());
        assert!(!session.is_pending());
    }

    #[test]
    fn missing_api_key_is_rejected_without_mutation() {
        let mut session =
            ChatSession::new(ProviderConfig::for_provider(Provider::OpenAi, String::new()));
        let err = session.begin_send("hello").unwrap_err();
        assert!(matches!(err, ChatError::InvalidInput(_)));
        assert!(session.transcript().is_empty());
    }

    #[test]
    fn auth_failure_keeps_user_message_without_assistant_reply() {
        let mut session = connected_session();
        session.begin_send("I'm feeling overwhelmed").unwrap();
        session.fail(&ChatError::AuthFailed);

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, Role::User);
        assert_eq!(transcript[1].role, Role::System);
        assert!(transcript.iter().all(|m| m.role != Role::Assistant));
        assert!(!session.is_pending());
    }

    #[test]
    fn second_send_while_pending_is_refused() {
        let mut session = connected_session();
        session.begin_send("first").unwrap();
        let err = session.begin_send("second").unwrap_err();
        assert!(matches!(err, ChatError::InvalidInput(_)));
        assert_eq!(session.transcript().len(), 1);
    }

    #[test]
    fn payload_starts_with_persona_and_skips_error_entries() {
        let mut session = connected_session();
        session.begin_send("one").unwrap();
        session.fail(&ChatError::ProviderError(500));
        let payload = session.begin_send("two").unwrap();

        assert_eq!(payload[0].role, "system");
        assert_eq!(payload[0].content, SYSTEM_PROMPT);
        let rest: Vec<_> = payload[1..]
            .iter()
            .map(|m| (m.role.as_str(), m.content.as_str()))
            .collect();
        assert_eq!(rest, vec![("user", "one"), ("user", "two")]);
    }

    #[test]
    fn greeting_payload_records_nothing() {
        let mut session = connected_session();
        let payload = session.begin_greeting().unwrap();
        assert_eq!(payload.len(), 2);
        assert_eq!(payload[1].content, "Hello");
        assert!(session.transcript().is_empty());
        assert!(session.is_pending());

        session.complete_reply("Hi, I'm here with you.".to_string());
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript()[0].role, Role::Assistant);
    }

    #[test]
    fn config_switch_leaves_recorded_entries_untouched() {
        let mut session = connected_session();
        session.begin_send("hello").unwrap();
        session.complete_reply("hi".to_string());

        let before: Vec<String> = session
            .transcript()
            .iter()
            .map(|m| m.content.clone())
            .collect();

        session.set_config(ProviderConfig::for_provider(
            Provider::OpenAi,
            "other-key".to_string(),
        ));
        let after: Vec<String> = session
            .transcript()
            .iter()
            .map(|m| m.content.clone())
            .collect();

        assert_eq!(before, after);
        assert_eq!(session.config().provider, Provider::OpenAi);
        assert_eq!(session.config().model, "gpt-3.5-turbo");
    }
}
