use crate::api::ChatError;
use crate::session::Provider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

/// Results marshaled from the tokio runtime back onto the UI thread.
#[derive(Debug, Clone)]
pub enum AppEvent {
    AssistantReply(String),
    ChatFailed(ChatError),
    KeyVerified(Provider),
    KeyRejected(String),
}
