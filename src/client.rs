//! Background dispatch of provider calls. Requests run on the tokio runtime
//! so the UI thread never blocks; outcomes come back as `AppEvent`s.

use std::sync::mpsc;

use tokio::runtime::Handle;

use crate::api::{self, ChatMessage, REQUEST_TIMEOUT};
use crate::event::AppEvent;
use crate::session::ProviderConfig;

#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    tx: mpsc::Sender<AppEvent>,
    runtime_handle: Handle,
}

impl ChatClient {
    /// Must be called from within the tokio runtime so the handle can be
    /// captured for later spawns.
    pub fn new(tx: mpsc::Sender<AppEvent>) -> Result<Self, Box<dyn std::error::Error>> {
        let runtime_handle = Handle::try_current()?;
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            tx,
            runtime_handle,
        })
    }

    /// Dispatch one chat turn. The payload is a snapshot taken by the
    /// session, so the transcript can't change under the request.
    pub fn send(&self, config: ProviderConfig, messages: Vec<ChatMessage>) {
        let http = self.http.clone();
        let tx = self.tx.clone();

        self.runtime_handle.spawn(async move {
            let event = match api::send_chat_completion(&http, &config, messages).await {
                Ok(reply) => AppEvent::AssistantReply(reply),
                Err(err) => AppEvent::ChatFailed(err),
            };
            let _ = tx.send(event);
        });
    }

    /// Probe the key against the provider's models listing.
    pub fn verify_key(&self, config: ProviderConfig) {
        let http = self.http.clone();
        let tx = self.tx.clone();

        self.runtime_handle.spawn(async move {
            let event = match api::verify_key(&http, &config).await {
                Ok(()) => AppEvent::KeyVerified(config.provider),
                Err(err) => AppEvent::KeyRejected(err.to_string()),
            };
            let _ = tx.send(event);
        });
    }
}
