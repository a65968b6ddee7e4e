//! Seam between the conversation logic and a hosted model.

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;

use crate::api::LatLng;
use crate::core::error::ChatError;
use crate::core::message::{GroundingSource, Role};

/// One event from a streaming reply. A well-behaved stream yields any number
/// of `Chunk`s and then `End`, or `Error` followed by `End`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamMessage {
    Chunk(String),
    Error(String),
    End,
}

pub type ChunkStream = BoxStream<'static, StreamMessage>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Provider-side conversation: the model id plus the turns exchanged so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    model: String,
    history: Vec<Turn>,
}

impl ChatSession {
    pub fn new(model: impl Into<String>, history: Vec<Turn>) -> Self {
        Self {
            model: model.into(),
            history,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Records a completed exchange so later turns carry it as context.
    pub fn record_exchange(&mut self, sent: impl Into<String>, reply: impl Into<String>) {
        self.history.push(Turn::new(Role::User, sent));
        self.history.push(Turn::new(Role::Model, reply));
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroundingTool {
    GoogleSearch,
    GoogleMaps { location: Option<LatLng> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroundedAnswer {
    pub text: String,
    pub sources: Vec<GroundingSource>,
}

#[async_trait]
pub trait ModelProvider: Send + Sync {
    fn create_session(&self, model: &str, history: Vec<Turn>) -> ChatSession {
        ChatSession::new(model, history)
    }

    /// Sends `message` on top of the session history and streams the reply.
    /// The session itself is not modified.
    async fn send_and_stream(
        &self,
        session: &ChatSession,
        message: &str,
    ) -> Result<ChunkStream, ChatError>;

    /// Sends `message` on top of `session` and returns the whole reply at
    /// once. The default collects the streamed reply.
    async fn reply(&self, session: &ChatSession, message: &str) -> Result<String, ChatError> {
        let mut stream = self.send_and_stream(session, message).await?;
        let mut text = String::new();
        while let Some(event) = stream.next().await {
            match event {
                StreamMessage::Chunk(delta) => text.push_str(&delta),
                StreamMessage::Error(error) => return Err(ChatError::Transport(error)),
                StreamMessage::End => break,
            }
        }
        Ok(text)
    }

    /// One-shot generation with optional grounding tools.
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        tools: &[GroundingTool],
    ) -> Result<GroundedAnswer, ChatError>;
}
