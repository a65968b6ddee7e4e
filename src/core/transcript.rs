use std::collections::VecDeque;
use std::fmt;

use crate::core::constants::GREETING;
use crate::core::message::{GroundingSource, Message, MessageId, Role};
use crate::core::response_parser::ParsedResponse;

/// Rejected transcript mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptError {
    UnknownMessage(MessageId),
    /// Only the in-flight model message may change after it is appended.
    NotInFlight(MessageId),
}

impl fmt::Display for TranscriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptError::UnknownMessage(id) => write!(f, "no message with id {id}"),
            TranscriptError::NotInFlight(id) => {
                write!(f, "message {id} is settled and can no longer change")
            }
        }
    }
}

impl std::error::Error for TranscriptError {}

/// Ordered chat history for one process lifetime.
///
/// Messages are appended and never removed individually. The one exception
/// to immutability is the most recent model message while its response is
/// still streaming.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: VecDeque<Message>,
    in_flight: Option<MessageId>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transcript seeded with the model greeting.
    pub fn with_greeting() -> Self {
        let mut transcript = Self::new();
        transcript
            .messages
            .push_back(Message::new(Role::Model, GREETING).with_id(MessageId::new("init")));
        transcript
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> MessageId {
        let message = Message::user(text);
        let id = message.id.clone();
        self.messages.push_back(message);
        id
    }

    /// Appends an empty model message and marks it as the in-flight one,
    /// settling any previous in-flight message.
    pub fn push_placeholder(&mut self) -> MessageId {
        let message = Message::model_placeholder();
        let id = message.id.clone();
        self.messages.push_back(message);
        self.in_flight = Some(id.clone());
        id
    }

    pub fn in_flight(&self) -> Option<&MessageId> {
        self.in_flight.as_ref()
    }

    /// Overwrites the in-flight message with a fresh parse of the buffer.
    pub fn apply_parse(
        &mut self,
        id: &MessageId,
        parsed: ParsedResponse,
    ) -> Result<&Message, TranscriptError> {
        let message = self.in_flight_mut(id)?;
        message.text_part = parsed.text_part;
        message.ui_part = parsed.ui_part;
        Ok(&*message)
    }

    pub fn set_sources(
        &mut self,
        id: &MessageId,
        sources: Vec<GroundingSource>,
    ) -> Result<(), TranscriptError> {
        self.in_flight_mut(id)?.sources = sources;
        Ok(())
    }

    /// Flags the in-flight message as failed, keeping whatever text had
    /// already streamed in and appending the error after it.
    pub fn mark_error(
        &mut self,
        id: &MessageId,
        error: &str,
    ) -> Result<&Message, TranscriptError> {
        let message = self.in_flight_mut(id)?;
        message.is_error = true;
        message.text_part = if message.text_part.trim().is_empty() {
            format!("Error: {error}")
        } else {
            format!("{}\n\nError: {error}", message.text_part)
        };
        Ok(&*message)
    }

    /// Freezes the in-flight message.
    pub fn settle(&mut self, id: &MessageId) -> Result<(), TranscriptError> {
        self.in_flight_mut(id)?;
        self.in_flight = None;
        Ok(())
    }

    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().rev().find(|m| &m.id == id)
    }

    pub fn messages(&self) -> &VecDeque<Message> {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.back()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.in_flight = None;
    }

    fn in_flight_mut(&mut self, id: &MessageId) -> Result<&mut Message, TranscriptError> {
        if self.in_flight.as_ref() != Some(id) {
            return Err(if self.get(id).is_some() {
                TranscriptError::NotInFlight(id.clone())
            } else {
                TranscriptError::UnknownMessage(id.clone())
            });
        }
        self.messages
            .iter_mut()
            .rev()
            .find(|m| &m.id == id)
            .ok_or_else(|| TranscriptError::UnknownMessage(id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(text: &str) -> ParsedResponse {
        ParsedResponse {
            text_part: text.to_string(),
            ui_part: None,
        }
    }

    #[test]
    fn greeting_transcript_starts_with_model_message() {
        let transcript = Transcript::with_greeting();
        let first = transcript.last().expect("greeting");
        assert_eq!(first.id.as_str(), "init");
        assert!(first.is_model());
        assert!(transcript.in_flight().is_none());
    }

    #[test]
    fn updates_replace_in_flight_message_in_place() {
        let mut transcript = Transcript::new();
        transcript.push_user("hello");
        let id = transcript.push_placeholder();

        transcript.apply_parse(&id, parsed("He")).expect("in flight");
        transcript.apply_parse(&id, parsed("Hello")).expect("in flight");

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.get(&id).expect("message").text_part, "Hello");
    }

    #[test]
    fn settled_messages_reject_updates() {
        let mut transcript = Transcript::new();
        let id = transcript.push_placeholder();
        transcript.settle(&id).expect("settle");

        let err = transcript.apply_parse(&id, parsed("late")).unwrap_err();
        assert_eq!(err, TranscriptError::NotInFlight(id.clone()));
        assert!(transcript.get(&id).expect("message").text_part.is_empty());
    }

    #[test]
    fn user_messages_are_never_in_flight() {
        let mut transcript = Transcript::new();
        let user = transcript.push_user("hi");
        let _placeholder = transcript.push_placeholder();

        assert!(matches!(
            transcript.apply_parse(&user, parsed("x")),
            Err(TranscriptError::NotInFlight(_))
        ));
        assert!(matches!(
            transcript.apply_parse(&MessageId::new("missing"), parsed("x")),
            Err(TranscriptError::UnknownMessage(_))
        ));
    }

    #[test]
    fn mark_error_replaces_empty_text() {
        let mut transcript = Transcript::new();
        let id = transcript.push_placeholder();
        let message = transcript.mark_error(&id, "boom").expect("in flight");
        assert!(message.is_error);
        assert_eq!(message.text_part, "Error: boom");
    }

    #[test]
    fn mark_error_keeps_partial_text() {
        let mut transcript = Transcript::new();
        let id = transcript.push_placeholder();
        transcript.apply_parse(&id, parsed("partial")).expect("in flight");
        let message = transcript.mark_error(&id, "boom").expect("in flight");
        assert_eq!(message.text_part, "partial\n\nError: boom");
    }
}
