//! Turn orchestration: prompt composition, streaming, and transcript updates.
//!
//! One turn runs `idle → awaiting-first-delta → streaming → settled`. A turn
//! borrows the conversation mutably for its whole duration, so a second turn
//! cannot start while one is in flight.

use futures_util::StreamExt;
use tracing::{debug, warn};

use crate::core::constants::DEFAULT_MODEL;
use crate::core::error::ChatError;
use crate::core::message::{Message, MessageId};
use crate::core::mode::UiMode;
use crate::core::prompt::compose_prompt;
use crate::core::provider::{ChatSession, GroundingTool, ModelProvider, StreamMessage};
use crate::core::response_parser::ResponseParser;
use crate::core::transcript::Transcript;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    AwaitingFirstDelta,
    Streaming,
    SettledOk,
    SettledError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank prompt; nothing was appended.
    Ignored,
    Completed { message_id: MessageId },
    Failed { message_id: MessageId, error: ChatError },
}

impl TurnOutcome {
    pub fn message_id(&self) -> Option<&MessageId> {
        match self {
            TurnOutcome::Ignored => None,
            TurnOutcome::Completed { message_id } | TurnOutcome::Failed { message_id, .. } => {
                Some(message_id)
            }
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TurnOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone)]
pub struct ConversationOptions {
    pub model: String,
    pub mode: UiMode,
    /// Run a search-grounded lookup before generative turns.
    pub grounding: bool,
    /// Accept fenced JSON UI trees in replies.
    pub ui_tree_blocks: bool,
    pub greeting: bool,
}

impl Default for ConversationOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            mode: UiMode::default(),
            grounding: true,
            ui_tree_blocks: false,
            greeting: true,
        }
    }
}

pub struct Conversation {
    provider: Box<dyn ModelProvider>,
    model: String,
    mode: UiMode,
    grounding: bool,
    parser: ResponseParser,
    session: Option<ChatSession>,
    transcript: Transcript,
    state: TurnState,
}

impl Conversation {
    pub fn new(provider: Box<dyn ModelProvider>, options: ConversationOptions) -> Self {
        let transcript = if options.greeting {
            Transcript::with_greeting()
        } else {
            Transcript::new()
        };

        Self {
            provider,
            model: options.model,
            mode: options.mode,
            grounding: options.grounding,
            parser: ResponseParser::new().with_ui_tree_blocks(options.ui_tree_blocks),
            session: None,
            transcript,
            state: TurnState::Idle,
        }
    }

    pub fn mode(&self) -> UiMode {
        self.mode
    }

    /// Applies from the next turn on.
    pub fn set_mode(&mut self, mode: UiMode) {
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) -> UiMode {
        self.mode = self.mode.toggled();
        self.mode
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn session(&self) -> Option<&ChatSession> {
        self.session.as_ref()
    }

    /// Drops the transcript and the provider session; the next send starts a
    /// fresh conversation.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.session = None;
        self.state = TurnState::Idle;
    }

    /// Runs one turn. `on_update` sees the model message after every change,
    /// including the final error annotation when the turn fails.
    pub async fn send<F>(&mut self, prompt: &str, mut on_update: F) -> TurnOutcome
    where
        F: FnMut(&Message),
    {
        if prompt.trim().is_empty() {
            return TurnOutcome::Ignored;
        }

        let mode = self.mode;
        self.transcript.push_user(prompt);
        let message_id = self.transcript.push_placeholder();
        self.state = TurnState::AwaitingFirstDelta;

        let result = self
            .run_turn(prompt, mode, &message_id, &mut on_update)
            .await;

        let outcome = match result {
            Ok(()) => {
                self.state = TurnState::SettledOk;
                TurnOutcome::Completed {
                    message_id: message_id.clone(),
                }
            }
            Err(error) => {
                warn!("turn failed: {error}");
                match self.transcript.mark_error(&message_id, error.message()) {
                    Ok(message) => on_update(message),
                    Err(err) => warn!("could not annotate failed turn: {err}"),
                }
                self.state = TurnState::SettledError;
                TurnOutcome::Failed {
                    message_id: message_id.clone(),
                    error,
                }
            }
        };

        if let Err(err) = self.transcript.settle(&message_id) {
            warn!("could not settle turn: {err}");
        }
        outcome
    }

    async fn run_turn<F>(
        &mut self,
        prompt: &str,
        mode: UiMode,
        message_id: &MessageId,
        on_update: &mut F,
    ) -> Result<(), ChatError>
    where
        F: FnMut(&Message),
    {
        let grounding_text = if mode.is_generative() && self.grounding {
            match self
                .provider
                .generate(&self.model, prompt, &[GroundingTool::GoogleSearch])
                .await
            {
                Ok(answer) => {
                    if !answer.sources.is_empty() {
                        if let Err(err) = self.transcript.set_sources(message_id, answer.sources) {
                            warn!("could not attach sources: {err}");
                        }
                    }
                    Some(answer.text)
                }
                Err(err) => {
                    let err = ChatError::Grounding(err.to_string());
                    debug!("continuing without grounding: {err}");
                    None
                }
            }
        } else {
            None
        };

        let outgoing = compose_prompt(
            prompt,
            mode,
            grounding_text.as_deref(),
            self.parser.ui_tree_blocks,
        );

        let session = self
            .session
            .get_or_insert_with(|| self.provider.create_session(&self.model, Vec::new()));

        let mut stream = self.provider.send_and_stream(session, &outgoing).await?;
        let mut buffer = String::new();

        while let Some(event) = stream.next().await {
            match event {
                StreamMessage::Chunk(delta) => {
                    buffer.push_str(&delta);
                    let parsed = self.parser.parse(&buffer);
                    match self.transcript.apply_parse(message_id, parsed) {
                        Ok(message) => on_update(message),
                        Err(err) => warn!("dropping stream update: {err}"),
                    }
                    self.state = TurnState::Streaming;
                }
                StreamMessage::Error(error) => return Err(ChatError::Transport(error)),
                StreamMessage::End => break,
            }
        }

        session.record_exchange(outgoing, buffer);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use futures_util::StreamExt;

    use crate::core::error::ChatError;
    use crate::core::provider::{
        ChatSession, ChunkStream, GroundedAnswer, GroundingTool, ModelProvider, StreamMessage,
    };

    /// Provider double that replays canned streams and records what it was
    /// asked to send.
    #[derive(Clone, Default)]
    pub struct ScriptedProvider {
        scripts: Arc<Mutex<VecDeque<Result<Vec<StreamMessage>, ChatError>>>>,
        grounding: Arc<Mutex<Option<Result<GroundedAnswer, ChatError>>>>,
        pub sent: Arc<Mutex<Vec<(ChatSession, String)>>>,
        pub grounding_calls: Arc<Mutex<usize>>,
    }

    impl ScriptedProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_chunks(self, chunks: &[&str]) -> Self {
            let mut script: Vec<StreamMessage> = chunks
                .iter()
                .map(|c| StreamMessage::Chunk(c.to_string()))
                .collect();
            script.push(StreamMessage::End);
            self.with_script(script)
        }

        pub fn with_script(self, script: Vec<StreamMessage>) -> Self {
            self.scripts.lock().unwrap().push_back(Ok(script));
            self
        }

        pub fn with_send_error(self, error: ChatError) -> Self {
            self.scripts.lock().unwrap().push_back(Err(error));
            self
        }

        pub fn with_grounding(self, answer: Result<GroundedAnswer, ChatError>) -> Self {
            *self.grounding.lock().unwrap() = Some(answer);
            self
        }

        pub fn sent_messages(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|(_, message)| message.clone())
                .collect()
        }
    }

    #[async_trait]
    impl ModelProvider for ScriptedProvider {
        async fn send_and_stream(
            &self,
            session: &ChatSession,
            message: &str,
        ) -> Result<ChunkStream, ChatError> {
            self.sent
                .lock()
                .unwrap()
                .push((session.clone(), message.to_string()));
            let script = self
                .scripts
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(vec![StreamMessage::End]))?;
            Ok(futures_util::stream::iter(script).boxed())
        }

        async fn generate(
            &self,
            _model: &str,
            _prompt: &str,
            _tools: &[GroundingTool],
        ) -> Result<GroundedAnswer, ChatError> {
            *self.grounding_calls.lock().unwrap() += 1;
            self.grounding
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Err(ChatError::Grounding("no grounding scripted".into())))
        }
    }
}
