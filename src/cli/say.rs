//! One-shot "say" command

use std::error::Error;
use std::io::{self, Write};

use crate::cli::chat::StreamPrinter;
use crate::core::conversation::{Conversation, ConversationOptions, TurnOutcome};
use crate::core::provider::ModelProvider;

/// Sends a single prompt, streams the reply to stdout, and fails when the
/// turn fails.
pub async fn run_say(
    provider: Box<dyn ModelProvider>,
    options: ConversationOptions,
    prompt: Vec<String>,
) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        return Err("Usage: genui-chat say <prompt>".into());
    }

    let mut conversation = Conversation::new(
        provider,
        ConversationOptions {
            greeting: false,
            ..options
        },
    );

    let mut printer = StreamPrinter::new();
    let outcome = conversation
        .send(&prompt, |message| {
            if let Some(text) = printer.update(message) {
                print!("{text}");
                let _ = io::stdout().flush();
            }
        })
        .await;

    if let Some(message) = outcome
        .message_id()
        .and_then(|id| conversation.transcript().get(id))
    {
        println!("{}", printer.finish(message));
    }

    match outcome {
        TurnOutcome::Failed { error, .. } => Err(error.into()),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conversation::test_support::ScriptedProvider;
    use crate::core::error::ChatError;
    use crate::core::mode::UiMode;

    fn text_only() -> ConversationOptions {
        ConversationOptions {
            mode: UiMode::TextOnly,
            ..ConversationOptions::default()
        }
    }

    #[tokio::test]
    async fn joins_words_into_one_prompt() {
        let provider = ScriptedProvider::new().with_chunks(&["ok"]);
        run_say(
            Box::new(provider.clone()),
            text_only(),
            vec!["hello".into(), "there".into()],
        )
        .await
        .expect("say");

        assert_eq!(provider.sent_messages(), vec!["hello there".to_string()]);
    }

    #[tokio::test]
    async fn failed_turn_is_an_error() {
        let provider = ScriptedProvider::new().with_send_error(ChatError::missing_api_key());
        let err = run_say(Box::new(provider), text_only(), vec!["hi".into()])
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("API key not set"));
    }

    #[tokio::test]
    async fn empty_prompt_is_rejected() {
        let provider = ScriptedProvider::new();
        assert!(run_say(Box::new(provider.clone()), text_only(), Vec::new())
            .await
            .is_err());
        assert!(provider.sent_messages().is_empty());
    }
}
