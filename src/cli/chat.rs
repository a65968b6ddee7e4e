//! Line-oriented chat loop.

use std::error::Error;
use std::io::{self, Write};

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::{process_input, CommandResult};
use crate::core::app::App;
use crate::core::message::Message;

/// Prints a streaming message incrementally. A parse can rewrite text that
/// was already shown (an html fence closing, say); when that happens the
/// printer stops echoing and the settled message is printed whole instead.
#[derive(Default)]
pub(crate) struct StreamPrinter {
    printed: String,
    diverged: bool,
}

impl StreamPrinter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Text to print for this update, if any.
    pub(crate) fn update(&mut self, message: &Message) -> Option<String> {
        if self.diverged {
            return None;
        }
        match message.text_part.strip_prefix(self.printed.as_str()) {
            Some("") => None,
            Some(suffix) => {
                let suffix = suffix.to_string();
                self.printed.push_str(&suffix);
                Some(suffix)
            }
            None => {
                self.diverged = true;
                None
            }
        }
    }

    /// Whatever still has to be printed once the message has settled.
    pub(crate) fn finish(&mut self, message: &Message) -> String {
        let mut out = if self.diverged {
            let separator = if self.printed.is_empty() { "" } else { "\n" };
            format!("{separator}{}", message.text_part)
        } else {
            self.update(message).unwrap_or_default()
        };

        if let Some(node) = &message.ui_part {
            out.push_str(&format!("\n[UI component: {}]", node.kind));
        }
        if !message.sources.is_empty() {
            out.push_str("\nSources:");
            for source in &message.sources {
                if let Some(label) = source.label() {
                    match &source.uri {
                        Some(uri) if source.title.is_some() => {
                            out.push_str(&format!("\n  - {label} <{uri}>"))
                        }
                        _ => out.push_str(&format!("\n  - {label}")),
                    }
                }
            }
        }
        out
    }
}

fn print_now(text: &str) {
    print!("{text}");
    let _ = io::stdout().flush();
}

fn print_status(app: &mut App) {
    if let Some(status) = app.take_status() {
        println!("{status}");
    }
}

pub async fn run_chat(mut app: App) -> Result<(), Box<dyn Error>> {
    println!(
        "genui-chat · {} · {} mode · /help for commands",
        app.conversation.model(),
        app.conversation.mode().display_name()
    );
    if let Some(greeting) = app.conversation.transcript().last() {
        println!("\n{}\n", greeting.text_part);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_now("> ");
        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        match process_input(&mut app, &line) {
            CommandResult::Continue => print_status(&mut app),
            CommandResult::Quit => break,
            CommandResult::ProcessAsMessage(prompt) => {
                let mut printer = StreamPrinter::new();
                let outcome = app
                    .send(&prompt, |message| {
                        if let Some(text) = printer.update(message) {
                            print_now(&text);
                        }
                    })
                    .await;

                if let Some(message) = outcome
                    .message_id()
                    .and_then(|id| app.conversation.transcript().get(id))
                {
                    println!("{}\n", printer.finish(message));
                }
                print_status(&mut app);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::{GroundingSource, Role};
    use crate::core::ui_tree::UiNode;

    fn model(text: &str) -> Message {
        Message::new(Role::Model, text)
    }

    #[test]
    fn prints_only_new_suffixes() {
        let mut printer = StreamPrinter::new();
        assert_eq!(printer.update(&model("Hel")), Some("Hel".into()));
        assert_eq!(printer.update(&model("Hel")), None);
        assert_eq!(printer.update(&model("Hello")), Some("lo".into()));
        assert_eq!(printer.finish(&model("Hello!")), "!");
    }

    #[test]
    fn rewritten_text_is_printed_whole_at_the_end() {
        let mut printer = StreamPrinter::new();
        printer.update(&model("ht"));
        assert_eq!(printer.update(&model("<p>x</p>")), None);
        assert_eq!(printer.update(&model("<p>xy</p>")), None);
        assert_eq!(printer.finish(&model("<p>xy</p>")), "\n<p>xy</p>");
    }

    #[test]
    fn errors_extend_partial_output() {
        let mut printer = StreamPrinter::new();
        printer.update(&model("partial"));
        let mut failed = model("partial\n\nError: Connection lost");
        failed.is_error = true;
        assert_eq!(printer.finish(&failed), "\n\nError: Connection lost");
    }

    #[test]
    fn finish_lists_ui_and_sources() {
        let mut message = model("");
        message.ui_part = Some(UiNode::new("Card"));
        message.sources = vec![
            GroundingSource {
                uri: Some("https://a.example".into()),
                title: Some("A".into()),
            },
            GroundingSource {
                uri: Some("https://b.example".into()),
                title: None,
            },
        ];

        let out = StreamPrinter::new().finish(&message);
        assert_eq!(
            out,
            "\n[UI component: Card]\nSources:\n  - A <https://a.example>\n  - https://b.example"
        );
    }
}
