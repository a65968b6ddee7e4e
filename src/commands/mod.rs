mod registry;

pub use registry::{all_commands, matching_commands, Command, CommandInvocation};

use std::path::PathBuf;

use chrono::Local;

use crate::core::app::App;
use crate::core::mode::UiMode;

#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    Continue,
    ProcessAsMessage(String),
    Quit,
}

pub fn process_input(app: &mut App, input: &str) -> CommandResult {
    let trimmed = input.trim();

    let Some(rest) = trimmed.strip_prefix('/') else {
        return CommandResult::ProcessAsMessage(input.to_string());
    };

    let mut parts = rest.splitn(2, char::is_whitespace);
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    if let Some(command) = registry::find_command(command_name) {
        let invocation = CommandInvocation {
            input: trimmed,
            args,
        };
        (command.handler)(app, invocation)
    } else {
        CommandResult::ProcessAsMessage(input.to_string())
    }
}

pub fn help_text() -> String {
    let width = all_commands()
        .iter()
        .map(|command| command.usage.len())
        .max()
        .unwrap_or(0);
    let mut help = String::from("Commands:\n");
    for command in all_commands() {
        help.push_str(&format!("  {:width$}  {}\n", command.usage, command.help));
    }
    help.push_str("Anything else is sent to the model.");
    help
}

pub(super) fn handle_help(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    app.set_status(help_text());
    CommandResult::Continue
}

pub(super) fn handle_mode(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let mode = if invocation.args.is_empty() {
        app.conversation.toggle_mode()
    } else {
        match invocation.args.parse::<UiMode>() {
            Ok(mode) => {
                app.conversation.set_mode(mode);
                mode
            }
            Err(e) => {
                app.set_status(format!("{e}. Usage: /mode [gen-ui|text]"));
                return CommandResult::Continue;
            }
        }
    };
    app.set_status(format!("Mode: {} (applies to the next message)", mode.display_name()));
    CommandResult::Continue
}

pub(super) fn handle_html(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let path = if invocation.args.is_empty() {
        app.html_export().map(PathBuf::from).unwrap_or_else(|| {
            let date = Local::now().format("%Y-%m-%d");
            PathBuf::from(format!("genui-chat-{date}.html"))
        })
    } else {
        PathBuf::from(invocation.args)
    };

    match app.export_html_to(&path) {
        Ok(()) => {
            let message = format!("Wrote {} (updated after every reply)", path.display());
            app.set_html_export(path);
            app.set_status(message);
        }
        Err(e) => app.set_status(format!("HTML export error: {e}")),
    }
    CommandResult::Continue
}

pub(super) fn handle_log(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let result = if invocation.args.is_empty() {
        app.logging.toggle_logging()
    } else if invocation.args.split_whitespace().count() == 1 {
        app.logging.set_log_file(PathBuf::from(invocation.args))
    } else {
        app.set_status("Usage: /log [filename]");
        return CommandResult::Continue;
    };

    match result {
        Ok(message) => app.set_status(message),
        Err(e) => app.set_status(format!("Log error: {e}")),
    }
    CommandResult::Continue
}

pub(super) fn handle_clear(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    match app.clear() {
        Ok(()) => app.set_status("Started a new conversation."),
        Err(e) => app.set_status(format!("Cleared, but outputs could not be rewritten: {e}")),
    }
    CommandResult::Continue
}

pub(super) fn handle_quit(_app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Quit
}
