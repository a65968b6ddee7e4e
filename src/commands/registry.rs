use super::CommandResult;
use crate::core::app::App;

pub type CommandHandler = fn(&mut App, CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub input: &'a str,
    pub args: &'a str,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

/// Commands whose name starts with `prefix`, for completion hints.
pub fn matching_commands(prefix: &str) -> Vec<&'static Command> {
    let prefix = prefix.to_ascii_lowercase();
    all_commands()
        .iter()
        .filter(|command| command.name.starts_with(&prefix))
        .collect()
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usage: "/help",
        help: "Show available commands.",
        handler: super::handle_help,
    },
    Command {
        name: "mode",
        usage: "/mode [gen-ui|text]",
        help: "Toggle or set the rendering mode for the next turn.",
        handler: super::handle_mode,
    },
    Command {
        name: "html",
        usage: "/html [filename]",
        help: "Write the conversation as an HTML page (and keep it updated).",
        handler: super::handle_html,
    },
    Command {
        name: "log",
        usage: "/log [filename]",
        help: "Toggle logging or set the log file path.",
        handler: super::handle_log,
    },
    Command {
        name: "clear",
        usage: "/clear",
        help: "Start a new conversation.",
        handler: super::handle_clear,
    },
    Command {
        name: "quit",
        usage: "/quit",
        help: "Leave the chat.",
        handler: super::handle_quit,
    },
];
