//! genui-chat is a chat client for Gemini that turns streamed replies into
//! sanitized HTML or whitelisted UI components.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation: prompt composition, the Gemini client,
//!   the streaming response parser, and the transcript.
//! - [`ui`] renders messages and UI trees to safe HTML.
//! - [`commands`] implements slash-command parsing and execution for the
//!   chat loop.
//! - [`api`] defines the Gemini request and response payloads.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
