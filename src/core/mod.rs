pub mod app;
pub mod chat_stream;
pub mod config;
pub mod constants;
pub mod conversation;
pub mod credentials;
pub mod error;
pub mod gemini;
pub mod keyring;
pub mod message;
pub mod mode;
pub mod prompt;
pub mod provider;
pub mod response_parser;
pub mod transcript;
pub mod ui_tree;
