// src/chatbox/mod.rs

//! Everything that talks to the upstream LLM chatbox: prompt construction,
//! the HTTP transport, and the parse-and-wrap service on top of it.

pub mod client;
pub mod prompt;
pub mod prompts;
pub mod service;

pub use client::{ChatboxTransport, HttpChatboxClient};
pub use prompt::PromptBuilder;
pub use service::{Chatbox, ChatboxService};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatboxError {
    #[error("chatbox request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("chatbox responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("chatbox reply could not be decoded: {0}")]
    Decode(String),

    #[error("chatbox client misconfigured: {0}")]
    Config(String),
}
