// src/models/chatbox.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reply body of the upstream chatbox service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawReply {
    pub message: String,
    pub role: String,
    pub model: String,
    pub finish_reason: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Envelope returned by the chatbox service, generic over the parsed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatBoxResponse<T> {
    /// Raw (unsanitized) text of the model reply.
    pub response: String,
    pub data: T,
    pub role: String,
    pub model: String,
    pub finish_reason: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_quiz_assessment_id: Option<String>,
}

impl<T> ChatBoxResponse<T> {
    pub fn from_reply(reply: RawReply, data: T) -> Self {
        Self {
            response: reply.message,
            data,
            role: reply.role,
            model: reply.model,
            finish_reason: reply.finish_reason,
            prompt_tokens: reply.prompt_tokens,
            completion_tokens: reply.completion_tokens,
            total_tokens: reply.total_tokens,
            timestamp: Utc::now(),
            user_quiz_assessment_id: None,
        }
    }
}

/// Wire message sent upstream; timestamps stay local.
#[derive(Debug, Serialize)]
pub struct ChatboxWireMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

/// Wire request body sent upstream.
#[derive(Debug, Serialize)]
pub struct ChatboxWireRequest<'a> {
    pub messages: Vec<ChatboxWireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}
