// src/chatbox/client.rs

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use url::Url;

use crate::{
    chatbox::ChatboxError,
    config::{ChatboxConfig, RetryConfig},
    models::{
        chatbox::{ChatboxWireMessage, ChatboxWireRequest, RawReply},
        conversation::{Conversation, Role},
    },
};

/// Request/response exchange with the upstream chatbox.
#[async_trait]
pub trait ChatboxTransport: Send + Sync {
    async fn send(&self, conversation: &Conversation) -> Result<RawReply, ChatboxError>;
}

/// Blocking-style (one request, one reply) HTTP client for the chatbox service.
///
/// Retries use a fixed delay. Dropping the returned future aborts the request in flight.
#[derive(Clone)]
pub struct HttpChatboxClient {
    client: reqwest::Client,
    url: Url,
    default_model: Option<String>,
    retry: Option<RetryConfig>,
}

impl HttpChatboxClient {
    pub fn new(config: &ChatboxConfig) -> Result<Self, ChatboxError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| ChatboxError::Config(e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            default_model: config.default_model.clone(),
            retry: config.retry.clone(),
        })
    }

    fn wire_request<'a>(&'a self, conversation: &'a Conversation) -> ChatboxWireRequest<'a> {
        let mut messages = Vec::with_capacity(conversation.messages.len() + 1);

        let has_system = conversation.messages.iter().any(|m| m.role == Role::System);
        if let (false, Some(system)) = (has_system, conversation.system_prompt.as_deref()) {
            messages.push(ChatboxWireMessage {
                role: Role::System.as_str(),
                content: system,
            });
        }
        messages.extend(conversation.messages.iter().map(|m| ChatboxWireMessage {
            role: m.role.as_str(),
            content: &m.content,
        }));

        ChatboxWireRequest {
            messages,
            model: conversation.model.as_deref().or(self.default_model.as_deref()),
            temperature: conversation.temperature,
            max_tokens: conversation.max_tokens,
        }
    }

    fn retries_left(&self, attempt: u32) -> bool {
        self.retry.as_ref().is_some_and(|r| attempt < r.max_retries)
    }

    async fn wait_before_retry(&self) {
        if let Some(retry) = &self.retry {
            tokio::time::sleep(retry.delay).await;
        }
    }
}

#[async_trait]
impl ChatboxTransport for HttpChatboxClient {
    async fn send(&self, conversation: &Conversation) -> Result<RawReply, ChatboxError> {
        let body = self.wire_request(conversation);
        let mut attempt = 0;

        loop {
            let result = self.client.post(self.url.clone()).json(&body).send().await;

            match result {
                Ok(response) if response.status().is_success() => {
                    let text = response.text().await?;
                    return serde_json::from_str::<RawReply>(&text)
                        .map_err(|e| ChatboxError::Decode(e.to_string()));
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    let detail = response.text().await.unwrap_or_default();
                    let retryable = self
                        .retry
                        .as_ref()
                        .is_some_and(|r| r.should_retry_status(status));

                    if retryable && self.retries_left(attempt) {
                        attempt += 1;
                        tracing::warn!(
                            "Chatbox returned {}, retrying (attempt {})",
                            status,
                            attempt
                        );
                        self.wait_before_retry().await;
                        continue;
                    }
                    return Err(ChatboxError::Status {
                        status,
                        body: detail,
                    });
                }
                Err(err) => {
                    if self.retries_left(attempt) {
                        attempt += 1;
                        tracing::warn!(
                            "Chatbox transport error: {}, retrying (attempt {})",
                            err,
                            attempt
                        );
                        self.wait_before_retry().await;
                        continue;
                    }
                    return Err(err.into());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::conversation::Message;

    fn client(default_model: Option<&str>) -> HttpChatboxClient {
        let mut config = ChatboxConfig::new(Url::parse("http://127.0.0.1:9/chat").unwrap());
        config.default_model = default_model.map(str::to_string);
        HttpChatboxClient::new(&config).unwrap()
    }

    #[test]
    fn system_prompt_is_prepended_when_missing() {
        let conversation = Conversation {
            messages: vec![Message::new(Role::User, "hi")],
            system_prompt: Some("be nice".into()),
            ..Default::default()
        };
        let c = client(Some("tutor-model"));
        let wire = serde_json::to_value(c.wire_request(&conversation)).unwrap();

        assert_eq!(wire["messages"][0]["role"], "system");
        assert_eq!(wire["messages"][0]["content"], "be nice");
        assert_eq!(wire["messages"][1]["role"], "user");
        assert_eq!(wire["model"], "tutor-model");
        assert!(wire.get("temperature").is_none());
        assert!(wire["messages"][1].get("timestamp").is_none());
    }

    #[test]
    fn explicit_system_message_is_not_duplicated() {
        let conversation = Conversation {
            messages: vec![Message::new(Role::System, "sys"), Message::new(Role::User, "hi")],
            system_prompt: Some("sys".into()),
            model: Some("override".into()),
            temperature: Some(0.3),
            max_tokens: Some(512),
            ..Default::default()
        };
        let c = client(Some("tutor-model"));
        let wire = serde_json::to_value(c.wire_request(&conversation)).unwrap();

        assert_eq!(wire["messages"].as_array().unwrap().len(), 2);
        assert_eq!(wire["model"], "override");
        assert_eq!(wire["max_tokens"], 512);
    }
}
