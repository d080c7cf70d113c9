// src/chatbox/service.rs

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::{
    chatbox::{ChatboxError, ChatboxTransport},
    models::{
        chatbox::ChatBoxResponse,
        conversation::Conversation,
        question::{Question, QuizAssessmentAnswer},
    },
    utils::json_sanitizer::sanitize,
};

/// Single-shot chatbox operations used by the quiz pipeline.
#[async_trait]
pub trait Chatbox: Send + Sync {
    async fn generate(
        &self,
        conversation: &Conversation,
    ) -> Result<ChatBoxResponse<Vec<Question>>, ChatboxError>;

    async fn submit_assessment(
        &self,
        conversation: &Conversation,
    ) -> Result<ChatBoxResponse<QuizAssessmentAnswer>, ChatboxError>;

    async fn reinforce(
        &self,
        conversation: &Conversation,
    ) -> Result<ChatBoxResponse<Vec<Question>>, ChatboxError>;
}

/// Sends a conversation, repairs the reply's LaTeX escaping and parses it.
///
/// A reply that still fails to parse is not an error: it is logged and the
/// envelope carries the raw text with `data` left at its default.
#[derive(Clone)]
pub struct ChatboxService {
    transport: Arc<dyn ChatboxTransport>,
}

impl ChatboxService {
    pub fn new(transport: Arc<dyn ChatboxTransport>) -> Self {
        Self { transport }
    }

    async fn dispatch<T>(
        &self,
        operation: &'static str,
        conversation: &Conversation,
    ) -> Result<ChatBoxResponse<T>, ChatboxError>
    where
        T: DeserializeOwned + Default,
    {
        let reply = self.transport.send(conversation).await.map_err(|e| {
            tracing::error!("Chatbox {} call failed: {}", operation, e);
            e
        })?;

        let sanitized = sanitize(&reply.message);
        let data = match serde_json::from_str::<T>(&sanitized) {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(
                    "Failed to parse chatbox {} reply: {} (raw: {:?})",
                    operation,
                    e,
                    reply.message
                );
                T::default()
            }
        };

        tracing::debug!(
            "Chatbox {} done: model={} tokens={}",
            operation,
            reply.model,
            reply.total_tokens
        );

        Ok(ChatBoxResponse::from_reply(reply, data))
    }
}

#[async_trait]
impl Chatbox for ChatboxService {
    async fn generate(
        &self,
        conversation: &Conversation,
    ) -> Result<ChatBoxResponse<Vec<Question>>, ChatboxError> {
        self.dispatch("generate", conversation).await
    }

    async fn submit_assessment(
        &self,
        conversation: &Conversation,
    ) -> Result<ChatBoxResponse<QuizAssessmentAnswer>, ChatboxError> {
        self.dispatch("submit", conversation).await
    }

    async fn reinforce(
        &self,
        conversation: &Conversation,
    ) -> Result<ChatBoxResponse<Vec<Question>>, ChatboxError> {
        self.dispatch("reinforce", conversation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chatbox::RawReply;

    /// Replies with a fixed message, or fails with a fixed status.
    struct Canned(Result<String, u16>);

    #[async_trait]
    impl ChatboxTransport for Canned {
        async fn send(&self, _conversation: &Conversation) -> Result<RawReply, ChatboxError> {
            match &self.0 {
                Ok(message) => Ok(RawReply {
                    message: message.clone(),
                    role: "assistant".into(),
                    model: "tutor-1".into(),
                    finish_reason: "stop".into(),
                    prompt_tokens: 10,
                    completion_tokens: 20,
                    total_tokens: 30,
                }),
                Err(status) => Err(ChatboxError::Status {
                    status: *status,
                    body: "upstream down".into(),
                }),
            }
        }
    }

    fn service(reply: Result<&str, u16>) -> ChatboxService {
        ChatboxService::new(Arc::new(Canned(reply.map(str::to_string))))
    }

    #[tokio::test]
    async fn generate_parses_question_list() {
        let msg = r#"[{"question_number":1,"question":"2+2=?","answers":[{"label":"A","content":"3"},{"label":"B","content":"4"}],"right_answer":"B","duration":30}]"#;
        let resp = service(Ok(msg)).generate(&Conversation::default()).await.unwrap();

        assert_eq!(resp.data.len(), 1);
        assert_eq!(resp.data[0].right_answer, "B");
        assert_eq!(resp.data[0].duration, Some(30));
        assert_eq!(resp.response, msg);
        assert_eq!(resp.model, "tutor-1");
        assert_eq!(resp.total_tokens, 30);
        assert!(resp.user_quiz_assessment_id.is_none());
    }

    #[tokio::test]
    async fn latex_reply_is_repaired_before_parsing() {
        let msg = r#"[{"question_number":1,"question":"\frac{1}{2}+\frac{1}{2}=?","answers":[],"right_answer":"A"}]"#;
        let resp = service(Ok(msg)).reinforce(&Conversation::default()).await.unwrap();

        assert_eq!(resp.data[0].question, r"\frac{1}{2}+\frac{1}{2}=?");
        // The envelope keeps the raw text.
        assert_eq!(resp.response, msg);
    }

    #[tokio::test]
    async fn malformed_reply_yields_default_payload() {
        let resp = service(Ok("not json"))
            .submit_assessment(&Conversation::default())
            .await
            .unwrap();

        assert_eq!(resp.data, QuizAssessmentAnswer::default());
        assert_eq!(resp.response, "not json");
    }

    #[tokio::test]
    async fn transport_failure_is_an_error() {
        let err = service(Err(503))
            .generate(&Conversation::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatboxError::Status { status: 503, .. }));
    }
}
