use async_trait::async_trait;

use super::{CompletionService, GenParams, Message};
use crate::services::gate;

/// Completion service for environments without a model. Routing requests get
/// a non-JSON reply, which makes the classifier yield nothing and leaves the
/// regex extractor in charge; chat requests get a short canned answer.
pub struct NullCompletionService;

#[async_trait]
impl CompletionService for NullCompletionService {
    async fn complete(
        &self,
        _system_prompt: &str,
        messages: &[Message],
        _params: GenParams,
    ) -> anyhow::Result<String> {
        let user = messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
            .unwrap_or("");

        let reply = if gate::is_greeting(user) {
            "Hello! How can I help you today?"
        } else {
            "Got it. How else can I help?"
        };
        Ok(reply.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_greeting_gets_greeting_reply() {
        let svc = NullCompletionService;
        let msgs = vec![Message {
            role: "user".to_string(),
            content: "hello".to_string(),
        }];
        let reply = svc.complete("", &msgs, GenParams::CHAT).await.unwrap();
        assert_eq!(reply, "Hello! How can I help you today?");
    }

    #[tokio::test]
    async fn test_other_input_gets_generic_reply() {
        let svc = NullCompletionService;
        let msgs = vec![Message {
            role: "user".to_string(),
            content: "the weather is nice".to_string(),
        }];
        let reply = svc.complete("", &msgs, GenParams::CHAT).await.unwrap();
        assert_eq!(reply, "Got it. How else can I help?");
    }
}
