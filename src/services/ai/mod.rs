pub mod classifier;
pub mod null;
pub mod ollama;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy)]
pub struct GenParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenParams {
    /// Intent routing wants determinism and a tiny JSON object.
    pub const ROUTING: GenParams = GenParams {
        temperature: 0.0,
        max_tokens: 120,
    };

    /// Free-form chat replies.
    pub const CHAT: GenParams = GenParams {
        temperature: 0.7,
        max_tokens: 240,
    };
}

/// The external LLM boundary. Implementations may fail arbitrarily; callers
/// in the routing core must degrade to a default rather than propagate.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        messages: &[Message],
        params: GenParams,
    ) -> anyhow::Result<String>;
}
