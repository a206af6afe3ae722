use async_trait::async_trait;

use crate::error::AgentError;

/// Turns a system prompt plus a user prompt into raw model text.
///
/// Implementations own their timeout; callers make a single attempt.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, AgentError>;
}
