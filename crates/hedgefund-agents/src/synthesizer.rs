use std::sync::Arc;

use async_trait::async_trait;
use hedgefund_models::agent_message::DecisionRequest;
use hedgefund_models::decision::Decision;
use tracing::debug;

use crate::completion::CompletionService;
use crate::error::AgentError;
use crate::parser::parse_decision;
use crate::prompts::decision_system_prompt;

/// Turns all signals and the risk assessment into one decision.
#[async_trait]
pub trait DecisionSynthesizer: Send + Sync {
    async fn synthesize(&self, request: &DecisionRequest) -> Result<Decision, AgentError>;
}

/// Synthesizer backed by the completion service.
pub struct LlmDecisionSynthesizer {
    completion: Arc<dyn CompletionService>,
}

impl LlmDecisionSynthesizer {
    pub fn new(completion: Arc<dyn CompletionService>) -> Self {
        Self { completion }
    }
}

#[async_trait]
impl DecisionSynthesizer for LlmDecisionSynthesizer {
    async fn synthesize(&self, request: &DecisionRequest) -> Result<Decision, AgentError> {
        let user_prompt = serde_json::to_string_pretty(request)?;
        let raw = self
            .completion
            .complete(&decision_system_prompt(), &user_prompt)
            .await?;
        if raw.trim().is_empty() {
            return Err(AgentError::Cli("Decision synthesis received an empty response".to_string()));
        }
        debug!(token = %request.token, response_len = raw.len(), "Decision completion received");
        Ok(parse_decision(&raw))
    }
}
