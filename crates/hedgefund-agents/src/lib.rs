pub mod aggregate;
pub mod claude_cli;
pub mod completion;
pub mod error;
pub mod orchestrator;
pub mod parser;
pub mod prompts;
pub mod roster;
pub mod strategy;
pub mod synthesizer;

pub mod test_support;

pub use completion::CompletionService;
pub use error::AgentError;
pub use orchestrator::{Orchestrator, StrategySet};
pub use strategy::{catalogue, LlmStrategy, Strategy, StrategyKind, StrategyProfile};
pub use synthesizer::{DecisionSynthesizer, LlmDecisionSynthesizer};
