use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Claude CLI error: {0}")]
    Cli(String),

    #[error("Completion timed out after {0} seconds")]
    Timeout(u64),

    #[error("Agent response parse error: {0}")]
    Parse(String),

    #[error("Market data error: {0}")]
    Cache(#[from] hedgefund_cache::CacheError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
