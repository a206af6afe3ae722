use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::completion::CompletionService;
use crate::error::AgentError;

/// Configuration for a Claude CLI invocation.
#[derive(Debug, Clone)]
pub struct ClaudeCliConfig {
    pub model: String,
    pub timeout: Duration,
}

impl Default for ClaudeCliConfig {
    fn default() -> Self {
        Self {
            model: "claude-3-5-haiku-latest".to_string(),
            timeout: Duration::from_secs(45),
        }
    }
}

/// Invoke the `claude` CLI with a system prompt and user prompt.
/// Returns the raw stdout text.
pub async fn invoke_claude(
    system_prompt: &str,
    user_prompt: &str,
    config: &ClaudeCliConfig,
) -> Result<String, AgentError> {
    debug!(model = %config.model, prompt_len = user_prompt.len(), "Invoking claude CLI");

    let output = tokio::time::timeout(
        config.timeout,
        Command::new("claude")
            .args([
                "-p",
                user_prompt,
                "--system-prompt",
                system_prompt,
                "--model",
                &config.model,
                "--output-format",
                "text",
            ])
            .kill_on_drop(true)
            .output(),
    )
    .await
    .map_err(|_| AgentError::Timeout(config.timeout.as_secs()))?
    .map_err(|e| AgentError::Cli(format!("Failed to spawn claude: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(status = %output.status, stderr = %stderr, "Claude CLI failed");
        return Err(AgentError::Cli(format!(
            "claude exited {}: {}",
            output.status, stderr
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    if stdout.trim().is_empty() {
        return Err(AgentError::Cli("Claude returned empty response".to_string()));
    }

    Ok(stdout)
}

/// Check if the `claude` CLI is available on the system.
pub async fn check_cli_available() -> bool {
    match Command::new("claude").arg("--version").output().await {
        Ok(output) => output.status.success(),
        Err(_) => false,
    }
}

/// Completion service backed by the local `claude` CLI.
#[derive(Debug, Clone, Default)]
pub struct ClaudeCli {
    pub config: ClaudeCliConfig,
}

impl ClaudeCli {
    pub fn new(model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            config: ClaudeCliConfig {
                model: model.into(),
                timeout,
            },
        }
    }
}

#[async_trait]
impl CompletionService for ClaudeCli {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, AgentError> {
        invoke_claude(system_prompt, user_prompt, &self.config).await
    }
}
