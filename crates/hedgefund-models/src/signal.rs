use serde::{Deserialize, Serialize};

/// Directional opinion carried by a [`Signal`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SignalAction {
    Bullish,
    Bearish,
    Neutral,
}

impl SignalAction {
    /// Lenient mapping from free-form model output. Unknown words map to `Neutral`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "bullish" | "buy" | "long" | "very_bullish" => SignalAction::Bullish,
            "bearish" | "sell" | "short" | "very_bearish" => SignalAction::Bearish,
            _ => SignalAction::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalAction::Bullish => "bullish",
            SignalAction::Bearish => "bearish",
            SignalAction::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for SignalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One strategy's structured opinion about an asset.
///
/// Produced exactly once per strategy invocation and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Signal {
    pub agent_name: String,
    pub action: SignalAction,
    /// 0 to 100.
    pub confidence: f64,
    pub reasoning: String,
    pub key_metrics: Vec<String>,
    pub risks: Vec<String>,
    pub data_used: Vec<String>,
}

impl Signal {
    /// Build a signal, clamping confidence into `[0, 100]`. NaN becomes 0.
    pub fn new(
        agent_name: impl Into<String>,
        action: SignalAction,
        confidence: f64,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            agent_name: agent_name.into(),
            action,
            confidence: clamp_confidence(confidence),
            reasoning: reasoning.into(),
            key_metrics: Vec::new(),
            risks: Vec::new(),
            data_used: Vec::new(),
        }
    }

    pub fn with_key_metrics(mut self, key_metrics: Vec<String>) -> Self {
        self.key_metrics = key_metrics;
        self
    }

    pub fn with_risks(mut self, risks: Vec<String>) -> Self {
        self.risks = risks;
        self
    }

    pub fn with_data_used(mut self, data_used: Vec<String>) -> Self {
        self.data_used = data_used;
        self
    }
}

/// Clamp a confidence value into the `[0, 100]` domain.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Serialized form of a signal inside analysis reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignalView {
    pub agent: String,
    pub action: SignalAction,
    pub confidence: f64,
    pub reasoning: String,
    pub key_metrics: Vec<String>,
    pub risks: Vec<String>,
}

impl From<&Signal> for SignalView {
    fn from(signal: &Signal) -> Self {
        Self {
            agent: signal.agent_name.clone(),
            action: signal.action,
            confidence: signal.confidence,
            reasoning: signal.reasoning.clone(),
            key_metrics: signal.key_metrics.clone(),
            risks: signal.risks.clone(),
        }
    }
}
