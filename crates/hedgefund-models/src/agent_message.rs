use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::market::{AnalysisContext, Snapshot};
use crate::signal::Signal;

/// Request sent to a strategy (serialized as JSON into the user prompt).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyRequest {
    pub request_id: Uuid,
    pub token: String,
    pub market_data: Snapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<AnalysisContext>,
}

/// Request sent to the decision synthesizer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionRequest {
    pub request_id: Uuid,
    pub token: String,
    pub market_data: Snapshot,
    /// All surviving strategy signals, in roster order.
    pub agent_signals: Vec<Signal>,
    pub risk_assessment: Option<Signal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<AnalysisContext>,
}
