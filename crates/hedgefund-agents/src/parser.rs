use std::str::FromStr;

use hedgefund_models::decision::{Conviction, Decision, DecisionAction, ExecutionPlan};
use hedgefund_models::signal::{Signal, SignalAction};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::warn;

use crate::error::AgentError;

/// Confidence assigned when the model output could not be read.
pub const FALLBACK_CONFIDENCE: f64 = 50.0;

/// Extract the first JSON object from a string that may contain surrounding text.
///
/// Handles common Claude response formats:
/// - Clean JSON: `{"key": "value"}`
/// - Markdown-wrapped: ```json\n{"key": "value"}\n```
/// - Prefix text: `Here is the analysis:\n{"key": "value"}`
pub fn extract_json(text: &str) -> Result<String, AgentError> {
    let trimmed = text.trim();

    if trimmed.starts_with('{') && serde_json::from_str::<Value>(trimmed).is_ok() {
        return Ok(trimmed.to_string());
    }

    let candidates = [
        extract_from_markdown_block(trimmed),
        extract_first_object(trimmed),
    ];
    for json_str in candidates.into_iter().flatten() {
        if serde_json::from_str::<Value>(&json_str).is_ok() {
            return Ok(json_str);
        }
    }

    Err(AgentError::Parse(format!(
        "No valid JSON object found in response (length={})",
        text.len()
    )))
}

/// Extract JSON from a markdown code block (```json ... ``` or ``` ... ```)
fn extract_from_markdown_block(text: &str) -> Option<String> {
    let start_markers = ["```json\n", "```json\r\n", "```\n", "```\r\n"];

    start_markers.iter().find_map(|marker| {
        let start = text.find(marker)? + marker.len();
        let end = text[start..].find("```")?;
        Some(text[start..start + end].trim().to_string())
    })
}

/// Find the first balanced { ... } in the text, ignoring braces inside strings.
fn extract_first_object(text: &str) -> Option<String> {
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if !in_string && depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    return start.map(|s| text[s..=i].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

/// The structured object in `raw`, if there is one.
fn structured_object(raw: &str) -> Option<serde_json::Map<String, Value>> {
    let json_str = extract_json(raw).ok()?;
    match serde_json::from_str::<Value>(&json_str).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// First word of `text` that is one of `keywords`, compared case-insensitively.
fn first_keyword<'a>(text: &str, keywords: &[&'a str]) -> Option<&'a str> {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .find_map(|word| {
            keywords
                .iter()
                .find(|k| word.eq_ignore_ascii_case(k))
                .copied()
        })
}

/// Read a 0-100 score from a number or a numeric string like `"72%"`.
fn read_confidence(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

/// Read a list of strings; scalars become a one-element list and non-strings are stringified.
fn read_string_list(value: Option<&Value>) -> Vec<String> {
    let as_text = |v: &Value| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    match value {
        Some(Value::Array(items)) => items.iter().map(as_text).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![as_text(other)],
    }
}

/// Read a decimal from a number or a string such as `"$1,234.50"` or `"5%"`.
fn read_decimal(value: Option<&Value>) -> Option<Decimal> {
    let text = match value? {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s
            .chars()
            .filter(|c| !matches!(c, '$' | ',' | '%') && !c.is_whitespace())
            .collect(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn read_decimal_list(value: Option<&Value>) -> Vec<Decimal> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(|v| read_decimal(Some(v))).collect(),
        other => read_decimal(other).into_iter().collect(),
    }
}

/// Parse a strategy's raw output into a [`Signal`]. Never fails.
///
/// A JSON object with an `action` field is read field by field. Anything else
/// falls back to the first action keyword in the text, confidence 50 and the
/// raw text as reasoning.
pub fn parse_signal(raw: &str, agent_name: &str) -> Signal {
    let structured = structured_object(raw).and_then(|obj| {
        let action = obj.get("action")?.as_str()?.to_string();
        Some((obj, action))
    });

    let Some((obj, action)) = structured else {
        warn!(agent = %agent_name, "Unstructured strategy output, using keyword fallback");
        return fallback_signal(raw, agent_name);
    };

    let reasoning = obj
        .get("reasoning")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| raw.to_string());

    Signal::new(
        agent_name,
        SignalAction::from_label(&action),
        read_confidence(obj.get("confidence")).unwrap_or(FALLBACK_CONFIDENCE),
        reasoning,
    )
    .with_key_metrics(read_string_list(obj.get("key_metrics")))
    .with_risks(read_string_list(obj.get("risks")))
    .with_data_used(read_string_list(obj.get("data_used")))
}

fn fallback_signal(raw: &str, agent_name: &str) -> Signal {
    let action = match first_keyword(raw, &["bullish", "bearish", "neutral"]) {
        Some("bullish") => SignalAction::Bullish,
        Some("bearish") => SignalAction::Bearish,
        _ => SignalAction::Neutral,
    };
    Signal::new(agent_name, action, FALLBACK_CONFIDENCE, raw)
}

fn decision_action(label: &str) -> Option<DecisionAction> {
    match label.trim().to_ascii_lowercase().as_str() {
        "buy" => Some(DecisionAction::Buy),
        "sell" => Some(DecisionAction::Sell),
        "hold" => Some(DecisionAction::Hold),
        "avoid" => Some(DecisionAction::Avoid),
        _ => None,
    }
}

fn conviction(label: Option<&str>) -> Conviction {
    match label.map(|l| l.trim().to_ascii_lowercase()).as_deref() {
        Some("high") => Conviction::High,
        Some("medium") => Conviction::Medium,
        _ => Conviction::Low,
    }
}

fn execution_plan(value: Option<&Value>) -> Option<ExecutionPlan> {
    let obj = value?.as_object()?;
    let take_profit = obj
        .get("take_profit")
        .or_else(|| obj.get("take_profit_levels"));

    Some(ExecutionPlan {
        entry_price: read_decimal(obj.get("entry_price")),
        position_size_pct: read_decimal(obj.get("position_size_pct")),
        stop_loss: read_decimal(obj.get("stop_loss")),
        take_profit: read_decimal_list(take_profit),
    })
}

/// Parse the decision synthesizer's raw output into a [`Decision`]. Never fails.
///
/// The fallback scans for the first of buy/sell/hold/avoid, defaults to hold,
/// confidence 50, low conviction, and never attaches an execution plan.
pub fn parse_decision(raw: &str) -> Decision {
    let structured = structured_object(raw).and_then(|obj| {
        let action = decision_action(obj.get("action")?.as_str()?)?;
        Some((obj, action))
    });

    let Some((obj, action)) = structured else {
        warn!("Unstructured decision output, using keyword fallback");
        let action = match first_keyword(raw, &["buy", "sell", "hold", "avoid"]) {
            Some(label) => decision_action(label).unwrap_or(DecisionAction::Hold),
            None => DecisionAction::Hold,
        };
        return Decision::new(action, Conviction::Low, FALLBACK_CONFIDENCE, raw, None);
    };

    let reasoning = obj
        .get("reasoning")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| raw.to_string());

    Decision::new(
        action,
        conviction(obj.get("conviction").and_then(Value::as_str)),
        read_confidence(obj.get("confidence")).unwrap_or(FALLBACK_CONFIDENCE),
        reasoning,
        execution_plan(obj.get("execution_plan")),
    )
}
