use crate::strategy::{StrategyKind, StrategyProfile};

/// Schema every signal-producing strategy answers with.
fn signal_schema() -> serde_json::Value {
    serde_json::json!({
        "action": "bullish | bearish | neutral",
        "confidence": "0-100",
        "reasoning": "<concise analysis>",
        "key_metrics": ["<metric that drove the call>"],
        "risks": ["<main risk>"],
        "data_used": ["<snapshot fields consulted>"]
    })
}

/// The risk assessor answers with a signal plus sizing parameters.
fn risk_schema() -> serde_json::Value {
    let mut schema = signal_schema();
    if let Some(obj) = schema.as_object_mut() {
        obj.insert("position_size".into(), "percentage of portfolio".into());
        obj.insert("max_position_usd".into(), "dollar amount".into());
        obj.insert("stop_loss".into(), "price or percentage".into());
        obj.insert("take_profit_levels".into(), serde_json::json!(["tp1", "tp2", "tp3"]));
        obj.insert("volatility_assessment".into(), "low | medium | high | extreme".into());
        obj.insert("liquidity_risk".into(), "low | medium | high".into());
    }
    schema
}

fn decision_schema() -> serde_json::Value {
    serde_json::json!({
        "action": "buy | sell | hold | avoid",
        "conviction": "low | medium | high",
        "confidence": "0-100",
        "reasoning": "<why this decision>",
        "execution_plan": {
            "entry_price": "<price, only for buy or sell>",
            "position_size_pct": "<percent of portfolio>",
            "stop_loss": "<price>",
            "take_profit": ["<price>", "<price>"]
        }
    })
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

fn stance(kind: StrategyKind) -> &'static str {
    match kind {
        StrategyKind::WarrenBuffett => {
            "Only buy what you understand and would hold for ten years. Price is what you pay, \
             value is what you get. Most tokens have no moat; say so when that is the case."
        }
        StrategyKind::MichaelBurry => {
            "Look for what the crowd is missing, especially on the downside. Euphoria, \
             reflexive leverage and large unlock schedules are red flags."
        }
        StrategyKind::CharlieMunger => {
            "Invert: describe how this position loses money before asking how it makes money. \
             Check the incentives of everyone involved."
        }
        StrategyKind::CathieWood => {
            "Think in adoption curves. Short-term drawdowns matter less than whether the \
             technology is on an exponential path."
        }
        StrategyKind::BillAckman => {
            "Look for a concrete catalyst and an asymmetric payoff. Concentrate only when the \
             thesis is simple and the downside is bounded."
        }
        StrategyKind::Degen => {
            "Trade momentum and narrative. Volume spikes, fresh attention and clean breakouts \
             matter more than fundamentals. Always say where you would exit."
        }
        StrategyKind::SolanaSpecialist => {
            "Judge the token inside its chain ecosystem: DEX liquidity, listing venue, \
             ecosystem capital rotation and chain-level activity."
        }
        StrategyKind::WhaleWatcher => {
            "Follow the large holders. Concentration, accumulation versus distribution and \
             exchange flows tell you who is positioned ahead of the move."
        }
        StrategyKind::PumpTrader => {
            "Treat every fresh launch as a potential rug until proven otherwise. Weigh launch \
             age, developer wallet behavior and early holder distribution."
        }
        StrategyKind::OnChainAnalyst => {
            "Let the chain data speak: holder growth, liquidity relative to market cap and \
             buy versus sell pressure."
        }
        StrategyKind::RiskManager => {
            "Preservation of capital is paramount. Size by conviction and volatility, set stops \
             and respect them, and treat liquidity as a risk factor."
        }
        StrategyKind::PortfolioManager => {
            "Weigh every analyst signal and the risk assessment, then commit to one action."
        }
    }
}

fn focus_list(profile: &StrategyProfile) -> String {
    profile
        .focus_areas
        .iter()
        .map(|area| format!("- {area}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// System prompt for a signal-producing strategy.
pub fn strategy_system_prompt(kind: StrategyKind) -> String {
    let profile = kind.profile();
    let schema = match kind {
        StrategyKind::RiskManager => risk_schema(),
        _ => signal_schema(),
    };

    format!(
        "You are {name}, an analyst on a crypto fund's research desk. {description}\n\n\
         ## STANCE\n\n{stance}\n\n\
         ## FOCUS AREAS\n\n{focus}\n\n\
         Risk tolerance: {risk:?}. Time horizon: {horizon:?}.\n\n\
         ## INPUT\n\n\
         The user message is a JSON object with `token`, `market_data` (price, market_cap, \
         volume_24h, liquidity, change_5m/1h/24h/7d/30d, ath, ath_change, fdv, holders, \
         volatility_30d and provider-specific fields) and an optional `context` (portfolio, \
         aggregate_sentiment, avg_confidence, notes). Missing fields are unknown, not zero.\n\n\
         ## OUTPUT FORMAT\n\n\
         Respond with ONLY a JSON object, no surrounding text:\n{schema}",
        name = profile.name,
        description = profile.description,
        stance = stance(kind),
        focus = focus_list(profile),
        risk = profile.risk_tolerance,
        horizon = profile.time_horizon,
        schema = pretty(&schema),
    )
}

/// System prompt for the decision synthesizer.
pub fn decision_system_prompt() -> String {
    let kind = StrategyKind::PortfolioManager;
    let profile = kind.profile();
    format!(
        "You are the {name} of a crypto fund. {description}\n\n\
         ## INPUT\n\n\
         The user message is a JSON object with `token`, `market_data`, `agent_signals` (one per \
         analyst: agent_name, action, confidence, reasoning, key_metrics, risks), \
         `risk_assessment` (may be null) and an optional `context`.\n\n\
         ## RULES\n\n\
         - {stance}\n\
         - Unanimous or near-unanimous signals with high confidence justify high conviction.\n\
         - Split signals or a negative risk assessment call for hold or a reduced size.\n\
         - Use avoid when the risk assessment flags liquidity or rug risk.\n\
         - Include `execution_plan` only for buy or sell; omit it for hold and avoid.\n\
         - Never size a position above what the risk assessment recommends.\n\n\
         ## OUTPUT FORMAT\n\n\
         Respond with ONLY a JSON object, no surrounding text:\n{schema}",
        name = profile.name,
        description = profile.description,
        stance = stance(kind),
        schema = pretty(&decision_schema()),
    )
}
