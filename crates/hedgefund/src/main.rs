use std::io::Read;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hedgefund_models::backtest::TimelineSignal;
use hedgefund_models::config::AnalysisMode;
use hedgefund_models::market::AnalysisContext;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hedgefund", about = "Multi-strategy crypto signal aggregation and backtesting")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "config/hedgefund.toml")]
    config: String,

    /// Override the configured strategy roster (full, fast, degen)
    #[arg(short, long, global = true)]
    mode: Option<AnalysisMode>,

    /// Pretty-print the output JSON
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline: all strategies, risk assessment and decision
    Analyze {
        token: String,
        #[arg(long)]
        chain: Option<String>,
        /// JSON file with portfolio state and notes passed to the strategies
        #[arg(long)]
        context: Option<String>,
    },
    /// Quick screen with three strategies, no decision
    Quick {
        token: String,
        #[arg(long)]
        chain: Option<String>,
    },
    /// Quick screen for several tokens
    Batch {
        #[arg(required = true)]
        tokens: Vec<String>,
        #[arg(long)]
        chain: Option<String>,
    },
    /// Replay a JSON signal timeline against cached price history
    Backtest {
        token_id: String,
        /// Read the signal timeline from a file instead of stdin
        #[arg(short, long)]
        signals: Option<String>,
        /// Look-back window in days (defaults to the configured value)
        #[arg(long)]
        days: Option<u32>,
    },
    /// List every strategy and its profile
    Agents,
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read input: {path}"))
        }
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn emit<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{output}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only JSON (respects RUST_LOG)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Command::Agents = cli.command {
        return emit(
            &serde_json::json!({ "agents": hedgefund::agents::catalogue() }),
            cli.pretty,
        );
    }

    let mut config = hedgefund::load_config(&cli.config)?;
    if let Some(mode) = cli.mode {
        config.agents.mode = mode;
    }
    let cache = hedgefund::open_cache(&config)?;

    match cli.command {
        Command::Analyze {
            token,
            chain,
            context,
        } => {
            let context: Option<AnalysisContext> = context
                .map(|path| -> Result<AnalysisContext> {
                    let text = read_input(Some(&path))?;
                    serde_json::from_str(&text).context("Failed to parse context JSON")
                })
                .transpose()?;

            let orchestrator = hedgefund::build_orchestrator(&config, cache);
            let report = orchestrator
                .analyze(&token, chain.as_deref(), context)
                .await;
            emit(&report, cli.pretty)
        }
        Command::Quick { token, chain } => {
            let orchestrator = hedgefund::build_orchestrator(&config, cache);
            let report = orchestrator.quick_signal(&token, chain.as_deref()).await;
            emit(&report, cli.pretty)
        }
        Command::Batch { tokens, chain } => {
            let orchestrator = hedgefund::build_orchestrator(&config, cache);
            let results = orchestrator.quick_batch(&tokens, chain.as_deref()).await;
            emit(&serde_json::json!({ "results": results }), cli.pretty)
        }
        Command::Backtest {
            token_id,
            signals,
            days,
        } => {
            let timeline_json = read_input(signals.as_deref())?;
            let timeline: Vec<TimelineSignal> =
                serde_json::from_str(&timeline_json).context("Failed to parse signal timeline JSON")?;

            let days = days.unwrap_or(config.backtest.default_days);
            let engine = hedgefund::build_backtest(&config, cache);
            let result = engine.run(&token_id, &timeline, days).await;
            emit(&result, cli.pretty)
        }
        Command::Agents => Ok(()),
    }
}
