//! Showdown Agent - protocol runner
//!
//! Reads battle protocol lines for one player from stdin and writes each
//! choice to stdout. Logs go to stderr so stdout stays a clean protocol
//! channel.

use clap::Parser;
use showdown_agent::core::config::{load_config, AgentConfig};
use showdown_agent::core::error::Result;
use showdown_agent::core::types::SideId;
use showdown_agent::dex::{Dex, StaticDex, Translations};
use showdown_agent::session::BattleSession;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Showdown Agent - plays one side of a battle over stdin/stdout
#[derive(Parser, Debug)]
#[command(name = "showdown-agent")]
#[command(about = "Answer Showdown choice requests with a heuristic policy and an optional LLM advisor")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Static game data (JSON with species/moves/abilities/items tables)
    #[arg(long)]
    dex: Option<PathBuf>,

    /// Localized display names (JSON, one table per category)
    #[arg(long)]
    translations: Option<PathBuf>,

    /// Never consult the advisory service
    #[arg(long)]
    no_advisory: bool,

    /// Seed for move exploration; also turns exploration on
    #[arg(long)]
    seed: Option<u64>,

    /// Side this agent plays until a request says otherwise
    #[arg(long)]
    side: Option<SideId>,
}

fn build_config(args: &Args) -> Result<AgentConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AgentConfig::default(),
    };
    config.advisory.apply_env();

    if args.no_advisory {
        config.advisory.enabled = false;
    }
    if let Some(seed) = args.seed {
        config.policy.exploration.enabled = true;
        config.policy.exploration.seed = Some(seed);
    }
    if let Some(side) = args.side {
        config.battle.own_side = side;
    }
    if let Some(path) = &args.dex {
        config.data.dex_path = Some(path.clone());
    }
    if let Some(path) = &args.translations {
        config.data.translations_path = Some(path.clone());
    }

    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("showdown_agent=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = build_config(&args)?;

    let dex: Arc<dyn Dex> = match &config.data.dex_path {
        Some(path) => {
            let dex = StaticDex::load(path)?;
            tracing::info!("Loaded {} moves from {:?}", dex.move_count(), path);
            Arc::new(dex)
        }
        None => {
            tracing::warn!("No dex configured - every move scores as zero power");
            Arc::new(StaticDex::new())
        }
    };
    let translations = match &config.data.translations_path {
        Some(path) => Arc::new(Translations::load(path)?),
        None => Arc::new(Translations::empty()),
    };

    let mut session = BattleSession::from_config(&config, dex, translations);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if let Some(submission) = session.handle_line(&line).await {
            stdout.write_all(submission.line.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
        if session.is_finished() {
            break;
        }
    }

    tracing::info!(session = %session.id(), outcome = ?session.outcome(), "Runner exiting");
    Ok(())
}
