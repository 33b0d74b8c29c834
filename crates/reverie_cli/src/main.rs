use anyhow::Context;
use async_trait::async_trait;
use clap::Parser;
use reverie_core::{MessageEvent, Presence, PresenceSink, RelationshipStore, ReverieConfig};
use reverie_reasoning::{Agent, Decision};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "reverie.toml", env = "REVERIE_CONFIG")]
    config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

/// Logs go to stderr so stdout stays a clean stream of decisions.
fn init_tracing(args: &Args) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = if args.log_json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };

    let (file_layer, guard) = match &args.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "reverie.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .with(filter)
        .init();
    guard
}

/// Presence changes are only logged; there is no chat transport here.
struct LogPresence;

#[async_trait]
impl PresenceSink for LogPresence {
    async fn set_presence(&self, presence: Presence) -> anyhow::Result<()> {
        info!("Presence: {:?}", presence);
        Ok(())
    }
}

/// Relationship strength grows with the number of recorded interactions.
#[derive(Default)]
struct InMemoryRelationships {
    interactions: Mutex<HashMap<String, u32>>,
}

#[async_trait]
impl RelationshipStore for InMemoryRelationships {
    async fn relationship_strength(&self, user_id: &str) -> anyhow::Result<f32> {
        let count = self
            .interactions
            .lock()
            .await
            .get(user_id)
            .copied()
            .unwrap_or(0);
        Ok((count as f32 / 20.0).min(1.0))
    }

    async fn record_interaction(&self, user_id: &str) -> anyhow::Result<()> {
        *self
            .interactions
            .lock()
            .await
            .entry(user_id.to_string())
            .or_insert(0) += 1;
        Ok(())
    }
}

fn emit(decision: &Decision) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(decision)?);
    Ok(())
}

async fn handle_line(agent: &Agent, line: &str) -> anyhow::Result<()> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(());
    }
    let event: MessageEvent = match serde_json::from_str(line) {
        Ok(event) => event,
        Err(e) => {
            warn!("Skipping malformed event: {}", e);
            return Ok(());
        }
    };

    let decision = agent.handle_event(event).await;
    for replayed in agent.take_replayed().await {
        emit(&replayed)?;
    }
    emit(&decision)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _guard = init_tracing(&args);

    let config = ReverieConfig::load_or_default(&args.config);
    info!(
        "Starting agent '{}' (stamina {}/{}, tick every {}s)",
        config.agent.agent_id,
        config.stamina.initial,
        config.stamina.max,
        config.runtime.tick_interval_secs
    );

    let tick_every = Duration::from_secs(config.runtime.tick_interval_secs.max(1));
    let agent = Agent::new(
        config,
        Arc::new(InMemoryRelationships::default()),
        Arc::new(LogPresence),
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(tick_every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;
    let mut last_tick = Instant::now();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("Failed to read stdin")? {
                    Some(line) => handle_line(&agent, &line).await?,
                    None => break,
                }
            }
            _ = ticker.tick() => {
                let elapsed = last_tick.elapsed();
                last_tick = Instant::now();
                let report = agent.tick(elapsed.as_secs_f32() / 60.0).await;
                debug!(
                    "Tick: stamina {:.1}/{:.1}, sleeping={}, {} conversation(s) changed",
                    report.stamina.current,
                    report.stamina.max,
                    report.stamina.is_sleeping,
                    report.maintenance.idled
                        + report.maintenance.completed
                        + report.maintenance.removed
                        + report.maintenance.evicted
                );
                for decision in &report.replayed {
                    emit(decision)?;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    info!("Shutting down");
    Ok(())
}
