//! vd - voice-driven dispenser control
//!
//! CLI entry point for the planning service and the voice pipeline.

use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use serde_json::Value;
use tokio::io::BufReader;
use tracing::{debug, info};

use voxdispense::cli::{Cli, Command};
use voxdispense::command::{self, RawCandidate};
use voxdispense::config::{Config, TransportKind};
use voxdispense::dispatch::{self, open_transport};
use voxdispense::llm::create_client;
use voxdispense::pipeline::{LineSource, Outcome, Pipeline, TranscriptSource};
use voxdispense::planner::{CommandPlanner, Planner, RemotePlanner};
use voxdispense::server;

fn parse_level(level_str: Option<&str>) -> tracing::Level {
    match level_str.map(|s| s.to_uppercase()) {
        None => tracing::Level::INFO,
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
    }
}

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>, to_file: bool) -> Result<()> {
    // Priority: CLI --log-level > config file > default (INFO)
    let level = parse_level(cli_log_level.or(config_log_level));
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    if to_file {
        let log_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("voxdispense")
            .join("logs");
        fs::create_dir_all(&log_dir).context("Failed to create log directory")?;
        let log_file = fs::File::create(log_dir.join("vd.log")).context("Failed to create log file")?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_ansi(false)
            .with_env_filter(filter)
            .init();
        info!(path = %log_dir.join("vd.log").display(), "Logging initialized (level: {:?})", level);
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .with_env_filter(filter)
            .init();
        debug!("Logging initialized (level: {:?})", level);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(
        cli.log_level.as_deref(),
        config_log_level.as_deref(),
        cli.command.logs_to_file(),
    )
    .context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    debug!(model = %config.llm.model, transport = ?config.device.transport, "main: loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Serve { bind } => cmd_serve(&config, bind).await,
        Command::Plan { text } => cmd_plan(&config, &text.join(" ")).await,
        Command::Validate { json } => cmd_validate(&json),
        Command::Dispatch { json, transport } => cmd_dispatch(&config, &json, transport).await,
        Command::Listen { input, transport } => cmd_listen(&config, input.as_deref(), transport).await,
        Command::Config => cmd_config(&config),
    }
}

fn local_planner(config: &Config) -> Result<Planner> {
    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    Planner::new(llm)
}

/// Run the planning service
async fn cmd_serve(config: &Config, bind: Option<String>) -> Result<()> {
    debug!(?bind, "cmd_serve: called");
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    let planner = Arc::new(local_planner(config)?);

    println!(
        "{} Planning service on {} (model: {})",
        "▶".green(),
        bind.cyan(),
        planner.model().yellow()
    );
    server::serve(planner, &bind).await
}

/// Plan once and print the command
async fn cmd_plan(config: &Config, text: &str) -> Result<()> {
    debug!(%text, "cmd_plan: called");
    let planner = local_planner(config)?;

    match planner.plan(text).await {
        Ok(cmd) => {
            println!("{}", cmd.to_json());
            Ok(())
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            std::process::exit(1);
        }
    }
}

fn parse_raw(json: &str) -> Result<RawCandidate> {
    match serde_json::from_str::<Value>(json).context("Argument is not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => Err(eyre::eyre!("Expected a JSON object, got: {}", other)),
    }
}

/// Validate a raw object and print the clamped command
fn cmd_validate(json: &str) -> Result<()> {
    debug!(%json, "cmd_validate: called");
    let raw = parse_raw(json)?;

    match command::validate(raw) {
        Ok(cmd) => {
            println!("{}", cmd.to_json());
            Ok(())
        }
        Err(reason) => {
            eprintln!("{} rejected: {}", "✗".red(), reason);
            std::process::exit(1);
        }
    }
}

/// Validate a raw object and send it to the device once
async fn cmd_dispatch(config: &Config, json: &str, transport: Option<TransportKind>) -> Result<()> {
    debug!(%json, ?transport, "cmd_dispatch: called");
    let raw = parse_raw(json)?;
    let cmd = match command::validate(raw) {
        Ok(cmd) => cmd,
        Err(reason) => {
            eprintln!("{} rejected: {}", "✗".red(), reason);
            std::process::exit(1);
        }
    };

    let kind = transport.unwrap_or(config.device.transport);
    let mut channel = open_transport(&config.device, kind)
        .await
        .context("Failed to open transport")?;

    dispatch::dispatch(cmd, channel.as_mut())
        .await
        .context(format!("Failed to dispatch over {}", channel.describe()))?;

    println!("{} Sent {} ({})", "✓".green(), cmd.to_line(), cmd.describe());
    Ok(())
}

/// Run the voice pipeline until the transcript source ends
async fn cmd_listen(config: &Config, input: Option<&Path>, transport: Option<TransportKind>) -> Result<()> {
    debug!(?input, ?transport, "cmd_listen: called");

    let planner: Arc<dyn CommandPlanner> = match &config.planner.url {
        Some(url) => {
            debug!(%url, "cmd_listen: using remote planner");
            Arc::new(RemotePlanner::new(url.clone(), Duration::from_millis(config.planner.timeout_ms))?)
        }
        None => {
            debug!("cmd_listen: planning locally");
            Arc::new(local_planner(config)?)
        }
    };

    let kind = transport.unwrap_or(config.device.transport);
    let channel = open_transport(&config.device, kind)
        .await
        .context("Failed to open transport")?;

    let marker = config.speech.abort_marker.clone();
    let mut source: Box<dyn TranscriptSource> = match input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .context(format!("Failed to open {}", path.display()))?;
            Box::new(LineSource::new(BufReader::new(file), marker))
        }
        None => Box::new(LineSource::new(BufReader::new(tokio::io::stdin()), marker)),
    };

    println!(
        "{} Listening ({} → {})",
        "▶".green(),
        planner.describe().cyan(),
        channel.describe().cyan()
    );

    let mut pipeline = Pipeline::new(planner, channel);
    let stats = pipeline.run(source.as_mut(), print_outcome).await?;

    println!(
        "{} {} utterances: {} dispatched, {} skipped, {} plan failures, {} dispatch failures",
        "■".blue(),
        stats.utterances,
        stats.dispatched.to_string().green(),
        stats.skipped,
        stats.plan_failures.to_string().yellow(),
        stats.dispatch_failures.to_string().red()
    );
    Ok(())
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Dispatched(cmd) => println!("{} {}", "✓".green(), cmd.to_line()),
        Outcome::Silence => println!("{} heard nothing", "·".dimmed()),
        Outcome::Aborted => println!("{} aborted", "·".dimmed()),
        Outcome::Busy => println!("{} busy, dropped", "!".yellow()),
        Outcome::PlanFailed(e) => println!("{} {}", "✗".yellow(), e),
        Outcome::DispatchFailed(cmd, e) => println!("{} {}: {}", "✗".red(), cmd.to_line(), e),
    }
}

/// Print the effective configuration
fn cmd_config(config: &Config) -> Result<()> {
    debug!("cmd_config: called");
    let yaml = serde_yaml::to_string(config).context("Failed to serialize config")?;
    print!("{}", yaml);
    Ok(())
}
