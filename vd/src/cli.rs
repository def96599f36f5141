//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::TransportKind;

/// vd - voice-driven dispenser control
#[derive(Parser)]
#[command(
    name = "vd",
    about = "Plan, validate and dispatch dispenser commands from speech",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the planning service
    Serve {
        /// Address to listen on (overrides config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Plan a command from text once and print it
    Plan {
        /// Transcript text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Validate a raw command object and print the clamped result
    Validate {
        /// JSON object, e.g. '{"cmd":"WATER_ON","ml":200}'
        json: String,
    },

    /// Validate a raw command object and send it to the device
    Dispatch {
        /// JSON object, e.g. '{"cmd":"STOP"}'
        json: String,

        /// Transport to use (overrides config)
        #[arg(short, long, value_enum)]
        transport: Option<TransportKind>,
    },

    /// Run the voice pipeline over transcripts, one per line
    Listen {
        /// Read transcripts from a file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Transport to use (overrides config)
        #[arg(short, long, value_enum)]
        transport: Option<TransportKind>,
    },

    /// Print the effective configuration
    Config,
}

impl Command {
    /// Long-running commands log to a file instead of stderr
    pub fn logs_to_file(&self) -> bool {
        matches!(self, Command::Serve { .. } | Command::Listen { .. })
    }
}
