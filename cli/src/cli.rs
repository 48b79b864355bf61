//! Command-line interface definition.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Decision-discussion orchestrator.
#[derive(Debug, Parser)]
#[command(name = "roundtable", version, about)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Explicit config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Skip config files and use built-in defaults
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Write operational logs to daily-rotated files in this directory
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Drive the full flow from a JSONL event script, printing deliveries
    /// to stdout.
    Simulate {
        /// Script file: one {"user": "...", "text": "..."} object per line
        #[arg(long)]
        script: PathBuf,

        /// Use canned completion replies instead of the OpenAI API
        #[arg(long)]
        scripted: bool,

        /// Write a JSONL transcript of the flow to this file
        #[arg(long)]
        transcript: Option<PathBuf>,
    },

    /// Run only the discussion engine over already-persisted reports.
    Discuss {
        /// Participants whose latest reports seed the agents
        #[arg(long, value_delimiter = ',', required = true)]
        participants: Vec<String>,

        /// Opening prompt; defaults to the latest leadership report
        #[arg(long)]
        topic: Option<String>,

        /// Override the configured turn count
        #[arg(long)]
        turns: Option<usize>,

        /// Use canned completion replies instead of the OpenAI API
        #[arg(long)]
        scripted: bool,
    },
}
