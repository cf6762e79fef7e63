//! CLI subcommand definitions.
//!
//! Uses clap derive to define the subcommand hierarchy:
//! - `start` (default) -- run the bot
//! - `check` -- validate the question file without starting
//! - `version` -- print build/version info

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Would-you-rather poll bot for Telegram group chats.
#[derive(Parser, Debug)]
#[command(
    name = "dilemma",
    version = env!("CARGO_PKG_VERSION"),
    about = "dilemma — timed would-you-rather polls for group chats"
)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the bot (default when no subcommand is given).
    Start,

    /// Validate the question file and report how many questions it holds.
    Check {
        /// Question file to validate (default: the configured path).
        path: Option<PathBuf>,
    },

    /// Print version, build date, and git commit information.
    Version,
}
