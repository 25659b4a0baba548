//! Command-line interface for hex_arena.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Hex Arena - two-player Hex with rule enforcement and game clocks
#[derive(Parser, Debug)]
#[command(name = "hex_arena")]
#[command(about = "Play and replay Hex games through the session host", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the arena configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a scripted game and print the final snapshot as JSON
    Play {
        /// Moves in notation, alternating players (e.g. b2 c2 b3)
        #[arg(required = true)]
        moves: Vec<String>,

        /// Seconds between consecutive moves
        #[arg(long, default_value = "1")]
        think_seconds: u32,

        /// Board size, overriding the configuration
        #[arg(long)]
        size: Option<usize>,

        /// Disable the swap-pieces rule
        #[arg(long)]
        no_swap: bool,
    },

    /// Rebuild a game from a snapshot file and print its board and result
    Replay {
        /// Path to a snapshot JSON file (session or game snapshot)
        snapshot: PathBuf,
    },
}
