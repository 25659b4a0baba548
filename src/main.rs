//! Hex Arena - CLI
//!
//! Scripted play and snapshot replay through the session host.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use chrono::{TimeDelta, Utc};
use clap::Parser;
use cli::{Cli, Command};
use hex_arena::{ArenaConfig, GameOptions, SessionManager, SessionSnapshot};
use hex_engine::{Game, GameData, GameState, Move};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use tracing_subscriber::EnvFilter;

const GAME_ID: &str = "cli";
const PLAYERS: [&str; 2] = ["player-0", "player-1"];

fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Play {
            moves,
            think_seconds,
            size,
            no_swap,
        } => {
            let mut options = GameOptions::from(&config);
            if let Some(size) = size {
                options.board_size = size;
            }
            if no_swap {
                options.allow_swap = false;
            }
            run_play(&options, &moves, think_seconds)
        }
        Command::Replay { snapshot } => run_replay(snapshot),
    }
}

/// Loads the configuration file, or defaults when none is given.
fn load_config(path: Option<&Path>) -> Result<ArenaConfig> {
    match path {
        Some(path) => Ok(ArenaConfig::from_file(path)?),
        None => {
            debug!("No config file, using defaults");
            Ok(ArenaConfig::default())
        }
    }
}

/// Plays the moves through the session host, alternating seats.
#[instrument(skip(options))]
fn run_play(options: &GameOptions, moves: &[String], think_seconds: u32) -> Result<()> {
    let manager = SessionManager::new();
    let mut now = Utc::now();

    manager.create_game(GAME_ID, options, now)?;
    for player in PLAYERS {
        manager.join_game(GAME_ID, player, now)?;
    }

    let think = TimeDelta::seconds(i64::from(think_seconds));
    for (i, notation) in moves.iter().enumerate() {
        now += think;
        let mv = Move::from_notation(notation, now)?;
        let outcome = manager
            .submit_move(GAME_ID, PLAYERS[i % 2], mv)
            .with_context(|| format!("Move #{} ({}) rejected", i + 1, notation))?;

        for event in manager.drain_events(GAME_ID)? {
            debug!(?event, "Session event");
        }
        if outcome.state != GameState::Playing {
            info!(moves = i + 1, "Game over");
            break;
        }
    }

    eprintln!("{}", manager.render(GAME_ID)?);
    let snapshot = manager.snapshot(GAME_ID, now)?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

/// Rebuilds a game by replay and prints the board and result.
#[instrument]
fn run_replay(path: PathBuf) -> Result<()> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let data: GameData = match serde_json::from_str::<SessionSnapshot>(&content) {
        Ok(snapshot) => snapshot.game,
        Err(_) => serde_json::from_str(&content).context("Not a session or game snapshot")?,
    };
    let game = Game::from_data(&data)?;

    println!("{}", game.board().render());
    println!();
    println!("moves: {}", game.moves_history().len());
    match (game.state(), game.winner()) {
        (GameState::Playing, _) => println!("playing, {} to move", game.current_player()),
        (GameState::Canceled, _) => println!("canceled"),
        (GameState::Ended, Some(winner)) => {
            let how = game.outcome().map_or("connection".to_string(), |o| o.to_string());
            println!("{} won by {}", winner, how);
            if let Some(path) = hex_engine::rules::winning_path(game.board(), winner) {
                let cells: Vec<String> = path.iter().map(|c| c.notation()).collect();
                println!("path: {}", cells.join(" "));
            }
        }
        (GameState::Ended, None) => println!("ended"),
    }
    Ok(())
}
