//! Hex Arena - hosted Hex games with rule enforcement and game clocks.
//!
//! # Architecture
//!
//! - **Engine** (`hex_engine`): board, rules, swap, snapshots, clocks
//! - **Session**: per-game locked host relaying engine events
//! - **Config**: TOML defaults for new games
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use hex_arena::{ArenaConfig, GameOptions, SessionManager};
//! use hex_engine::Move;
//!
//! # fn example() -> Result<(), hex_arena::SessionError> {
//! let manager = SessionManager::new();
//! let options = GameOptions::from(&ArenaConfig::default());
//! let now = Utc::now();
//!
//! manager.create_game("g1", &options, now)?;
//! manager.join_game("g1", "alice", now)?;
//! manager.join_game("g1", "bob", now)?;
//! manager.submit_move("g1", "alice", Move::at(5, 5, now))?;
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod session;

pub use config::{ArenaConfig, ConfigError};
pub use session::{
    GameOptions, GameSession, MoveOutcome, PlayerId, SessionError, SessionEvent, SessionId,
    SessionManager, SessionSnapshot, TimeControlSnapshot,
};
