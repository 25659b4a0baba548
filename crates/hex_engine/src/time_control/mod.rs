//! Per-player game clocks.
//!
//! Every clock follows the same state machine:
//!
//! ```text
//! ready --start--> running <--pause/resume--> paused
//! running --exhausted--> elapsed (absorbing)
//! ```
//!
//! Only the current player's time runs. Time is never read from a wall
//! clock: each operation receives the instant it happens at, and the clock
//! settles the running player's time up to that instant. A settle that
//! finds the running player out of time elapses the clock at the exact
//! exhaustion instant and emits [`TimeControlEvent::Elapsed`] once.
//!
//! The variants differ only in how time is consumed and replenished,
//! captured by [`ClockRules`]:
//!
//! - [`AbsoluteRules`]: a fixed budget per player.
//! - [`SimpleRules`]: a fixed budget per move.
//! - [`FischerRules`]: an increment after each move, optionally capped.
//! - [`ByoyomiRules`]: main time, then fixed-length periods.

mod absolute;
mod byoyomi;
mod clock;
mod factory;
mod fischer;
pub mod millis;
mod simple;

pub use absolute::{AbsoluteOptions, AbsoluteRules};
pub use byoyomi::{ByoyomiOptions, ByoyomiRules};
pub use clock::{Clock, ClockRules};
pub use factory::{TimeControlType, create_time_control};
pub use fischer::{FischerOptions, FischerRules};
pub use simple::{SimpleOptions, SimpleRules};

use super::events::Listener;
use super::types::Player;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ─────────────────────────────────────────────────────────────
//  States and errors
// ─────────────────────────────────────────────────────────────

/// State of a clock.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ClockState {
    /// Created, not started.
    Ready,
    /// The current player's time is running.
    Running,
    /// Stopped, nobody's time runs.
    Paused,
    /// A player ran out of time.
    Elapsed,
}

/// Clock variant.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TimeControlKind {
    /// Fixed budget per player.
    Absolute,
    /// Fixed budget per move.
    Simple,
    /// Increment after each move.
    Fischer,
    /// Main time followed by periods.
    Byoyomi,
}

/// Clock configuration or usage error.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum TimeControlError {
    /// Options or values do not describe a usable clock.
    #[display("Invalid time control configuration: {}", _0)]
    InvalidConfiguration(String),

    /// The operation is not allowed in the current clock state.
    #[display("Invalid time control state: {}", _0)]
    InvalidState(String),
}

impl std::error::Error for TimeControlError {}

/// Largest total budget a clock may give one player: one hundred years.
///
/// Options whose reachable budget exceeds it are rejected, so clock
/// arithmetic and deadlines stay far inside the range of [`DateTime`].
pub const MAX_BUDGET_SECONDS: u64 = 100 * 365 * 24 * 60 * 60;

/// [`MAX_BUDGET_SECONDS`] as a duration.
pub(crate) fn max_budget() -> TimeDelta {
    TimeDelta::seconds(MAX_BUDGET_SECONDS as i64)
}

/// Converts a configured number of seconds to a duration.
pub(crate) fn seconds(value: u64, option: &str) -> Result<TimeDelta, TimeControlError> {
    within_budget(Some(value), option)?;
    i64::try_from(value)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .ok_or_else(|| {
            TimeControlError::InvalidConfiguration(format!("{} is out of range: {}", option, value))
        })
}

/// Rejects a total (`None` when its computation overflowed) above the budget cap.
pub(crate) fn within_budget(total: Option<u64>, what: &str) -> Result<(), TimeControlError> {
    match total {
        Some(total) if total <= MAX_BUDGET_SECONDS => Ok(()),
        _ => Err(TimeControlError::InvalidConfiguration(format!(
            "{} exceeds the maximum budget of {}s",
            what, MAX_BUDGET_SECONDS
        ))),
    }
}

// ─────────────────────────────────────────────────────────────
//  Values
// ─────────────────────────────────────────────────────────────

/// Byo-yomi period counters of one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodValues {
    /// Periods left, including the one in progress.
    pub remaining_periods: u32,
    /// Time left in the period in progress.
    #[serde(with = "millis")]
    pub period_remaining_time: TimeDelta,
}

/// Remaining time of one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerTimeValues {
    /// Main time left.
    #[serde(with = "millis")]
    pub remaining_time: TimeDelta,
    /// Period counters, byo-yomi only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub periods: Option<PeriodValues>,
}

impl PlayerTimeValues {
    /// Values with main time only.
    pub fn main_time(remaining_time: TimeDelta) -> Self {
        Self {
            remaining_time,
            periods: None,
        }
    }
}

/// Snapshot of both players' clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeControlValues {
    /// Player whose time runs (or would run).
    pub current_player: Player,
    /// Per-player values, indexed by player.
    pub players: [PlayerTimeValues; 2],
}

impl TimeControlValues {
    /// Returns the values of a player.
    pub fn player(&self, player: Player) -> &PlayerTimeValues {
        &self.players[player.index()]
    }
}

/// Something that happened to a clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum TimeControlEvent {
    /// A player ran out of time at `at`. Fired at most once per clock.
    Elapsed {
        /// Flagged player.
        player: Player,
        /// Exhaustion instant.
        at: DateTime<Utc>,
    },
}

// ─────────────────────────────────────────────────────────────
//  Contract
// ─────────────────────────────────────────────────────────────

/// A two-player game clock.
///
/// Operations called in a state that does not allow them fail with
/// [`TimeControlError::InvalidState`] and change nothing. Pausing or
/// switching an elapsed clock is a no-op, so a host can react to a game
/// ending without first checking for a timeout.
pub trait TimeControl: fmt::Debug + Send {
    /// Returns the clock variant.
    fn kind(&self) -> TimeControlKind;

    /// Returns the configuration the clock was built from.
    fn config(&self) -> TimeControlType;

    /// Returns the clock state.
    fn state(&self) -> ClockState;

    /// Returns the player whose time runs (or would run).
    fn current_player(&self) -> Player;

    /// Starts running `player`'s time. Only from `ready`.
    fn start(&mut self, player: Player, at: DateTime<Utc>) -> Result<(), TimeControlError>;

    /// Stops the running time. Only from `running`.
    fn pause(&mut self, at: DateTime<Utc>) -> Result<(), TimeControlError>;

    /// Restarts the current player's time. Only from `paused`.
    fn resume(&mut self, at: DateTime<Utc>) -> Result<(), TimeControlError>;

    /// Ends the current player's turn and starts the opponent's time.
    /// Only from `running`.
    fn switch_player(&mut self, at: DateTime<Utc>) -> Result<(), TimeControlError>;

    /// Settles the running time up to `at` and returns the resulting state.
    fn tick(&mut self, at: DateTime<Utc>) -> ClockState;

    /// Returns both players' values as of `at`.
    fn values(&mut self, at: DateTime<Utc>) -> TimeControlValues;

    /// Replaces both players' values.
    ///
    /// A running clock restarts counting from `at`. If the current player
    /// has no time left the clock elapses at `at`.
    fn set_values(
        &mut self,
        values: &TimeControlValues,
        at: DateTime<Utc>,
    ) -> Result<(), TimeControlError>;

    /// Checks whether `player` ran out of time.
    fn is_player_elapsed(&self, player: Player) -> bool;

    /// Returns the flagged player and the exhaustion instant.
    fn elapsed(&self) -> Option<(Player, DateTime<Utc>)>;

    /// Returns when the running player would run out of time.
    fn deadline(&self) -> Option<DateTime<Utc>>;

    /// Registers a listener for clock events.
    fn on_event(&mut self, listener: Listener<TimeControlEvent>);
}
