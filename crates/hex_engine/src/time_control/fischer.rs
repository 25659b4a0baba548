//! Fischer time: an increment after each move, optionally capped.

use super::clock::ClockRules;
use super::{
    PlayerTimeValues, TimeControlError, TimeControlKind, TimeControlType, max_budget, seconds,
    within_budget,
};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Options of a Fischer clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FischerOptions {
    /// Starting budget of each player.
    pub initial_seconds: u64,
    /// Time added to the mover after each move.
    pub increment_seconds: u64,
    /// Cap on remaining time after an increment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_seconds: Option<u64>,
}

/// Adds the increment to the mover's remaining time, capped by the maximum.
///
/// Without `maxSeconds` the remaining time is capped at the global budget
/// limit instead.
#[derive(Debug, Clone, Copy)]
pub struct FischerRules {
    options: FischerOptions,
    initial: TimeDelta,
    increment: TimeDelta,
    ceiling: TimeDelta,
}

impl FischerRules {
    /// Validates options and builds the rules.
    pub fn new(options: FischerOptions) -> Result<Self, TimeControlError> {
        if options.initial_seconds == 0 {
            return Err(TimeControlError::InvalidConfiguration(
                "initialSeconds must be positive".to_string(),
            ));
        }
        if let Some(max) = options
            .max_seconds
            .filter(|max| *max < options.initial_seconds)
        {
            return Err(TimeControlError::InvalidConfiguration(format!(
                "maxSeconds ({}) is below initialSeconds ({})",
                max, options.initial_seconds
            )));
        }
        within_budget(
            options.initial_seconds.checked_add(options.increment_seconds),
            "initialSeconds + incrementSeconds",
        )?;

        Ok(Self {
            options,
            initial: seconds(options.initial_seconds, "initialSeconds")?,
            increment: seconds(options.increment_seconds, "incrementSeconds")?,
            ceiling: match options.max_seconds {
                Some(max) => seconds(max, "maxSeconds")?,
                None => max_budget(),
            },
        })
    }
}

impl ClockRules for FischerRules {
    fn kind(&self) -> TimeControlKind {
        TimeControlKind::Fischer
    }

    fn config(&self) -> TimeControlType {
        TimeControlType::Fischer(self.options)
    }

    fn initial_values(&self) -> PlayerTimeValues {
        PlayerTimeValues::main_time(self.initial)
    }

    fn after_move(&self, values: &mut PlayerTimeValues) {
        values.remaining_time = values
            .remaining_time
            .checked_add(&self.increment)
            .map_or(self.ceiling, |incremented| incremented.min(self.ceiling));
    }
}
