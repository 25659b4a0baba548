//! Absolute time: one budget per player for the whole game.

use super::clock::ClockRules;
use super::{PlayerTimeValues, TimeControlError, TimeControlKind, TimeControlType, seconds};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Options of an absolute clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsoluteOptions {
    /// Budget of each player for the whole game.
    pub seconds_per_player: u64,
}

/// Fixed total budget, never replenished.
#[derive(Debug, Clone, Copy)]
pub struct AbsoluteRules {
    options: AbsoluteOptions,
    budget: TimeDelta,
}

impl AbsoluteRules {
    /// Validates options and builds the rules.
    pub fn new(options: AbsoluteOptions) -> Result<Self, TimeControlError> {
        if options.seconds_per_player == 0 {
            return Err(TimeControlError::InvalidConfiguration(
                "secondsPerPlayer must be positive".to_string(),
            ));
        }
        Ok(Self {
            options,
            budget: seconds(options.seconds_per_player, "secondsPerPlayer")?,
        })
    }
}

impl ClockRules for AbsoluteRules {
    fn kind(&self) -> TimeControlKind {
        TimeControlKind::Absolute
    }

    fn config(&self) -> TimeControlType {
        TimeControlType::Absolute(self.options)
    }

    fn initial_values(&self) -> PlayerTimeValues {
        PlayerTimeValues::main_time(self.budget)
    }

    fn after_move(&self, _values: &mut PlayerTimeValues) {}
}
