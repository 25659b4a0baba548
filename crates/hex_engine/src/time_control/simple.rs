//! Simple time: a fresh budget for every move.

use super::clock::ClockRules;
use super::{PlayerTimeValues, TimeControlError, TimeControlKind, TimeControlType, seconds};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Options of a simple clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleOptions {
    /// Budget for each move.
    pub seconds_per_move: u64,
}

/// The mover's clock resets to the per-move budget after every move.
#[derive(Debug, Clone, Copy)]
pub struct SimpleRules {
    options: SimpleOptions,
    per_move: TimeDelta,
}

impl SimpleRules {
    /// Validates options and builds the rules.
    pub fn new(options: SimpleOptions) -> Result<Self, TimeControlError> {
        if options.seconds_per_move == 0 {
            return Err(TimeControlError::InvalidConfiguration(
                "secondsPerMove must be positive".to_string(),
            ));
        }
        Ok(Self {
            options,
            per_move: seconds(options.seconds_per_move, "secondsPerMove")?,
        })
    }
}

impl ClockRules for SimpleRules {
    fn kind(&self) -> TimeControlKind {
        TimeControlKind::Simple
    }

    fn config(&self) -> TimeControlType {
        TimeControlType::Simple(self.options)
    }

    fn initial_values(&self) -> PlayerTimeValues {
        PlayerTimeValues::main_time(self.per_move)
    }

    fn after_move(&self, values: &mut PlayerTimeValues) {
        values.remaining_time = self.per_move;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_above_limit_rejected() {
        let result = SimpleRules::new(SimpleOptions {
            seconds_per_move: u64::MAX,
        });
        assert!(matches!(result, Err(TimeControlError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_move_resets_budget() {
        let rules = SimpleRules::new(SimpleOptions { seconds_per_move: 30 }).unwrap();
        let mut values = rules.initial_values();
        rules.consume(&mut values, TimeDelta::seconds(12));
        rules.after_move(&mut values);
        assert_eq!(values.remaining_time, TimeDelta::seconds(30));
    }
}
