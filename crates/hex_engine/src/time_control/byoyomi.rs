//! Byo-yomi: main time, then a number of fixed-length periods.
//!
//! Once main time is gone the player thinks inside a period. Moving
//! before the period runs out restores it to full length. Running a
//! period out uses it up and the next one starts full. The player
//! elapses when the last period runs out.

use super::clock::ClockRules;
use super::{
    PeriodValues, PlayerTimeValues, TimeControlError, TimeControlKind, TimeControlType, max_budget,
    seconds, within_budget,
};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Options of a byo-yomi clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByoyomiOptions {
    /// Main time of each player.
    pub initial_seconds: u64,
    /// Number of periods after main time.
    pub periods_count: u32,
    /// Length of each period.
    pub period_seconds: u64,
}

/// Main time first, then periods.
#[derive(Debug, Clone, Copy)]
pub struct ByoyomiRules {
    options: ByoyomiOptions,
    initial: TimeDelta,
    period: TimeDelta,
}

impl ByoyomiRules {
    /// Validates options and builds the rules.
    pub fn new(options: ByoyomiOptions) -> Result<Self, TimeControlError> {
        if options.periods_count > 0 && options.period_seconds == 0 {
            return Err(TimeControlError::InvalidConfiguration(
                "periodSeconds must be positive when periods are configured".to_string(),
            ));
        }
        if options.initial_seconds == 0 && options.periods_count == 0 {
            return Err(TimeControlError::InvalidConfiguration(
                "Byo-yomi needs main time or periods".to_string(),
            ));
        }
        within_budget(
            u64::from(options.periods_count)
                .checked_mul(options.period_seconds)
                .and_then(|in_periods| in_periods.checked_add(options.initial_seconds)),
            "initialSeconds + periodsCount x periodSeconds",
        )?;

        Ok(Self {
            options,
            initial: seconds(options.initial_seconds, "initialSeconds")?,
            period: seconds(options.period_seconds, "periodSeconds")?,
        })
    }
}

impl ClockRules for ByoyomiRules {
    fn kind(&self) -> TimeControlKind {
        TimeControlKind::Byoyomi
    }

    fn config(&self) -> TimeControlType {
        TimeControlType::Byoyomi(self.options)
    }

    fn initial_values(&self) -> PlayerTimeValues {
        let remaining_periods = self.options.periods_count;
        PlayerTimeValues {
            remaining_time: self.initial,
            periods: Some(PeriodValues {
                remaining_periods,
                period_remaining_time: if remaining_periods > 0 {
                    self.period
                } else {
                    TimeDelta::zero()
                },
            }),
        }
    }

    fn time_left(&self, values: &PlayerTimeValues) -> TimeDelta {
        let in_periods = match values.periods {
            Some(p) if p.remaining_periods > 0 => self
                .period
                .num_milliseconds()
                .checked_mul(i64::from(p.remaining_periods - 1))
                .and_then(TimeDelta::try_milliseconds)
                .and_then(|full| full.checked_add(&p.period_remaining_time)),
            _ => Some(TimeDelta::zero()),
        };
        in_periods
            .and_then(|in_periods| values.remaining_time.checked_add(&in_periods))
            .map_or(max_budget(), |left| left.min(max_budget()))
    }

    fn consume(&self, values: &mut PlayerTimeValues, spent: TimeDelta) {
        let from_main = spent.min(values.remaining_time).max(TimeDelta::zero());
        values.remaining_time = values.remaining_time - from_main;
        let spent = spent - from_main;

        let Some(periods) = values.periods.as_mut() else {
            return;
        };
        if spent <= TimeDelta::zero() || periods.remaining_periods == 0 {
            return;
        }
        if spent < periods.period_remaining_time {
            periods.period_remaining_time = periods.period_remaining_time - spent;
            return;
        }

        // The period in progress is used up; whole periods go next.
        let spent_ms = (spent - periods.period_remaining_time).num_milliseconds();
        periods.remaining_periods -= 1;
        let period_ms = self.period.num_milliseconds().max(1);
        let whole = u32::try_from(spent_ms / period_ms)
            .unwrap_or(u32::MAX)
            .min(periods.remaining_periods);
        periods.remaining_periods -= whole;
        periods.period_remaining_time = if periods.remaining_periods > 0 {
            self.period - TimeDelta::milliseconds(spent_ms - i64::from(whole) * period_ms)
        } else {
            TimeDelta::zero()
        };
    }

    fn after_move(&self, values: &mut PlayerTimeValues) {
        if values.remaining_time > TimeDelta::zero() {
            return;
        }
        if let Some(periods) = values.periods.as_mut() {
            if periods.remaining_periods > 0 {
                periods.period_remaining_time = self.period;
            }
        }
    }

    fn check_values(&self, values: &PlayerTimeValues) -> Result<(), TimeControlError> {
        let Some(periods) = values.periods else {
            return Err(TimeControlError::InvalidConfiguration(
                "Byo-yomi values require period data".to_string(),
            ));
        };
        if values.remaining_time < TimeDelta::zero()
            || periods.period_remaining_time < TimeDelta::zero()
        {
            return Err(TimeControlError::InvalidConfiguration(
                "Remaining time cannot be negative".to_string(),
            ));
        }
        if values.remaining_time > max_budget() {
            return Err(TimeControlError::InvalidConfiguration(
                "Remaining time exceeds the maximum budget".to_string(),
            ));
        }
        if periods.remaining_periods > self.options.periods_count
            || periods.period_remaining_time > self.period
        {
            return Err(TimeControlError::InvalidConfiguration(format!(
                "Period values exceed the configured {} x {}s",
                self.options.periods_count, self.options.period_seconds
            )));
        }
        Ok(())
    }
}
