//! Time control configuration and the clock factory.

use super::{
    AbsoluteOptions, AbsoluteRules, ByoyomiOptions, ByoyomiRules, Clock, FischerOptions,
    FischerRules, SimpleOptions, SimpleRules, TimeControl, TimeControlError, TimeControlKind,
    TimeControlValues,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Clock configuration: the variant and its options.
///
/// Serialized as `{ "type": "fischer", "options": { ... } }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "options", rename_all = "lowercase")]
pub enum TimeControlType {
    /// Fixed budget per player.
    Absolute(AbsoluteOptions),
    /// Fixed budget per move.
    Simple(SimpleOptions),
    /// Increment after each move.
    Fischer(FischerOptions),
    /// Main time followed by periods.
    Byoyomi(ByoyomiOptions),
}

impl TimeControlType {
    /// Returns the variant.
    pub fn kind(&self) -> TimeControlKind {
        match self {
            TimeControlType::Absolute(_) => TimeControlKind::Absolute,
            TimeControlType::Simple(_) => TimeControlKind::Simple,
            TimeControlType::Fischer(_) => TimeControlKind::Fischer,
            TimeControlType::Byoyomi(_) => TimeControlKind::Byoyomi,
        }
    }

    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`TimeControlError::InvalidConfiguration`] for unknown types
    /// or malformed options.
    pub fn from_json(json: &str) -> Result<Self, TimeControlError> {
        serde_json::from_str(json).map_err(|e| {
            warn!(error = %e, "Unreadable time control configuration");
            TimeControlError::InvalidConfiguration(e.to_string())
        })
    }
}

impl Default for TimeControlType {
    /// Ten minutes per player plus five seconds per move.
    fn default() -> Self {
        TimeControlType::Fischer(FischerOptions {
            initial_seconds: 600,
            increment_seconds: 5,
            max_seconds: None,
        })
    }
}

/// Builds a ready clock from configuration, optionally restoring values.
///
/// # Errors
///
/// Returns [`TimeControlError::InvalidConfiguration`] if the options are
/// unusable or the values do not fit the variant.
#[instrument(skip(values), fields(kind = %config.kind(), restored = values.is_some()))]
pub fn create_time_control(
    config: &TimeControlType,
    values: Option<&TimeControlValues>,
    at: DateTime<Utc>,
) -> Result<Box<dyn TimeControl>, TimeControlError> {
    let mut control: Box<dyn TimeControl> = match *config {
        TimeControlType::Absolute(options) => Box::new(Clock::new(AbsoluteRules::new(options)?)),
        TimeControlType::Simple(options) => Box::new(Clock::new(SimpleRules::new(options)?)),
        TimeControlType::Fischer(options) => Box::new(Clock::new(FischerRules::new(options)?)),
        TimeControlType::Byoyomi(options) => Box::new(Clock::new(ByoyomiRules::new(options)?)),
    };

    if let Some(values) = values {
        control.set_values(values, at)?;
    }
    debug!("Time control created");
    Ok(control)
}
