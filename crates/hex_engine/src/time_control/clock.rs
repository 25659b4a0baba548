//! Generic clock state machine parameterized by variant rules.

use super::{
    ClockState, PlayerTimeValues, TimeControl, TimeControlError, TimeControlEvent,
    TimeControlKind, TimeControlType, TimeControlValues, max_budget,
};
use crate::events::{Listener, Listeners};
use crate::types::Player;
use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;
use tracing::{debug, info, instrument, warn};

/// How a clock variant consumes and replenishes a player's time.
pub trait ClockRules: fmt::Debug + Send {
    /// Returns the clock variant.
    fn kind(&self) -> TimeControlKind;

    /// Returns the configuration these rules were built from.
    fn config(&self) -> TimeControlType;

    /// Values each player starts with.
    fn initial_values(&self) -> PlayerTimeValues;

    /// Total time the player can still spend before elapsing.
    fn time_left(&self, values: &PlayerTimeValues) -> TimeDelta {
        values.remaining_time
    }

    /// Deducts time spent thinking. Never drops below zero.
    fn consume(&self, values: &mut PlayerTimeValues, spent: TimeDelta) {
        values.remaining_time = (values.remaining_time - spent).max(TimeDelta::zero());
    }

    /// Applies the post-move adjustment to the mover's values.
    fn after_move(&self, values: &mut PlayerTimeValues);

    /// Validates restored values.
    fn check_values(&self, values: &PlayerTimeValues) -> Result<(), TimeControlError> {
        if values.remaining_time < TimeDelta::zero() {
            return Err(TimeControlError::InvalidConfiguration(
                "Remaining time cannot be negative".to_string(),
            ));
        }
        if values.remaining_time > max_budget() {
            return Err(TimeControlError::InvalidConfiguration(
                "Remaining time exceeds the maximum budget".to_string(),
            ));
        }
        if values.periods.is_some() {
            return Err(TimeControlError::InvalidConfiguration(format!(
                "{} time control has no periods",
                self.kind()
            )));
        }
        Ok(())
    }
}

/// A two-player clock driven by `R`.
#[derive(Debug)]
pub struct Clock<R: ClockRules> {
    rules: R,
    state: ClockState,
    current_player: Player,
    players: [PlayerTimeValues; 2],
    running_since: Option<DateTime<Utc>>,
    elapsed: Option<(Player, DateTime<Utc>)>,
    listeners: Listeners<TimeControlEvent>,
}

impl<R: ClockRules> Clock<R> {
    /// Creates a ready clock with both players at their initial values.
    pub fn new(rules: R) -> Self {
        let initial = rules.initial_values();
        Self {
            rules,
            state: ClockState::Ready,
            current_player: Player::First,
            players: [initial, initial],
            running_since: None,
            elapsed: None,
            listeners: Listeners::new(),
        }
    }

    /// Returns the variant rules.
    pub fn rules(&self) -> &R {
        &self.rules
    }

    fn invalid(&self, operation: &str) -> TimeControlError {
        warn!(state = %self.state, operation, "Clock operation rejected");
        TimeControlError::InvalidState(format!("Cannot {} a {} clock", operation, self.state))
    }

    /// Charges the running player for the time since the last settle.
    fn settle(&mut self, at: DateTime<Utc>) {
        if self.state != ClockState::Running {
            return;
        }
        let Some(since) = self.running_since else {
            return;
        };

        let player = self.current_player;
        let spent = (at - since).max(TimeDelta::zero());
        let left = self.rules.time_left(&self.players[player.index()]);

        if spent >= left {
            self.rules.consume(&mut self.players[player.index()], left);
            self.flag(player, since + left);
        } else {
            self.rules.consume(&mut self.players[player.index()], spent);
            self.running_since = Some(at);
        }
    }

    fn flag(&mut self, player: Player, at: DateTime<Utc>) {
        self.state = ClockState::Elapsed;
        self.running_since = None;
        self.elapsed = Some((player, at));
        info!(player = %player, at = %at, "Time elapsed");
        self.listeners.emit(&TimeControlEvent::Elapsed { player, at });
    }
}

impl<R: ClockRules> TimeControl for Clock<R> {
    fn kind(&self) -> TimeControlKind {
        self.rules.kind()
    }

    fn config(&self) -> TimeControlType {
        self.rules.config()
    }

    fn state(&self) -> ClockState {
        self.state
    }

    fn current_player(&self) -> Player {
        self.current_player
    }

    #[instrument(skip(self), fields(kind = %self.rules.kind()))]
    fn start(&mut self, player: Player, at: DateTime<Utc>) -> Result<(), TimeControlError> {
        if self.state != ClockState::Ready {
            return Err(self.invalid("start"));
        }
        self.state = ClockState::Running;
        self.current_player = player;
        self.running_since = Some(at);
        debug!("Clock started");
        self.settle(at);
        Ok(())
    }

    #[instrument(skip(self))]
    fn pause(&mut self, at: DateTime<Utc>) -> Result<(), TimeControlError> {
        match self.state {
            ClockState::Running => {
                self.settle(at);
                if self.state == ClockState::Running {
                    self.state = ClockState::Paused;
                    self.running_since = None;
                    debug!("Clock paused");
                }
                Ok(())
            }
            ClockState::Elapsed => Ok(()),
            _ => Err(self.invalid("pause")),
        }
    }

    #[instrument(skip(self))]
    fn resume(&mut self, at: DateTime<Utc>) -> Result<(), TimeControlError> {
        if self.state != ClockState::Paused {
            return Err(self.invalid("resume"));
        }
        self.state = ClockState::Running;
        self.running_since = Some(at);
        debug!("Clock resumed");
        Ok(())
    }

    #[instrument(skip(self))]
    fn switch_player(&mut self, at: DateTime<Utc>) -> Result<(), TimeControlError> {
        match self.state {
            ClockState::Running => {
                self.settle(at);
                if self.state == ClockState::Running {
                    let mover = self.current_player;
                    self.rules.after_move(&mut self.players[mover.index()]);
                    self.current_player = mover.opponent();
                    self.running_since = Some(at);
                    debug!(next = %self.current_player, "Clock switched");
                }
                Ok(())
            }
            ClockState::Elapsed => Ok(()),
            _ => Err(self.invalid("switch")),
        }
    }

    fn tick(&mut self, at: DateTime<Utc>) -> ClockState {
        self.settle(at);
        self.state
    }

    fn values(&mut self, at: DateTime<Utc>) -> TimeControlValues {
        self.settle(at);
        TimeControlValues {
            current_player: self.current_player,
            players: self.players,
        }
    }

    #[instrument(skip(self, values))]
    fn set_values(
        &mut self,
        values: &TimeControlValues,
        at: DateTime<Utc>,
    ) -> Result<(), TimeControlError> {
        if self.state == ClockState::Elapsed {
            return Err(self.invalid("set values of"));
        }
        for player_values in &values.players {
            self.rules.check_values(player_values)?;
        }

        self.players = values.players;
        self.current_player = values.current_player;
        if self.state == ClockState::Running {
            self.running_since = Some(at);
        }
        debug!(current = %self.current_player, "Clock values set");

        let player = self.current_player;
        if self.rules.time_left(&self.players[player.index()]) <= TimeDelta::zero() {
            self.flag(player, at);
        }
        Ok(())
    }

    fn is_player_elapsed(&self, player: Player) -> bool {
        matches!(self.elapsed, Some((flagged, _)) if flagged == player)
    }

    fn elapsed(&self) -> Option<(Player, DateTime<Utc>)> {
        self.elapsed
    }

    fn deadline(&self) -> Option<DateTime<Utc>> {
        let since = self.running_since.filter(|_| self.state == ClockState::Running)?;
        since.checked_add_signed(self.rules.time_left(&self.players[self.current_player.index()]))
    }

    fn on_event(&mut self, listener: Listener<TimeControlEvent>) {
        self.listeners.register(listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_control::{AbsoluteOptions, AbsoluteRules};
    use chrono::TimeZone;
    use std::sync::{Arc, Mutex};

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + TimeDelta::seconds(seconds)
    }

    fn clock(seconds: u64) -> Clock<AbsoluteRules> {
        Clock::new(
            AbsoluteRules::new(AbsoluteOptions {
                seconds_per_player: seconds,
            })
            .unwrap(),
        )
    }

    #[test]
    fn test_wrong_state_operations() {
        let mut clock = clock(60);
        assert!(matches!(clock.pause(at(0)), Err(TimeControlError::InvalidState(_))));
        assert!(matches!(clock.resume(at(0)), Err(TimeControlError::InvalidState(_))));
        assert!(matches!(clock.switch_player(at(0)), Err(TimeControlError::InvalidState(_))));

        clock.start(Player::First, at(0)).unwrap();
        assert!(matches!(clock.start(Player::First, at(1)), Err(TimeControlError::InvalidState(_))));
        assert!(matches!(clock.resume(at(1)), Err(TimeControlError::InvalidState(_))));
        assert_eq!(clock.state(), ClockState::Running);
    }

    #[test]
    fn test_elapses_once_at_exhaustion_instant() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut clock = clock(10);
        let sink = Arc::clone(&events);
        clock.on_event(Box::new(move |e| sink.lock().unwrap().push(*e)));

        clock.start(Player::Second, at(0)).unwrap();
        assert_eq!(clock.deadline(), Some(at(10)));
        assert_eq!(clock.tick(at(9)), ClockState::Running);
        assert_eq!(clock.tick(at(25)), ClockState::Elapsed);
        assert_eq!(clock.tick(at(30)), ClockState::Elapsed);
        clock.pause(at(31)).unwrap();
        clock.switch_player(at(31)).unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec![TimeControlEvent::Elapsed {
                player: Player::Second,
                at: at(10)
            }]
        );
        assert!(clock.is_player_elapsed(Player::Second));
        assert!(!clock.is_player_elapsed(Player::First));
        assert_eq!(clock.deadline(), None);
        assert_eq!(clock.values(at(40)).player(Player::Second).remaining_time, TimeDelta::zero());
    }

    #[test]
    fn test_paused_time_does_not_run() {
        let mut clock = clock(60);
        clock.start(Player::First, at(0)).unwrap();
        clock.pause(at(10)).unwrap();
        clock.resume(at(100)).unwrap();
        let values = clock.values(at(105));
        assert_eq!(values.player(Player::First).remaining_time, TimeDelta::seconds(45));
        assert_eq!(values.player(Player::Second).remaining_time, TimeDelta::seconds(60));
    }

    #[test]
    fn test_set_values_exhausted_elapses() {
        let mut clock = clock(60);
        let mut values = clock.values(at(0));
        values.players[0].remaining_time = TimeDelta::zero();

        clock.set_values(&values, at(3)).unwrap();
        assert_eq!(clock.state(), ClockState::Elapsed);
        assert_eq!(clock.elapsed(), Some((Player::First, at(3))));
        assert!(matches!(
            clock.set_values(&values, at(4)),
            Err(TimeControlError::InvalidState(_))
        ));
    }

    #[test]
    fn test_set_values_rejects_negative() {
        let mut clock = clock(60);
        let mut values = clock.values(at(0));
        values.players[1].remaining_time = TimeDelta::seconds(-1);
        assert!(matches!(
            clock.set_values(&values, at(0)),
            Err(TimeControlError::InvalidConfiguration(_))
        ));
        assert_eq!(clock.state(), ClockState::Ready);
    }
}
