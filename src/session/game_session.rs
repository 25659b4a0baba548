//! A single game and its clock, with seated players.

use super::{PlayerId, SessionError, SessionId};
use hex_engine::{
    ClockState, Game, GameData, GameEvent, GameState, Move, MoveReport, Player, TimeControl,
    TimeControlEvent, TimeControlType, TimeControlValues, create_time_control,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{Receiver, Sender, channel};
use tracing::{debug, info, instrument, warn};

/// Settings of a new game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameOptions {
    /// Board side length.
    pub board_size: usize,
    /// Whether the swap-pieces rule is enabled.
    pub allow_swap: bool,
    /// Clock configuration.
    pub time_control: TimeControlType,
}

impl From<&crate::ArenaConfig> for GameOptions {
    fn from(config: &crate::ArenaConfig) -> Self {
        Self {
            board_size: *config.board_size(),
            allow_swap: *config.allow_swap(),
            time_control: *config.time_control(),
        }
    }
}

/// Event relayed to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionEvent {
    /// A player took a seat.
    PlayerJoined {
        /// Player id.
        player_id: PlayerId,
        /// Seat taken.
        seat: Player,
    },
    /// Game event.
    Game(GameEvent),
    /// Clock event.
    Clock(TimeControlEvent),
}

/// Result of an accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// What the move did.
    pub report: MoveReport,
    /// Game state after the move.
    pub state: GameState,
    /// Clock values after the move.
    pub clock: TimeControlValues,
}

/// Saved clock: configuration and values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeControlSnapshot {
    /// Clock configuration.
    pub control: TimeControlType,
    /// Remaining times.
    pub values: TimeControlValues,
}

/// Saved session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Game data.
    pub game: GameData,
    /// Clock data.
    pub time_control: TimeControlSnapshot,
    /// Seated player ids, indexed by seat.
    pub players: [Option<PlayerId>; 2],
}

/// One game with its clock and seats.
///
/// Engine events are funneled into a channel owned by the session and
/// drained by the host after each operation.
#[derive(Debug)]
pub struct GameSession {
    id: SessionId,
    game: Game,
    clock: Box<dyn TimeControl>,
    players: [Option<PlayerId>; 2],
    events_tx: Sender<SessionEvent>,
    events_rx: Receiver<SessionEvent>,
}

impl GameSession {
    /// Creates a session for a new game.
    #[instrument(skip(options), fields(board_size = options.board_size))]
    pub fn new(id: SessionId, options: &GameOptions, at: DateTime<Utc>) -> Result<Self, SessionError> {
        let mut game = Game::try_new_at(options.board_size, at).map_err(|e| {
            warn!(error = %e, "Rejected board size");
            SessionError::InvalidOptions(e.to_string())
        })?;
        game.set_allow_swap(options.allow_swap);
        let clock = create_time_control(&options.time_control, None, at)?;

        info!(session_id = %id, "Creating new game session");
        Ok(Self::assemble(id, game, clock, [None, None]))
    }

    /// Rebuilds a session from a snapshot.
    ///
    /// A clock that was running resumes at `at` for the player on turn.
    /// If the restored values are already exhausted the flagged player
    /// loses by resignation.
    #[instrument(skip(snapshot))]
    pub fn restore(
        id: SessionId,
        snapshot: &SessionSnapshot,
        at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let game = Game::from_data(&snapshot.game)?;
        let clock = create_time_control(&snapshot.time_control.control, None, at)?;
        let mut session = Self::assemble(id, game, clock, snapshot.players.clone());

        session.clock.set_values(&snapshot.time_control.values, at)?;
        session.expire(at)?;
        if session.game.is_playing() && session.is_full() {
            let player = session.game.current_player();
            session.clock.start(player, at)?;
        }

        info!(session_id = %session.id, state = %session.game.state(), "Session restored");
        Ok(session)
    }

    fn assemble(
        id: SessionId,
        mut game: Game,
        mut clock: Box<dyn TimeControl>,
        players: [Option<PlayerId>; 2],
    ) -> Self {
        let (events_tx, events_rx) = channel();

        let tx = events_tx.clone();
        game.on_event(Box::new(move |event| {
            // The receiver lives as long as the session.
            let _ = tx.send(SessionEvent::Game(event.clone()));
        }));
        let tx = events_tx.clone();
        clock.on_event(Box::new(move |event| {
            let _ = tx.send(SessionEvent::Clock(*event));
        }));

        Self {
            id,
            game,
            clock,
            players,
            events_tx,
            events_rx,
        }
    }

    /// Returns the session id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the game.
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Returns the clock.
    pub fn clock(&self) -> &dyn TimeControl {
        self.clock.as_ref()
    }

    /// Returns the seated player ids.
    pub fn players(&self) -> &[Option<PlayerId>; 2] {
        &self.players
    }

    fn is_full(&self) -> bool {
        self.players.iter().all(Option::is_some)
    }

    fn seat_of(&self, player_id: &str) -> Result<Player, SessionError> {
        Player::BOTH
            .into_iter()
            .find(|seat| self.players[seat.index()].as_deref() == Some(player_id))
            .ok_or_else(|| {
                warn!(player_id, "Unknown player");
                SessionError::PlayerNotFound {
                    game: self.id.clone(),
                    player: player_id.to_string(),
                }
            })
    }

    /// Seats a player. Returns `false` if they were already seated.
    ///
    /// Filling the second seat starts player 0's clock.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn join(&mut self, player_id: &str, at: DateTime<Utc>) -> Result<bool, SessionError> {
        if self.seat_of(player_id).is_ok() {
            debug!("Player already seated");
            return Ok(false);
        }
        let seat = Player::BOTH
            .into_iter()
            .find(|seat| self.players[seat.index()].is_none())
            .ok_or_else(|| {
                warn!("Session already has 2 players");
                SessionError::GameFull(self.id.clone())
            })?;

        self.players[seat.index()] = Some(player_id.to_string());
        info!(seat = %seat, "Player joined");
        let _ = self.events_tx.send(SessionEvent::PlayerJoined {
            player_id: player_id.to_string(),
            seat,
        });

        if self.is_full() && self.game.is_playing() && self.clock.state() == ClockState::Ready {
            let player = self.game.current_player();
            self.clock.start(player, at)?;
        }
        Ok(true)
    }

    /// Plays a move for a seated player.
    ///
    /// The move's `played_at` is the clock instant. It must not precede the
    /// previous move (or the game start for the first move).
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn submit_move(&mut self, player_id: &str, mv: Move) -> Result<MoveOutcome, SessionError> {
        let seat = self.seat_of(player_id)?;
        if !self.is_full() {
            warn!("Move before both players joined");
            return Err(SessionError::GameNotStarted(self.id.clone()));
        }

        let at = mv.played_at();
        let previous = self
            .game
            .last_move_at()
            .unwrap_or_else(|| self.game.started_at());
        if at < previous {
            warn!(played_at = %at, previous = %previous, "Move dated before the previous one");
            return Err(SessionError::MoveOutOfOrder {
                game: self.id.clone(),
                played_at: at,
                previous,
            });
        }

        if let Some(flagged) = self.expire(at)? {
            return Err(SessionError::TimeElapsed(flagged));
        }

        let report = self.game.make_move(mv, seat)?;
        if report.winner.is_some() {
            self.stop_clock(at)?;
        } else {
            self.clock.switch_player(at)?;
        }

        Ok(MoveOutcome {
            report,
            state: self.game.state(),
            clock: self.clock.values(at),
        })
    }

    /// Resigns for a seated player.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn resign(&mut self, player_id: &str, at: DateTime<Utc>) -> Result<(), SessionError> {
        let seat = self.seat_of(player_id)?;
        if let Some(flagged) = self.expire(at)? {
            return Err(SessionError::TimeElapsed(flagged));
        }
        self.game.resign(seat, at)?;
        self.stop_clock(at)
    }

    /// Cancels the game.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn cancel(&mut self, at: DateTime<Utc>) -> Result<(), SessionError> {
        if let Some(flagged) = self.expire(at)? {
            return Err(SessionError::TimeElapsed(flagged));
        }
        self.game.cancel(at)?;
        self.stop_clock(at)
    }

    /// Settles the clock; a flagged player resigns at the exhaustion instant.
    ///
    /// Returns the flagged player if the game ended now.
    pub fn expire(&mut self, at: DateTime<Utc>) -> Result<Option<Player>, SessionError> {
        if !self.game.is_playing() || self.clock.tick(at) != ClockState::Elapsed {
            return Ok(None);
        }
        let Some((flagged, when)) = self.clock.elapsed() else {
            return Ok(None);
        };

        info!(session_id = %self.id, player = %flagged, "Time elapsed, forcing resignation");
        self.game.resign(flagged, when)?;
        Ok(Some(flagged))
    }

    fn stop_clock(&mut self, at: DateTime<Utc>) -> Result<(), SessionError> {
        if self.clock.state() == ClockState::Running {
            self.clock.pause(at)?;
        }
        Ok(())
    }

    /// Captures the session, settling the clock up to `at`.
    pub fn snapshot(&mut self, at: DateTime<Utc>) -> Result<SessionSnapshot, SessionError> {
        self.expire(at)?;
        Ok(SessionSnapshot {
            game: self.game.to_data(),
            time_control: TimeControlSnapshot {
                control: self.clock.config(),
                values: self.clock.values(at),
            },
            players: self.players.clone(),
        })
    }

    /// Takes the events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.events_rx.try_iter().collect()
    }
}
