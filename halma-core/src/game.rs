//! Game state machine: start, moves, win detection and turn order

use crate::board::{Board, Color, Position};
use crate::error::{GameError, MoveError};
use crate::moves::possible_destinations;
use crate::observer::{GameObserver, ObserverId, Observers};
use crate::roster::{GameId, GamePlayer, PlayerId, Roster};
use rand::Rng;
use serde::{Deserialize, Serialize};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Lifecycle of a game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameState {
    /// Players may join; no board yet
    New,
    /// Board laid out, moves accepted
    Running,
    /// Someone has won
    Done,
}

/// One field of a board snapshot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub pos: Position,
    pub occupant: Option<Color>,
}

/// Summary of a game as seen by one player
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInfo {
    pub id: GameId,
    pub state: GameState,
    pub current_turn: Option<Color>,
    pub players: usize,
    /// Color of the asking player, if seated
    pub player_color: Option<Color>,
}

// ============================================================================
// GAME
// ============================================================================

/// A single game of Stern-Halma
#[derive(Debug)]
pub struct Game {
    id: GameId,
    state: GameState,
    board: Board,
    current_turn: Option<Color>,
    roster: Roster,
    observers: Observers,
    /// Observers dropped by a broadcast, not yet collected
    dropped_observers: Vec<ObserverId>,
}

impl Game {
    pub fn new(id: GameId) -> Self {
        Self {
            id,
            state: GameState::New,
            board: Board::empty(),
            current_turn: None,
            roster: Roster::new(id),
            observers: Observers::default(),
            dropped_observers: Vec::new(),
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Color to move; None before the start and after a win
    pub fn current_turn(&self) -> Option<Color> {
        self.current_turn
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Snapshot of every field and its pin
    pub fn fields(&self) -> Vec<FieldInfo> {
        self.board
            .fields()
            .map(|(pos, field)| FieldInfo {
                pos,
                occupant: field.occupant,
            })
            .collect()
    }

    pub fn info(&self, player: Option<PlayerId>) -> GameInfo {
        GameInfo {
            id: self.id,
            state: self.state,
            current_turn: self.current_turn,
            players: self.roster.len(),
            player_color: player.and_then(|player| self.player_color(player)),
        }
    }

    // ========================================================================
    // ROSTER
    // ========================================================================

    /// Color the next player would get; None once started or full
    pub fn free_color(&self) -> Option<Color> {
        if self.state != GameState::New || self.roster.is_full() {
            return None;
        }
        self.roster.free_color()
    }

    /// Seat a player; None once every color is taken or the game has started
    pub fn join(&mut self, player: PlayerId) -> Option<GamePlayer> {
        if self.state != GameState::New {
            return None;
        }
        let seat = self.roster.join(player)?;
        tracing::info!("Player {} joined game {} as {}", player, self.id, seat.color);
        Some(seat)
    }

    pub fn get_player(&self, player: PlayerId) -> Option<&GamePlayer> {
        self.roster.get(player)
    }

    pub fn player_color(&self, player: PlayerId) -> Option<Color> {
        self.roster.color_of(player)
    }

    // ========================================================================
    // OBSERVERS
    // ========================================================================

    pub fn add_observer(&mut self, observer: Box<dyn GameObserver>) -> ObserverId {
        self.observers.add(observer)
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Ids of observers removed for failing a notification since the last call
    pub fn take_dropped_observers(&mut self) -> Vec<ObserverId> {
        std::mem::take(&mut self.dropped_observers)
    }

    // ========================================================================
    // START
    // ========================================================================

    /// Lay out the board for the seated players and draw the first color.
    pub fn start<R: Rng>(&mut self, rng: &mut R) -> Result<Color, GameError> {
        if self.state != GameState::New {
            return Err(GameError::AlreadyStarted);
        }
        if self.roster.is_empty() {
            return Err(GameError::NoPlayers);
        }

        let first = rng.gen_range(1..=self.roster.len());
        let first = Color::from_ordinal(first).ok_or(GameError::NoPlayers)?;

        self.board = Board::build(self.roster.len());
        self.current_turn = Some(first);
        self.state = GameState::Running;

        tracing::info!(
            "Game {} started with {} players, {} moves first",
            self.id,
            self.roster.len(),
            first
        );
        Ok(first)
    }

    // ========================================================================
    // MOVES
    // ========================================================================

    /// Fields the pin on `from` can reach this turn
    pub fn possible_destinations(&self, from: Position) -> Vec<Position> {
        if !self.board.is_occupied(from) {
            return Vec::new();
        }
        possible_destinations(&self.board, from)
    }

    /// Every (from, to) move available to `color`, ignoring whose turn it is
    pub fn legal_moves(&self, color: Color) -> Vec<(Position, Position)> {
        self.board
            .fields()
            .filter(|(_, field)| field.occupant == Some(color))
            .flat_map(|(from, _)| {
                possible_destinations(&self.board, from)
                    .into_iter()
                    .map(move |to| (from, to))
            })
            .collect()
    }

    /// Move the `color` pin on `from` to `to`.
    ///
    /// On success returns the color to move next (None if `color` just won)
    /// and notifies every observer. A rejected move changes nothing and
    /// notifies nobody.
    pub fn move_piece(
        &mut self,
        color: Color,
        from: Position,
        to: Position,
    ) -> Result<Option<Color>, MoveError> {
        if let Err(err) = self.check_move(color, from, to) {
            tracing::debug!("Game {}: rejected move {} -> {}: {}", self.id, from, to, err);
            return Err(err);
        }

        let pin = self.board.occupant(from);
        self.board.set_occupant(from, None);
        self.board.set_occupant(to, pin);

        if self.check_winner(color) {
            self.current_turn = None;
            self.state = GameState::Done;
            tracing::info!("Game {} won by {}", self.id, color);
        } else {
            self.current_turn = Some(self.roster.next_color(color));
        }

        let dropped = self
            .observers
            .broadcast_move(color, from, to, self.current_turn);
        self.dropped_observers.extend(dropped);

        Ok(self.current_turn)
    }

    fn check_move(&self, color: Color, from: Position, to: Position) -> Result<(), MoveError> {
        if self.state != GameState::Running {
            return Err(MoveError::NotRunning);
        }
        if self.current_turn != Some(color) {
            return Err(MoveError::NotYourTurn(color));
        }
        for pos in [from, to] {
            if !self.board.is_valid(pos) {
                return Err(MoveError::InvalidField(pos));
            }
        }
        if self.board.occupant(from) != Some(color) {
            return Err(MoveError::NotYourPiece { color, from });
        }
        if !possible_destinations(&self.board, from).contains(&to) {
            return Err(MoveError::Unreachable { from, to });
        }
        Ok(())
    }

    /// True iff every home field of `color` holds a `color` pin
    pub fn check_winner(&self, color: Color) -> bool {
        self.board
            .fields()
            .filter(|(_, field)| field.home_owner == Some(color))
            .all(|(_, field)| field.occupant == Some(color))
    }
}

// ============================================================================
// TESTS
// ============================================================================
