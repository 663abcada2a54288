//! Stern-Halma Core - Rules engine
//!
//! This crate provides the game logic for Stern-Halma (star Chinese checkers
//! for up to three players):
//! - Board geometry (star of 121 fields in cube coordinates)
//! - Move generation (single steps and chained jumps)
//! - Roster and color assignment
//! - Game state machine with win detection and turn order
//! - Observer contract for move and turn notifications

pub mod board;
pub mod error;
pub mod game;
pub mod moves;
pub mod observer;
pub mod roster;

// Re-exports for convenient access
pub use board::{Board, Color, Field, Position, BOARD_EXTENT, DIRECTIONS};
pub use error::{GameError, MoveError};
pub use game::{FieldInfo, Game, GameInfo, GameState};
pub use moves::possible_destinations;
pub use observer::{GameEvent, GameObserver, NotifyError, ObserverId, Observers};
pub use roster::{GameId, GamePlayer, PlayerId, Roster, MAX_PLAYERS};
