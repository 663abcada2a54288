//! Rejection reasons for game commands
//!
//! A rejected command never changes the game.

use crate::board::{Color, Position};

/// Why a move was not applied
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("game is not running")]
    NotRunning,

    #[error("it is not {0}'s turn")]
    NotYourTurn(Color),

    #[error("no field at {0}")]
    InvalidField(Position),

    #[error("no {color} pin at {from}")]
    NotYourPiece { color: Color, from: Position },

    #[error("{to} cannot be reached from {from}")]
    Unreachable { from: Position, to: Position },
}

/// Why a game could not be started
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("game has already been started")]
    AlreadyStarted,

    #[error("game has no players")]
    NoPlayers,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_error_display() {
        let err = MoveError::Unreachable {
            from: Position::new(-4, 4),
            to: Position::new(0, 0),
        };
        assert_eq!(err.to_string(), "(0, 0) cannot be reached from (-4, 4)");

        let err = MoveError::NotYourPiece {
            color: Color::Green,
            from: Position::new(1, 2),
        };
        assert_eq!(err.to_string(), "no green pin at (1, 2)");
    }

    #[test]
    fn test_game_error_display() {
        assert_eq!(GameError::NoPlayers.to_string(), "game has no players");
    }
}
