//! Notifications from a game to whoever is watching it

use crate::board::{Color, Position};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Something that happened in a game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// A legal move was applied
    Move {
        color: Color,
        from: Position,
        to: Position,
    },
    /// Whose turn it is now; None once the game is over
    Turn { current: Option<Color> },
}

/// Why an observer could not take a notification
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    #[error("observer queue is full")]
    Full,
    #[error("observer is disconnected")]
    Disconnected,
}

/// Receiver of game notifications.
///
/// Called with the game locked, so implementations must not block. An
/// observer that returns an error is removed from the game.
pub trait GameObserver: Send + Sync {
    fn notify_move(&self, color: Color, from: Position, to: Position) -> Result<(), NotifyError>;

    fn notify_turn(&self, current: Option<Color>) -> Result<(), NotifyError>;
}

/// Handle for removing an observer again
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObserverId(pub u64);

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Observers of one game, in registration order
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    entries: Vec<(ObserverId, Box<dyn GameObserver>)>,
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.entries.len())
            .finish()
    }
}

impl Observers {
    pub fn add(&mut self, observer: Box<dyn GameObserver>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    /// Returns false if `id` was not registered
    pub fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deliver a move and the following turn to every observer.
    ///
    /// Observers that fail either notification are dropped; their ids are
    /// returned.
    pub fn broadcast_move(
        &mut self,
        color: Color,
        from: Position,
        to: Position,
        current: Option<Color>,
    ) -> Vec<ObserverId> {
        let mut dropped = Vec::new();

        self.entries.retain(|(id, observer)| {
            let delivered = observer
                .notify_move(color, from, to)
                .and_then(|()| observer.notify_turn(current));
            match delivered {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!("Dropping observer {}: {}", id, err);
                    dropped.push(*id);
                    false
                }
            }
        });

        dropped
    }
}
