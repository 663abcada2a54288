//! Bounded per-watcher event queues
//!
//! The game pushes into the queue while locked, so pushing never waits: a
//! full queue reports back and the game drops the watcher.

use halma_core::{Color, GameEvent, GameObserver, NotifyError, Position};
use tokio::sync::mpsc::{self, error::TrySendError};

pub type EventReceiver = mpsc::Receiver<GameEvent>;

/// Observer that forwards notifications into a bounded channel
pub struct QueueObserver {
    sender: mpsc::Sender<GameEvent>,
}

impl QueueObserver {
    fn push(&self, event: GameEvent) -> Result<(), NotifyError> {
        self.sender.try_send(event).map_err(|err| match err {
            TrySendError::Full(_) => NotifyError::Full,
            TrySendError::Closed(_) => NotifyError::Disconnected,
        })
    }
}

impl GameObserver for QueueObserver {
    fn notify_move(&self, color: Color, from: Position, to: Position) -> Result<(), NotifyError> {
        self.push(GameEvent::Move { color, from, to })
    }

    fn notify_turn(&self, current: Option<Color>) -> Result<(), NotifyError> {
        self.push(GameEvent::Turn { current })
    }
}

/// Create an observer and the receiving end of its queue
pub fn event_queue(capacity: usize) -> (QueueObserver, EventReceiver) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (QueueObserver { sender }, receiver)
}
