//! Event watchers
//!
//! A watcher is a bounded queue attached to one game. Clients long-poll it.
//! A watcher that falls too far behind is dropped along with its queue; a
//! poll already waiting on it reports `closed`, later polls get 404.

use super::ApiResult;
use crate::state::ServerState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use halma_core::{GameEvent, GameId, ObserverId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc::error::TryRecvError;

#[derive(Serialize)]
pub struct WatchResponse {
    pub watcher: ObserverId,
}

#[derive(Deserialize)]
pub struct EventsQuery {
    pub watcher: ObserverId,
}

#[derive(Serialize)]
pub struct EventsResponse {
    pub events: Vec<GameEvent>,
    /// The queue is gone; the watcher must register again
    pub closed: bool,
}

#[derive(Serialize)]
pub struct UnwatchResponse {
    pub removed: bool,
}

pub async fn watch_game(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<GameId>,
) -> ApiResult<WatchResponse> {
    Ok(Json(WatchResponse {
        watcher: state.watch(id)?,
    }))
}

/// Long-poll for events
///
/// Waits up to the configured poll timeout for the first event, then drains
/// whatever else is queued.
pub async fn poll_events(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<GameId>,
    Query(query): Query<EventsQuery>,
) -> ApiResult<EventsResponse> {
    let receiver = state.watcher(id, query.watcher)?;
    let mut queue = receiver.lock().await;

    let mut events = Vec::new();
    let mut closed = false;
    match tokio::time::timeout(state.poll_timeout(), queue.recv()).await {
        Ok(Some(event)) => {
            events.push(event);
            loop {
                match queue.try_recv() {
                    Ok(event) => events.push(event),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        closed = true;
                        break;
                    }
                }
            }
        }
        Ok(None) => closed = true,
        // Timed out
        Err(_) => {}
    }
    drop(queue);

    if closed {
        state.forget_watcher(id, query.watcher);
    }
    Ok(Json(EventsResponse { events, closed }))
}

pub async fn unwatch_game(
    State(state): State<Arc<ServerState>>,
    Path((id, watcher)): Path<(GameId, ObserverId)>,
) -> ApiResult<UnwatchResponse> {
    Ok(Json(UnwatchResponse {
        removed: state.unwatch(id, watcher)?,
    }))
}
