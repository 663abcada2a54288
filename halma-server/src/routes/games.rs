//! Game API endpoints
//!
//! Commands name the acting player by id; the color comes from the game's
//! roster.

use super::ApiResult;
use crate::state::ServerState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use halma_core::{Color, FieldInfo, GameId, GameInfo, GamePlayer, PlayerId, Position};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Optional `?player=` used to fill in the asking player's color
#[derive(Deserialize)]
pub struct PlayerQuery {
    pub player: Option<PlayerId>,
}

#[derive(Deserialize)]
pub struct PlayerRequest {
    pub player: PlayerId,
}

#[derive(Deserialize)]
pub struct MoveRequest {
    pub player: PlayerId,
    pub from: Position,
    pub to: Position,
}

#[derive(Deserialize)]
pub struct FieldQuery {
    pub u: i8,
    pub v: i8,
}

#[derive(Serialize)]
pub struct TurnResponse {
    pub current_turn: Option<Color>,
}

#[derive(Serialize)]
pub struct DestinationsResponse {
    pub from: Position,
    pub destinations: Vec<Position>,
}

pub async fn list_games(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<PlayerQuery>,
) -> Json<Vec<GameInfo>> {
    Json(state.list_games(query.player))
}

pub async fn create_game(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<PlayerRequest>,
) -> ApiResult<GameInfo> {
    Ok(Json(state.create_game(req.player)?))
}

pub async fn get_game(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<GameId>,
    Query(query): Query<PlayerQuery>,
) -> ApiResult<GameInfo> {
    Ok(Json(state.game_info(id, query.player)?))
}

pub async fn get_fields(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<GameId>,
) -> ApiResult<Vec<FieldInfo>> {
    Ok(Json(state.fields(id)?))
}

pub async fn get_turn(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<GameId>,
) -> ApiResult<TurnResponse> {
    Ok(Json(TurnResponse {
        current_turn: state.current_turn(id)?,
    }))
}

pub async fn join_game(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<GameId>,
    Json(req): Json<PlayerRequest>,
) -> ApiResult<GamePlayer> {
    Ok(Json(state.join_game(id, req.player)?))
}

pub async fn start_game(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<GameId>,
    Json(req): Json<PlayerRequest>,
) -> ApiResult<GameInfo> {
    Ok(Json(state.start_game(id, req.player)?))
}

/// Apply a move; answers with the color to move next
pub async fn make_move(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<GameId>,
    Json(req): Json<MoveRequest>,
) -> ApiResult<TurnResponse> {
    let current_turn = state.move_piece(id, req.player, req.from, req.to)?;
    Ok(Json(TurnResponse { current_turn }))
}

/// Fields reachable from `?u=&v=`
pub async fn get_destinations(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<GameId>,
    Query(query): Query<FieldQuery>,
) -> ApiResult<DestinationsResponse> {
    let from = Position::new(query.u, query.v);
    Ok(Json(DestinationsResponse {
        from,
        destinations: state.destinations(id, from)?,
    }))
}
