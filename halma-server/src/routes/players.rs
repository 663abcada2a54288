//! Player registration and login

use super::ApiResult;
use crate::state::{Player, ServerState};
use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct Credentials {
    pub name: String,
    #[serde(default)]
    pub password: String,
}

pub async fn register(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<Credentials>,
) -> ApiResult<Player> {
    Ok(Json(state.players.register(&req.name, &req.password)?))
}

pub async fn login(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<Credentials>,
) -> ApiResult<Player> {
    Ok(Json(state.players.login(&req.name, &req.password)?))
}
