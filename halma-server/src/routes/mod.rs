//! HTTP route handlers

pub mod board;
pub mod games;
pub mod players;
pub mod status;
pub mod watch;

use crate::state::RegistryError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Registry error rendered as a JSON body with a matching status code
#[derive(Debug)]
pub struct ApiError(pub RegistryError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            RegistryError::EmptyName | RegistryError::Move(_) => StatusCode::BAD_REQUEST,
            RegistryError::BadCredentials => StatusCode::UNAUTHORIZED,
            RegistryError::NotSeated { .. } => StatusCode::FORBIDDEN,
            RegistryError::UnknownPlayer(_)
            | RegistryError::UnknownGame(_)
            | RegistryError::UnknownWatcher { .. } => StatusCode::NOT_FOUND,
            RegistryError::NameTaken(_) | RegistryError::GameFull(_) | RegistryError::Game(_) => {
                StatusCode::CONFLICT
            }
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;
