//! Board geometry endpoint

use axum::Json;
use halma_core::{Board, Color, Position, BOARD_EXTENT, DIRECTIONS, MAX_PLAYERS};
use serde::Serialize;

#[derive(Serialize)]
pub struct BoardField {
    pub pos: Position,
    /// Triangle owner with every color in play
    pub home_owner: Option<Color>,
}

#[derive(Serialize)]
pub struct BoardInfo {
    pub extent: i8,
    pub fields: Vec<BoardField>,
    pub directions: Vec<[i8; 2]>,
}

/// Get board geometry
pub async fn get_board() -> Json<BoardInfo> {
    let board = Board::build(MAX_PLAYERS);
    Json(BoardInfo {
        extent: BOARD_EXTENT,
        fields: board
            .fields()
            .map(|(pos, field)| BoardField {
                pos,
                home_owner: field.home_owner,
            })
            .collect(),
        directions: DIRECTIONS.iter().map(|&(u, v)| [u, v]).collect(),
    })
}
