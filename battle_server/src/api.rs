//! Battlesnake JSON payloads.
//!
//! Request types accept the full game-engine payload; only the fields the move engine reads are
//! required; the rest default when missing.

use serde::{Deserialize, Serialize};

use crate::engine::{Board, Coord, Direction, Snake};
use crate::error::BoardError;

// =============================================================================
// Requests
// =============================================================================

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiPosition {
    pub x: i32,
    pub y: i32,
}

impl From<ApiPosition> for Coord {
    fn from(p: ApiPosition) -> Self {
        Coord::new(p.x, p.y)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiSnake {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub health: u32,
    pub body: Vec<ApiPosition>,
    #[serde(default)]
    pub length: usize,
    #[serde(default)]
    pub shout: Option<String>,
}

impl ApiSnake {
    pub fn to_snake(&self) -> Result<Snake, BoardError> {
        let body = self.body.iter().copied().map(Coord::from).collect();
        Snake::new(self.id.clone(), self.health, body)
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ApiRuleset {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ApiGame {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub ruleset: Option<ApiRuleset>,
    #[serde(default)]
    pub timeout: Option<u32>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiBoard {
    pub height: i32,
    pub width: i32,
    #[serde(default)]
    pub food: Vec<ApiPosition>,
    #[serde(default)]
    pub hazards: Vec<ApiPosition>,
    pub snakes: Vec<ApiSnake>,
}

/// Body of `/start`, `/move` and `/end`.
#[derive(Deserialize, Debug, Clone)]
pub struct GameRequest {
    #[serde(default)]
    pub game: ApiGame,
    #[serde(default)]
    pub turn: u32,
    pub board: ApiBoard,
    pub you: ApiSnake,
}

impl GameRequest {
    /// Validate the snapshot and convert it into an engine [`Board`].
    pub fn to_board(&self) -> Result<Board, BoardError> {
        let snakes = self
            .board
            .snakes
            .iter()
            .map(ApiSnake::to_snake)
            .collect::<Result<Vec<_>, _>>()?;
        let you = self.you.to_snake()?;
        Board::new(self.board.width, self.board.height, snakes, you)
    }
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct MoveResponse {
    pub r#move: Direction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shout: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct InfoResponse {
    pub apiversion: String,
    pub author: String,
    pub color: String,
    pub head: String,
    pub tail: String,
    pub version: String,
}

/// Customization reply to `/start`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub color: String,
    pub head_type: String,
    pub tail_type: String,
}

/// `{}` for `/ping` and `/end`.
#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptyResponse {}
