use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::engine::Coord;

/// A snapshot that cannot be turned into a playable [`crate::engine::Board`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("board dimensions must be positive, got {width}x{height}")]
    Dimensions { width: i32, height: i32 },
    #[error("board {width}x{height} exceeds the {max}x{max} limit")]
    TooLarge { width: i32, height: i32, max: i32 },
    #[error("segment {segment} of snake '{snake}' at {coord} lies outside the {width}x{height} board")]
    OutOfBounds {
        snake: String,
        segment: usize,
        coord: Coord,
        width: i32,
        height: i32,
    },
    #[error("snake '{snake}' has no body")]
    EmptyBody { snake: String },
    #[error("snake '{snake}' has health {health}, expected 0..=100")]
    Health { snake: String, health: u32 },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has invalid value '{value}': {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Request failures surfaced to the caller instead of an empty 200.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("malformed request body: {0}")]
    Malformed(String),
    #[error(transparent)]
    InvalidBoard(#[from] BoardError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Malformed(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidBoard(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "rejecting request");
        let status = self.status();
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
