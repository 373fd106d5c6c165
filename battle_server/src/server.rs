use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tracing::{debug, info};

use crate::api::{EmptyResponse, GameRequest, InfoResponse, MoveResponse, StartResponse};
use crate::config::{Appearance, Config};
use crate::engine::MoveEngine;
use crate::error::ApiError;

const FORCED_SHOUT: &str = "no way out";

/// Everything a handler needs, built once in `main` and cloned per request.
#[derive(Clone)]
pub struct AppState {
    engine: MoveEngine,
    appearance: Arc<Appearance>,
}

impl AppState {
    pub fn new(engine: MoveEngine, appearance: Appearance) -> Self {
        AppState {
            engine,
            appearance: Arc::new(appearance),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(MoveEngine::new(config.engine), config.appearance.clone())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_info))
        .route("/start", post(handle_start))
        .route("/ping", post(handle_ping))
        .route("/move", post(handle_move))
        .route("/end", post(handle_end))
        .with_state(state)
}

pub async fn serve(config: Config) -> anyhow::Result<()> {
    let app = router(AppState::from_config(&config));

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!(addr = %listener.local_addr()?, "battle server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn handle_info(State(state): State<AppState>) -> Json<InfoResponse> {
    let appearance = &state.appearance;
    Json(InfoResponse {
        apiversion: "1".into(),
        author: appearance.author.clone(),
        color: appearance.color.clone(),
        head: appearance.head.clone(),
        tail: appearance.tail.clone(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

async fn handle_start(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<StartResponse>, ApiError> {
    let Json(body) = payload.map_err(malformed)?;
    info!(game = game_id(&body), "/start called");
    debug!(%body, "start payload");

    let response = StartResponse {
        color: state.appearance.color.clone(),
        head_type: state.appearance.head.clone(),
        tail_type: state.appearance.tail.clone(),
    };
    info!(?response, "responding");
    Ok(Json(response))
}

async fn handle_ping() -> Json<EmptyResponse> {
    info!("/ping called");
    Json(EmptyResponse {})
}

async fn handle_move(
    State(state): State<AppState>,
    payload: Result<Json<GameRequest>, JsonRejection>,
) -> Result<Json<MoveResponse>, ApiError> {
    let Json(req) = payload.map_err(malformed)?;
    info!(game = %req.game.id, turn = req.turn, "/move called");
    debug!(?req, "move payload");

    let board = req.to_board()?;
    let decision = state.engine.decide(&board, &mut rand::rng());

    let response = MoveResponse {
        r#move: decision.direction,
        shout: decision.forced.then(|| FORCED_SHOUT.to_string()),
    };
    info!(
        game = %req.game.id,
        turn = req.turn,
        direction = %decision.direction,
        danger = %decision.danger,
        forced = decision.forced,
        "responding"
    );
    Ok(Json(response))
}

async fn handle_end(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<EmptyResponse>, ApiError> {
    let Json(body) = payload.map_err(malformed)?;
    info!(game = game_id(&body), "/end called");
    Ok(Json(EmptyResponse {}))
}

fn malformed(rejection: JsonRejection) -> ApiError {
    ApiError::Malformed(rejection.body_text())
}

fn game_id(body: &Value) -> &str {
    body.pointer("/game/id").and_then(Value::as_str).unwrap_or("")
}
