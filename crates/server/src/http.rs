//! HTTP routes
//!
//! `POST /v1/turn` is the single inbound operation; everything else is
//! operational surface.

use std::time::Instant;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use frontdesk_core::{TurnInput, TurnOutcome};

use crate::state::AppState;

/// Build the service router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/turn", post(process_turn))
        .route("/v1/call/:call_id", delete(end_call))
        .route("/health", get(health))
        .route("/admin/reload", post(reload))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct TurnRequest {
    call_id: String,
    company_id: String,
    turn_index: u32,
    raw_text: String,
}

async fn process_turn(
    State(state): State<AppState>,
    Json(request): Json<TurnRequest>,
) -> Json<TurnOutcome> {
    let started = Instant::now();
    let outcome = state
        .runner
        .process_turn(TurnInput {
            call_id: request.call_id,
            company_id: request.company_id,
            turn_index: request.turn_index,
            raw_text: request.raw_text,
        })
        .await;

    metrics::counter!("frontdesk_turns_total").increment(1);
    metrics::histogram!("frontdesk_turn_duration_seconds")
        .record(started.elapsed().as_secs_f64());

    Json(outcome)
}

#[derive(Debug, Serialize)]
struct EndCallResponse {
    ended: bool,
}

async fn end_call(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
) -> Json<EndCallResponse> {
    let ended = state.runner.end_call(&call_id);
    metrics::counter!("frontdesk_calls_ended_total").increment(1);
    Json(EndCallResponse { ended })
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    active_calls: usize,
    companies: Vec<String>,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        active_calls: state.runner.active_calls(),
        companies: state.config_store.known_companies(),
    })
}

async fn reload(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    state.reload_config();
    tracing::info!("Company configuration reload requested");
    (
        StatusCode::OK,
        Json(serde_json::json!({ "reloaded": true })),
    )
}
