//! Checkout session routes.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use serde::Serialize;

use crate::{adapters::http::app_state::AppState, app_error::AppResult};

#[derive(Serialize)]
struct SessionResponse {
    id: String,
}

/// POST /subscriptions/session-create
/// Create a checkout session for a new auto-trial subscription.
async fn session_create(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let session = app_state.checkout_use_cases.create_trial_session().await?;

    Ok(Json(SessionResponse { id: session.id }))
}

/// POST /subscriptions/session-update
/// Create a checkout session for a full subscription, carrying over an
/// existing trial window when there is one.
async fn session_update(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let session = app_state
        .checkout_use_cases
        .create_upgrade_session()
        .await?;

    Ok(Json(SessionResponse { id: session.id }))
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/session-create", post(session_create))
        .route("/session-update", post(session_update))
}
