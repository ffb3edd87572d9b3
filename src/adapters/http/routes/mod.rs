pub mod subscriptions;
pub mod webhook;

use axum::Router;

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/subscriptions", subscriptions::router())
        .nest("/webhook", webhook::router())
}
