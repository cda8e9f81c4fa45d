use axum::extract::State;
use axum::http::StatusCode;

use atelier_core::health::readiness;

use crate::state::AppState;

/// `GET /readyz`: 200 once the database answers a ping.
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    readiness(state.db.ping().await)
}
