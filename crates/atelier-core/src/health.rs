use axum::http::StatusCode;

/// Handler for `GET /healthz`. Liveness only; dependencies are not checked.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Map a readiness check result to the status returned by `GET /readyz`.
pub fn readiness<E: std::fmt::Display>(check: Result<(), E>) -> StatusCode {
    match check {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
