//! Liveness endpoint.

/// `GET /`: plain-text liveness line.
pub async fn root() -> &'static str {
    "Dispensary backend is running!"
}
