//! Audit logging middleware.
//!
//! Logs every API request with method, path, response status and the
//! caller's user id when authenticated. Runs innermost, after auth has
//! injected the `Caller`.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::authorization::Caller;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let caller = req.extensions().get::<Caller>().copied();

    let response = next.run(req).await;
    let status = response.status().as_u16();

    match caller {
        Some(caller) => tracing::info!(
            target: "dispensary_lib::audit",
            %method,
            %path,
            status,
            user_id = %caller.user_id,
            role = %caller.role,
            "API access"
        ),
        None => tracing::info!(
            target: "dispensary_lib::audit",
            %method,
            %path,
            status,
            "API access"
        ),
    }

    response
}
