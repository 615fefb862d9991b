//! Bearer token authentication and role guards.
//!
//! `require_auth` extracts `Authorization: Bearer <token>`, verifies it
//! with the server's `TokenSigner` and injects a [`Caller`] into request
//! extensions. The role guards run after it and only read that `Caller`.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::authorization::{self, Caller};
use crate::models::Role;

/// Require a valid bearer token.
///
/// Accesses `ApiContext` from request extensions (injected by Extension layer).
pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_auth_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_auth_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::Unauthorized)?;

    let claims = ctx.core.tokens().verify(token).map_err(|e| {
        tracing::debug!(error = %e, "Bearer token rejected");
        ApiError::InvalidToken(e)
    })?;

    req.extensions_mut()
        .insert(Caller::new(claims.user_id, claims.role));

    Ok(next.run(req).await)
}

pub async fn require_doctor(req: Request<axum::body::Body>, next: Next) -> Response {
    guard_role(req, next, Role::Doctor, "Access denied. Doctor role required.").await
}

pub async fn require_patient(req: Request<axum::body::Body>, next: Next) -> Response {
    guard_role(req, next, Role::Patient, "Access denied. Patient role required.").await
}

async fn guard_role(
    req: Request<axum::body::Body>,
    next: Next,
    role: Role,
    denial: &'static str,
) -> Response {
    let allowed = req
        .extensions()
        .get::<Caller>()
        .is_some_and(|caller| authorization::require_role(caller, role).allowed);

    if allowed {
        next.run(req).await
    } else {
        ApiError::Forbidden(denial.into()).into_response()
    }
}
