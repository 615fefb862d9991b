//! Registration and login.
//!
//! Both hash or verify a password, so the work runs on the blocking pool.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, Message};
use crate::clinic::accounts::{self, Credentials, Registration, Session};
use crate::models::User;

#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub user: User,
}

/// `POST /api/auth/register`: create an account.
pub async fn register(
    State(ctx): State<ApiContext>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> Result<(StatusCode, Json<Message<RegisteredUser>>), ApiError> {
    let Json(input) = payload?;
    let core = ctx.core.clone();

    let user = tokio::task::spawn_blocking(move || -> Result<User, ApiError> {
        let conn = core.open_db()?;
        Ok(accounts::register(&conn, &input, core.password_cost)?)
    })
    .await??;

    Ok((
        StatusCode::CREATED,
        Json(Message::new("User registered successfully", RegisteredUser { user })),
    ))
}

/// `POST /api/auth/login`: exchange credentials for a bearer token.
pub async fn login(
    State(ctx): State<ApiContext>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<Message<Session>>, ApiError> {
    let Json(input) = payload?;
    let core = ctx.core.clone();

    let session = tokio::task::spawn_blocking(move || -> Result<Session, ApiError> {
        let conn = core.open_db()?;
        Ok(accounts::login(&conn, core.tokens(), &input)?)
    })
    .await??;

    Ok(Json(Message::new("Logged in successfully", session)))
}
