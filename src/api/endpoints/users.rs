//! The caller's own account.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, Message};
use crate::authorization::Caller;
use crate::clinic::accounts::{self, ProfileUpdate};
use crate::models::UserWithProfile;

#[derive(Debug, Serialize)]
pub struct UpdatedUser {
    pub user: UserWithProfile,
}

/// `GET /api/users/me`: own user record with role profile.
pub async fn me(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<UserWithProfile>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(accounts::get_me(&conn, &caller)?))
}

/// `PUT /api/users/me`: update contact fields and upsert the role profile.
pub async fn update_me(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Json<Message<UpdatedUser>>, ApiError> {
    let Json(input) = payload?;
    let mut conn = ctx.core.open_db()?;
    let user = accounts::update_me(&mut conn, &caller, &input)?;
    Ok(Json(Message::new(
        "Profile updated successfully",
        UpdatedUser { user },
    )))
}
