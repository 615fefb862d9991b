//! Feedback endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::authorization::Caller;
use crate::clinic::feedback::{self, NewFeedback};
use crate::models::{Feedback, FeedbackListing};

/// `POST /api/feedbacks`: one rating per patient and visit.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<NewFeedback>, JsonRejection>,
) -> Result<(StatusCode, Json<Feedback>), ApiError> {
    let Json(input) = payload?;
    let conn = ctx.core.open_db()?;
    let created = feedback::create_feedback(&conn, &caller, &input)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/feedbacks/:visitId`: empty unless the caller ran the visit.
pub async fn for_visit(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<Caller>,
    Path(visit_id): Path<String>,
) -> Result<Json<Vec<FeedbackListing>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(feedback::feedback_for_visit(&conn, &caller, &visit_id)?))
}
