//! Visit endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::authorization::Caller;
use crate::clinic::visits::{self, NewVisit};
use crate::models::{Visit, VisitListing};

/// `GET /api/visits`: caller's visits, newest first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<VisitListing>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(visits::my_visits(&conn, &caller)?))
}

/// `POST /api/visits`: doctor records a visit; completes the appointment.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<NewVisit>, JsonRejection>,
) -> Result<(StatusCode, Json<Visit>), ApiError> {
    let Json(input) = payload?;
    let mut conn = ctx.core.open_db()?;
    let visit = visits::create_visit(&mut conn, &caller, &input)?;
    Ok((StatusCode::CREATED, Json(visit)))
}
