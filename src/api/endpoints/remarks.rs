//! Remark endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::authorization::Caller;
use crate::clinic::remarks::{self, NewRemark};
use crate::models::{Remark, RemarkListing};

/// `POST /api/remarks`: visit doctor only.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<NewRemark>, JsonRejection>,
) -> Result<(StatusCode, Json<Remark>), ApiError> {
    let Json(input) = payload?;
    let conn = ctx.core.open_db()?;
    let remark = remarks::create_remark(&conn, &caller, &input)?;
    Ok((StatusCode::CREATED, Json(remark)))
}

/// `GET /api/remarks/:visitId`: either visit participant.
pub async fn for_visit(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<Caller>,
    Path(visit_id): Path<String>,
) -> Result<Json<Vec<RemarkListing>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(remarks::remarks_for_visit(&conn, &caller, &visit_id)?))
}
