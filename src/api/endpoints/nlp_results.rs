//! NLP result endpoint.

use axum::extract::{Path, State};
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::authorization::Caller;
use crate::clinic::nlp;
use crate::models::NlpResult;

/// `GET /api/nlp-results/:resultId`
pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<Caller>,
    Path(result_id): Path<String>,
) -> Result<Json<NlpResult>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(nlp::get_nlp_result(&conn, &caller, &result_id)?))
}
