//! Doctor directory (public) and the patient's own profile.

use axum::extract::{Path, State};
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::authorization::Caller;
use crate::clinic::directory;
use crate::models::{DoctorDetail, DoctorSummary, PatientProfileWithUser};

/// `GET /api/profiles/doctors`: every doctor, public fields only.
pub async fn doctors(State(ctx): State<ApiContext>) -> Result<Json<Vec<DoctorSummary>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(directory::list_doctors(&conn)?))
}

/// `GET /api/profiles/doctors/:doctorId`
pub async fn doctor(
    State(ctx): State<ApiContext>,
    Path(doctor_id): Path<String>,
) -> Result<Json<DoctorDetail>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(directory::get_doctor(&conn, &doctor_id)?))
}

/// `GET /api/profiles/patients/me`
pub async fn my_patient_profile(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<PatientProfileWithUser>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(directory::my_patient_profile(&conn, &caller)?))
}
