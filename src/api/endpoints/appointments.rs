//! Appointment endpoints.
//!
//! - `GET /api/appointments`: caller's appointments, newest first
//! - `POST /api/appointments`: book with the caller as patient

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::authorization::Caller;
use crate::clinic::appointments::{self, NewAppointment};
use crate::models::{Appointment, AppointmentListing};

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<AppointmentListing>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(appointments::my_appointments(&conn, &caller)?))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<NewAppointment>, JsonRejection>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let Json(input) = payload?;
    let conn = ctx.core.open_db()?;
    let appointment = appointments::create_appointment(&conn, &caller, &input)?;
    Ok((StatusCode::CREATED, Json(appointment)))
}
