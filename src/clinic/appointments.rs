//! Booking and listing appointments.

use chrono::Utc;
use rusqlite::Connection;
use serde::Deserialize;
use uuid::Uuid;

use super::{parse_body_id, parse_timestamp, present, ClinicError};
use crate::authorization::Caller;
use crate::db::repository;
use crate::models::*;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAppointment {
    pub doctor_id: Option<String>,
    pub appointment_time: Option<String>,
    pub duration_minutes: Option<i64>,
    pub reason: Option<String>,
}

/// Book an appointment for the caller. The patient is always the caller;
/// the doctor id is stored as given without checking that it names a doctor.
pub fn create_appointment(
    conn: &Connection,
    caller: &Caller,
    input: &NewAppointment,
) -> Result<Appointment, ClinicError> {
    let (Some(doctor_id), Some(time)) = (
        present(input.doctor_id.as_deref()),
        present(input.appointment_time.as_deref()),
    ) else {
        return Err(ClinicError::Validation(
            "Doctor ID and appointment time are required.".into(),
        ));
    };

    let doctor_id = parse_body_id(doctor_id, "doctor id")?;
    let appointment_time = parse_timestamp(time, "appointment time")?;
    let duration_minutes = match input.duration_minutes {
        None | Some(0) => DEFAULT_DURATION_MINUTES,
        Some(d) if d > 0 => d,
        Some(_) => {
            return Err(ClinicError::Validation(
                "Duration must be a positive number of minutes.".into(),
            ))
        }
    };

    let now = Utc::now();
    let appointment = Appointment {
        id: Uuid::new_v4(),
        patient_id: caller.user_id,
        doctor_id,
        appointment_time,
        duration_minutes,
        reason: input.reason.clone(),
        status: AppointmentStatus::Scheduled,
        created_at: now,
        updated_at: now,
    };
    repository::insert_appointment(conn, &appointment)?;

    tracing::info!(
        appointment_id = %appointment.id,
        patient_id = %appointment.patient_id,
        doctor_id = %appointment.doctor_id,
        "Appointment booked"
    );
    Ok(appointment)
}

/// Appointments where the caller is the doctor (doctors) or the patient
/// (patients), newest first.
pub fn my_appointments(
    conn: &Connection,
    caller: &Caller,
) -> Result<Vec<AppointmentListing>, ClinicError> {
    let scope = ParticipantScope::new(caller.user_id, caller.role);
    Ok(repository::list_appointments_for(conn, scope)?)
}
