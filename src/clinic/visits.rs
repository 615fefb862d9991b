//! Visit records.

use chrono::Utc;
use rusqlite::{Connection, TransactionBehavior};
use serde::Deserialize;
use uuid::Uuid;

use super::{parse_body_id, present, ClinicError};
use crate::authorization::Caller;
use crate::db::repository;
use crate::models::*;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewVisit {
    pub appointment_id: Option<String>,
    pub patient_id: Option<String>,
    pub diagnosis_code: Option<String>,
    pub diagnosis_text: Option<String>,
    pub prescription: Option<String>,
    pub follow_up_reco: Option<String>,
}

/// Record a visit by the calling doctor and mark its appointment
/// COMPLETED. Both writes commit together.
pub fn create_visit(
    conn: &mut Connection,
    caller: &Caller,
    input: &NewVisit,
) -> Result<Visit, ClinicError> {
    let (Some(appointment_id), Some(patient_id)) = (
        present(input.appointment_id.as_deref()),
        present(input.patient_id.as_deref()),
    ) else {
        return Err(ClinicError::Validation(
            "Appointment ID and Patient ID are required.".into(),
        ));
    };
    let appointment_id = parse_body_id(appointment_id, "appointment id")?;
    let patient_id = parse_body_id(patient_id, "patient id")?;

    let now = Utc::now();
    let visit = Visit {
        id: Uuid::new_v4(),
        appointment_id,
        patient_id,
        doctor_id: caller.user_id,
        visit_time: now,
        diagnosis_code: input.diagnosis_code.clone(),
        diagnosis_text: input.diagnosis_text.clone(),
        prescription: input.prescription.clone(),
        follow_up_reco: input.follow_up_reco.clone(),
        created_at: now,
    };

    // Take the write lock up front: a deferred read cannot be upgraded
    // once another connection has committed under WAL.
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    if repository::get_appointment(&tx, &appointment_id)?.is_none() {
        return Err(ClinicError::NotFound("Appointment not found.".into()));
    }

    repository::insert_visit(&tx, &visit).map_err(|e| {
        if e.is_unique_violation() {
            ClinicError::Conflict("A visit has already been recorded for this appointment.".into())
        } else if e.is_foreign_key_violation() {
            ClinicError::Validation("Patient not found.".into())
        } else {
            e.into()
        }
    })?;
    repository::complete_appointment(&tx, &appointment_id, now)?;

    tx.commit()?;

    tracing::info!(
        visit_id = %visit.id,
        appointment_id = %appointment_id,
        doctor_id = %caller.user_id,
        "Visit recorded"
    );
    Ok(visit)
}

/// Visits where the caller is the doctor (doctors) or the patient
/// (patients), newest first.
pub fn my_visits(conn: &Connection, caller: &Caller) -> Result<Vec<VisitListing>, ClinicError> {
    let scope = ParticipantScope::new(caller.user_id, caller.role);
    Ok(repository::list_visits_for(conn, scope)?)
}
