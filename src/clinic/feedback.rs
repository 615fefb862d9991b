//! Patient feedback on visits.

use chrono::Utc;
use rusqlite::Connection;
use serde::Deserialize;
use uuid::Uuid;

use super::{parse_body_id, parse_path_id, present, ClinicError};
use crate::authorization::{self, Caller};
use crate::db::repository;
use crate::models::*;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewFeedback {
    pub visit_id: Option<String>,
    pub rating: Option<i64>,
    pub comments: Option<String>,
}

/// Rate one of the caller's visits, once. Visits that do not belong to
/// the caller are reported as not found.
pub fn create_feedback(
    conn: &Connection,
    caller: &Caller,
    input: &NewFeedback,
) -> Result<Feedback, ClinicError> {
    let (Some(visit_id), Some(rating)) = (present(input.visit_id.as_deref()), input.rating) else {
        return Err(ClinicError::Validation(
            "Visit ID and a rating are required.".into(),
        ));
    };
    let visit_id = parse_body_id(visit_id, "visit id")?;

    let visit = repository::get_visit(conn, &visit_id)?;
    let participants = visit.as_ref().map(Visit::participants);
    let decision = authorization::can_submit_feedback(caller, participants.as_ref());
    if !decision.allowed {
        tracing::warn!(
            user_id = %caller.user_id,
            visit_id = %visit_id,
            reason = ?decision.reason,
            "Feedback refused"
        );
        return Err(ClinicError::NotFound(
            "Visit not found or does not belong to this patient.".into(),
        ));
    }

    let feedback = Feedback {
        id: Uuid::new_v4(),
        visit_id,
        patient_id: caller.user_id,
        rating,
        comments: input.comments.clone(),
        created_at: Utc::now(),
    };
    repository::insert_feedback(conn, &feedback).map_err(|e| {
        if e.is_unique_violation() {
            ClinicError::AlreadySubmitted
        } else {
            e.into()
        }
    })?;
    Ok(feedback)
}

/// Feedback on a visit the caller ran. Any other doctor gets an empty
/// list rather than an error.
pub fn feedback_for_visit(
    conn: &Connection,
    caller: &Caller,
    visit_id: &str,
) -> Result<Vec<FeedbackListing>, ClinicError> {
    let Ok(visit_id) = parse_path_id(visit_id, "Visit not found.") else {
        return Ok(Vec::new());
    };
    Ok(repository::list_feedback_for_visit(conn, &visit_id, &caller.user_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clinic::test_support::{make_caller, test_db};

    fn visit_between(conn: &Connection, patient: &Caller, doctor: &Caller) -> Uuid {
        let now = Utc::now();
        let appt = Appointment {
            id: Uuid::new_v4(),
            patient_id: patient.user_id,
            doctor_id: doctor.user_id,
            appointment_time: now,
            duration_minutes: DEFAULT_DURATION_MINUTES,
            reason: None,
            status: AppointmentStatus::Completed,
            created_at: now,
            updated_at: now,
        };
        repository::insert_appointment(conn, &appt).unwrap();
        let visit = Visit {
            id: Uuid::new_v4(),
            appointment_id: appt.id,
            patient_id: patient.user_id,
            doctor_id: doctor.user_id,
            visit_time: now,
            diagnosis_code: None,
            diagnosis_text: None,
            prescription: None,
            follow_up_reco: None,
            created_at: now,
        };
        repository::insert_visit(conn, &visit).unwrap();
        visit.id
    }

    fn rating(visit: Uuid, stars: i64) -> NewFeedback {
        NewFeedback {
            visit_id: Some(visit.to_string()),
            rating: Some(stars),
            comments: Some("Helpful".into()),
        }
    }

    #[test]
    fn second_submission_already_submitted() {
        let conn = test_db();
        let patient = make_caller(&conn, "p@x.com", "Pat", Role::Patient);
        let doctor = make_caller(&conn, "d@x.com", "Dr D", Role::Doctor);
        let visit = visit_between(&conn, &patient, &doctor);

        create_feedback(&conn, &patient, &rating(visit, 5)).unwrap();
        assert!(matches!(
            create_feedback(&conn, &patient, &rating(visit, 1)),
            Err(ClinicError::AlreadySubmitted)
        ));
        assert_eq!(repository::count_feedback_for_visit(&conn, &visit).unwrap(), 1);
    }

    #[test]
    fn foreign_visit_reads_as_missing() {
        let conn = test_db();
        let patient = make_caller(&conn, "p@x.com", "Pat", Role::Patient);
        let other = make_caller(&conn, "o@x.com", "Olly", Role::Patient);
        let doctor = make_caller(&conn, "d@x.com", "Dr D", Role::Doctor);
        let visit = visit_between(&conn, &patient, &doctor);

        assert!(matches!(
            create_feedback(&conn, &other, &rating(visit, 3)),
            Err(ClinicError::NotFound(_))
        ));
        assert!(matches!(
            create_feedback(&conn, &patient, &rating(Uuid::new_v4(), 3)),
            Err(ClinicError::NotFound(_))
        ));
    }

    #[test]
    fn zero_rating_is_a_rating() {
        let conn = test_db();
        let patient = make_caller(&conn, "p@x.com", "Pat", Role::Patient);
        let doctor = make_caller(&conn, "d@x.com", "Dr D", Role::Doctor);
        let visit = visit_between(&conn, &patient, &doctor);

        assert_eq!(create_feedback(&conn, &patient, &rating(visit, 0)).unwrap().rating, 0);

        let missing = NewFeedback {
            visit_id: Some(visit.to_string()),
            rating: None,
            comments: None,
        };
        assert!(matches!(
            create_feedback(&conn, &patient, &missing),
            Err(ClinicError::Validation(_))
        ));
    }

    #[test]
    fn non_owning_doctor_sees_empty_list() {
        let conn = test_db();
        let patient = make_caller(&conn, "p@x.com", "Pat", Role::Patient);
        let doctor_a = make_caller(&conn, "a@x.com", "Dr A", Role::Doctor);
        let doctor_b = make_caller(&conn, "b@x.com", "Dr B", Role::Doctor);
        let visit = visit_between(&conn, &patient, &doctor_a);
        create_feedback(&conn, &patient, &rating(visit, 4)).unwrap();

        let id = visit.to_string();
        assert_eq!(feedback_for_visit(&conn, &doctor_a, &id).unwrap().len(), 1);
        assert!(feedback_for_visit(&conn, &doctor_b, &id).unwrap().is_empty());
        assert!(feedback_for_visit(&conn, &doctor_a, "garbage").unwrap().is_empty());
    }
}
