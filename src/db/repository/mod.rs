//! Repository layer: entity-scoped database operations.
//!
//! Every function takes a borrowed connection so callers decide the
//! transaction boundary.

mod appointment;
mod feedback;
mod nlp_result;
mod profile;
mod remark;
mod user;
mod visit;

use rusqlite::types::Type;
use rusqlite::Row;
use uuid::Uuid;

pub use appointment::*;
pub use feedback::*;
pub use nlp_result::*;
pub use profile::*;
pub use remark::*;
pub use user::*;
pub use visit::*;

/// Read a TEXT column holding a UUID.
pub(crate) fn uuid_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn opt_uuid_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        Uuid::parse_str(&s)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

/// Read a nullable TEXT column holding JSON.
pub(crate) fn json_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<serde_json::Value>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        serde_json::from_str(&s)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

pub(crate) fn json_text(value: Option<&serde_json::Value>) -> Option<String> {
    value.map(|v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::db::DatabaseError;
    use crate::models::*;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use rusqlite::Connection;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn make_user(conn: &Connection, email: &str, name: &str, role: Role) -> Uuid {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.into(),
            full_name: name.into(),
            phone: None,
            role,
            created_at: now,
            updated_at: now,
        };
        insert_user(conn, &user, "hash").unwrap();
        user.id
    }

    fn make_appointment(conn: &Connection, patient: Uuid, doctor: Uuid, hour: u32) -> Uuid {
        let now = Utc::now();
        let appt = Appointment {
            id: Uuid::new_v4(),
            patient_id: patient,
            doctor_id: doctor,
            appointment_time: Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap(),
            duration_minutes: DEFAULT_DURATION_MINUTES,
            reason: Some("checkup".into()),
            status: AppointmentStatus::Scheduled,
            created_at: now,
            updated_at: now,
        };
        insert_appointment(conn, &appt).unwrap();
        appt.id
    }

    fn make_visit(conn: &Connection, appointment: Uuid, patient: Uuid, doctor: Uuid) -> Uuid {
        let now = Utc::now();
        let visit = Visit {
            id: Uuid::new_v4(),
            appointment_id: appointment,
            patient_id: patient,
            doctor_id: doctor,
            visit_time: now,
            diagnosis_code: Some("J06.9".into()),
            diagnosis_text: None,
            prescription: None,
            follow_up_reco: None,
            created_at: now,
        };
        insert_visit(conn, &visit).unwrap();
        visit.id
    }

    fn make_feedback(patient: Uuid, visit: Uuid, rating: i64) -> Feedback {
        Feedback {
            id: Uuid::new_v4(),
            visit_id: visit,
            patient_id: patient,
            rating,
            comments: None,
            created_at: Utc::now(),
        }
    }

    struct Clinic {
        doctor: Uuid,
        patient: Uuid,
        visit: Uuid,
    }

    fn seeded(conn: &Connection) -> Clinic {
        let doctor = make_user(conn, "doc@x.com", "Dr Who", Role::Doctor);
        let patient = make_user(conn, "pat@x.com", "Pat", Role::Patient);
        let appt = make_appointment(conn, patient, doctor, 9);
        let visit = make_visit(conn, appt, patient, doctor);
        Clinic { doctor, patient, visit }
    }

    #[test]
    fn user_insert_and_lookup() {
        let conn = test_db();
        let id = make_user(&conn, "a@x.com", "Alice", Role::Patient);

        let user = get_user(&conn, &id).unwrap().unwrap();
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.role, Role::Patient);
        assert_eq!(get_user_by_email(&conn, "a@x.com").unwrap().unwrap().id, id);
        assert!(email_exists(&conn, "a@x.com").unwrap());
        assert!(!email_exists(&conn, "b@x.com").unwrap());

        let (_, hash) = get_credentials_by_email(&conn, "a@x.com").unwrap().unwrap();
        assert_eq!(hash, "hash");
    }

    #[test]
    fn duplicate_email_rejected() {
        let conn = test_db();
        make_user(&conn, "a@x.com", "Alice", Role::Patient);
        let now = Utc::now();
        let dup = User {
            id: Uuid::new_v4(),
            email: "a@x.com".into(),
            full_name: "Other".into(),
            phone: None,
            role: Role::Doctor,
            created_at: now,
            updated_at: now,
        };
        let err = insert_user(&conn, &dup, "h").unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[test]
    fn contact_update_keeps_absent_fields() {
        let conn = test_db();
        let id = make_user(&conn, "a@x.com", "Alice", Role::Patient);
        assert!(update_user_contact(&conn, &id, None, Some("555"), Utc::now()).unwrap());

        let user = get_user(&conn, &id).unwrap().unwrap();
        assert_eq!(user.full_name, "Alice");
        assert_eq!(user.phone.as_deref(), Some("555"));

        assert!(!update_user_contact(&conn, &Uuid::new_v4(), Some("X"), None, Utc::now()).unwrap());
    }

    #[test]
    fn patient_profile_created_then_updated() {
        let conn = test_db();
        let id = make_user(&conn, "a@x.com", "Alice", Role::Patient);
        let dob = NaiveDate::from_ymd_opt(1990, 5, 17).unwrap();

        let first = PatientProfileChanges {
            dob: Some(dob),
            gender: Some("F".into()),
            address: Some("ignored on create".into()),
            ..Default::default()
        };
        upsert_patient_profile(&conn, &id, &first, Utc::now()).unwrap();
        let created = get_patient_profile(&conn, &id).unwrap().unwrap();
        assert_eq!(created.dob, Some(dob));
        assert_eq!(created.address, None);

        let second = PatientProfileChanges {
            address: Some("1 Main St".into()),
            ..Default::default()
        };
        upsert_patient_profile(&conn, &id, &second, Utc::now()).unwrap();
        let updated = get_patient_profile(&conn, &id).unwrap().unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.address.as_deref(), Some("1 Main St"));
        assert_eq!(updated.gender.as_deref(), Some("F"));
    }

    #[test]
    fn doctor_profile_slots_stored_as_json() {
        let conn = test_db();
        let id = make_user(&conn, "d@x.com", "Dr D", Role::Doctor);
        upsert_doctor_profile(
            &conn,
            &id,
            &DoctorProfileChanges {
                specialization: Some("Cardiology".into()),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();

        let slots = serde_json::json!({"mon": ["09:00", "10:00"]});
        upsert_doctor_profile(
            &conn,
            &id,
            &DoctorProfileChanges {
                available_slots: Some(slots.clone()),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();

        let profile = get_doctor_profile(&conn, &id).unwrap().unwrap();
        assert_eq!(profile.specialization.as_deref(), Some("Cardiology"));
        assert_eq!(profile.available_slots, Some(slots));
    }

    #[test]
    fn doctor_directory_lists_only_doctors() {
        let conn = test_db();
        let with_profile = make_user(&conn, "d1@x.com", "Dr One", Role::Doctor);
        make_user(&conn, "d2@x.com", "Dr Two", Role::Doctor);
        let patient = make_user(&conn, "p@x.com", "Pat", Role::Patient);
        upsert_doctor_profile(
            &conn,
            &with_profile,
            &DoctorProfileChanges {
                specialization: Some("ENT".into()),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();

        let doctors = list_doctor_summaries(&conn).unwrap();
        assert_eq!(doctors.len(), 2);
        let one = doctors.iter().find(|d| d.id == with_profile).unwrap();
        assert_eq!(
            one.doctor_profile.as_ref().unwrap().specialization.as_deref(),
            Some("ENT")
        );
        let two = doctors.iter().find(|d| d.id != with_profile).unwrap();
        assert!(two.doctor_profile.is_none());

        assert!(get_doctor_detail(&conn, &with_profile).unwrap().is_some());
        assert!(get_doctor_detail(&conn, &patient).unwrap().is_none());
        assert!(get_doctor_detail(&conn, &Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn appointments_scoped_and_newest_first() {
        let conn = test_db();
        let doctor = make_user(&conn, "d@x.com", "Dr D", Role::Doctor);
        let patient = make_user(&conn, "p@x.com", "Pat", Role::Patient);
        let other = make_user(&conn, "o@x.com", "Other", Role::Patient);
        let early = make_appointment(&conn, patient, doctor, 8);
        let late = make_appointment(&conn, patient, doctor, 15);
        make_appointment(&conn, other, doctor, 11);

        let mine = list_appointments_for(&conn, ParticipantScope::Patient(patient)).unwrap();
        let ids: Vec<Uuid> = mine.iter().map(|a| a.appointment.id).collect();
        assert_eq!(ids, vec![late, early]);
        assert_eq!(mine[0].doctor.as_ref().unwrap().full_name, "Dr D");
        assert!(mine[0].doctor.as_ref().unwrap().doctor_profile.is_none());

        let doctors = list_appointments_for(&conn, ParticipantScope::Doctor(doctor)).unwrap();
        assert_eq!(doctors.len(), 3);
    }

    #[test]
    fn appointment_with_unknown_doctor_lists_without_doctor() {
        let conn = test_db();
        let patient = make_user(&conn, "p@x.com", "Pat", Role::Patient);
        make_appointment(&conn, patient, Uuid::new_v4(), 9);

        let mine = list_appointments_for(&conn, ParticipantScope::Patient(patient)).unwrap();
        assert_eq!(mine.len(), 1);
        assert!(mine[0].doctor.is_none());
        assert_eq!(mine[0].patient.as_ref().unwrap().full_name, "Pat");
    }

    #[test]
    fn complete_appointment_sets_status() {
        let conn = test_db();
        let doctor = make_user(&conn, "d@x.com", "Dr D", Role::Doctor);
        let patient = make_user(&conn, "p@x.com", "Pat", Role::Patient);
        let appt = make_appointment(&conn, patient, doctor, 9);

        assert!(complete_appointment(&conn, &appt, Utc::now()).unwrap());
        let stored = get_appointment(&conn, &appt).unwrap().unwrap();
        assert_eq!(stored.status, AppointmentStatus::Completed);
        assert!(!complete_appointment(&conn, &Uuid::new_v4(), Utc::now()).unwrap());
    }

    #[test]
    fn one_visit_per_appointment() {
        let conn = test_db();
        let c = seeded(&conn);
        let visit = get_visit(&conn, &c.visit).unwrap().unwrap();

        let now = Utc::now();
        let again = Visit {
            id: Uuid::new_v4(),
            created_at: now,
            visit_time: now,
            ..visit
        };
        let err = insert_visit(&conn, &again).unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[test]
    fn visit_for_unknown_patient_is_fk_violation() {
        let conn = test_db();
        let doctor = make_user(&conn, "d@x.com", "Dr D", Role::Doctor);
        let patient = make_user(&conn, "p@x.com", "Pat", Role::Patient);
        let appt = make_appointment(&conn, patient, doctor, 9);
        let now = Utc::now();
        let visit = Visit {
            id: Uuid::new_v4(),
            appointment_id: appt,
            patient_id: Uuid::new_v4(),
            doctor_id: doctor,
            visit_time: now,
            diagnosis_code: None,
            diagnosis_text: None,
            prescription: None,
            follow_up_reco: None,
            created_at: now,
        };
        let err: DatabaseError = insert_visit(&conn, &visit).unwrap_err();
        assert!(err.is_foreign_key_violation());
    }

    #[test]
    fn visits_listed_with_names() {
        let conn = test_db();
        let c = seeded(&conn);

        let for_doctor = list_visits_for(&conn, ParticipantScope::Doctor(c.doctor)).unwrap();
        assert_eq!(for_doctor.len(), 1);
        assert_eq!(for_doctor[0].patient.full_name, "Pat");
        assert_eq!(for_doctor[0].doctor.full_name, "Dr Who");
        assert_eq!(for_doctor[0].appointment.reason.as_deref(), Some("checkup"));

        let for_patient = list_visits_for(&conn, ParticipantScope::Patient(c.patient)).unwrap();
        assert_eq!(for_patient.len(), 1);
        assert!(list_visits_for(&conn, ParticipantScope::Patient(c.doctor)).unwrap().is_empty());
    }

    #[test]
    fn remarks_listed_oldest_first() {
        let conn = test_db();
        let c = seeded(&conn);
        let base = Utc::now();
        for (i, text) in ["second", "first"].iter().enumerate() {
            insert_remark(
                &conn,
                &Remark {
                    id: Uuid::new_v4(),
                    visit_id: c.visit,
                    doctor_id: c.doctor,
                    raw_text: text.to_string(),
                    symptom_tags: vec!["cough".into()],
                    created_at: base - Duration::minutes(i as i64),
                },
            )
            .unwrap();
        }

        let remarks = list_remarks_for_visit(&conn, &c.visit).unwrap();
        let texts: Vec<&str> = remarks.iter().map(|r| r.remark.raw_text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
        assert_eq!(remarks[0].remark.symptom_tags, vec!["cough".to_string()]);
        assert_eq!(remarks[0].doctor.full_name, "Dr Who");
    }

    #[test]
    fn feedback_unique_per_patient_and_visit() {
        let conn = test_db();
        let c = seeded(&conn);

        insert_feedback(&conn, &make_feedback(c.patient, c.visit, 5)).unwrap();
        let err = insert_feedback(&conn, &make_feedback(c.patient, c.visit, 1)).unwrap_err();
        assert!(err.is_unique_violation());
        assert_eq!(count_feedback_for_visit(&conn, &c.visit).unwrap(), 1);
    }

    #[test]
    fn feedback_visible_only_to_visit_doctor() {
        let conn = test_db();
        let c = seeded(&conn);
        let stranger = make_user(&conn, "s@x.com", "Dr S", Role::Doctor);
        insert_feedback(&conn, &make_feedback(c.patient, c.visit, 4)).unwrap();

        let seen = list_feedback_for_visit(&conn, &c.visit, &c.doctor).unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].patient.full_name, "Pat");
        assert_eq!(seen[0].feedback.rating, 4);

        assert!(list_feedback_for_visit(&conn, &c.visit, &stranger).unwrap().is_empty());
    }

    #[test]
    fn nlp_result_resolves_visit_through_source() {
        let conn = test_db();
        let c = seeded(&conn);
        let feedback = make_feedback(c.patient, c.visit, 2);
        insert_feedback(&conn, &feedback).unwrap();

        let result = NlpResult {
            id: Uuid::new_v4(),
            source_type: NlpSourceType::Feedback,
            remark_id: None,
            feedback_id: Some(feedback.id),
            payload: serde_json::json!({"sentiment": "negative"}),
            created_at: Utc::now(),
        };
        insert_nlp_result(&conn, &result).unwrap();

        let (loaded, participants) = get_nlp_result_with_visit(&conn, &result.id).unwrap().unwrap();
        assert_eq!(loaded.payload["sentiment"], "negative");
        assert_eq!(loaded.source_id(), Some(feedback.id));
        let participants = participants.unwrap();
        assert_eq!(participants.doctor_id, c.doctor);
        assert_eq!(participants.patient_id, c.patient);

        assert!(get_nlp_result_with_visit(&conn, &Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn corrupt_nlp_payload_is_an_error() {
        let conn = test_db();
        let c = seeded(&conn);
        let feedback = make_feedback(c.patient, c.visit, 3);
        insert_feedback(&conn, &feedback).unwrap();
        let result = NlpResult {
            id: Uuid::new_v4(),
            source_type: NlpSourceType::Feedback,
            remark_id: None,
            feedback_id: Some(feedback.id),
            payload: serde_json::json!({}),
            created_at: Utc::now(),
        };
        insert_nlp_result(&conn, &result).unwrap();
        conn.execute(
            "UPDATE nlp_results SET payload = 'not json' WHERE id = ?1",
            [result.id.to_string()],
        )
        .unwrap();

        assert!(get_nlp_result_with_visit(&conn, &result.id).is_err());
    }

    #[test]
    fn nlp_result_requires_exactly_one_source() {
        let conn = test_db();
        let result = NlpResult {
            id: Uuid::new_v4(),
            source_type: NlpSourceType::Remark,
            remark_id: None,
            feedback_id: None,
            payload: serde_json::json!({}),
            created_at: Utc::now(),
        };
        assert!(insert_nlp_result(&conn, &result).is_err());
    }

    #[test]
    fn clinical_records_counted_for_both_roles() {
        let conn = test_db();
        let c = seeded(&conn);
        let idle = make_user(&conn, "idle@x.com", "Idle", Role::Patient);

        assert!(count_clinical_records_for_user(&conn, &c.patient).unwrap() > 0);
        assert!(count_clinical_records_for_user(&conn, &c.doctor).unwrap() > 0);
        assert_eq!(count_clinical_records_for_user(&conn, &idle).unwrap(), 0);
        assert_eq!(count_users_by_role(&conn, Role::Patient).unwrap(), 2);
    }

    #[test]
    fn deleting_user_cascades_profile() {
        let conn = test_db();
        let id = make_user(&conn, "a@x.com", "Alice", Role::Patient);
        upsert_patient_profile(&conn, &id, &PatientProfileChanges::default(), Utc::now()).unwrap();

        assert!(delete_user(&conn, &id).unwrap());
        assert!(get_patient_profile(&conn, &id).unwrap().is_none());
        assert!(!delete_user(&conn, &id).unwrap());
    }
}
