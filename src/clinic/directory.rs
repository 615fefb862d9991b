//! Public doctor directory and the patient's own profile.

use rusqlite::Connection;

use super::{parse_path_id, ClinicError};
use crate::authorization::Caller;
use crate::db::repository;
use crate::models::{DoctorDetail, DoctorSummary, PatientProfileWithUser};

pub fn list_doctors(conn: &Connection) -> Result<Vec<DoctorSummary>, ClinicError> {
    Ok(repository::list_doctor_summaries(conn)?)
}

pub fn get_doctor(conn: &Connection, doctor_id: &str) -> Result<DoctorDetail, ClinicError> {
    const NOT_FOUND: &str = "Doctor not found.";
    let id = parse_path_id(doctor_id, NOT_FOUND)?;
    repository::get_doctor_detail(conn, &id)?.ok_or_else(|| ClinicError::NotFound(NOT_FOUND.into()))
}

/// The caller's patient profile; absent until the first profile update.
pub fn my_patient_profile(
    conn: &Connection,
    caller: &Caller,
) -> Result<PatientProfileWithUser, ClinicError> {
    repository::get_patient_profile_with_user(conn, &caller.user_id)?
        .ok_or_else(|| ClinicError::NotFound("Patient profile not found.".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clinic::test_support::{make_caller, test_db};
    use crate::models::{PatientProfileChanges, Role};
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn empty_directory() {
        let conn = test_db();
        make_caller(&conn, "p@x.com", "Pat", Role::Patient);
        assert!(list_doctors(&conn).unwrap().is_empty());
    }

    #[test]
    fn doctor_lookup_hides_patients() {
        let conn = test_db();
        let doctor = make_caller(&conn, "d@x.com", "Dr D", Role::Doctor);
        let patient = make_caller(&conn, "p@x.com", "Pat", Role::Patient);

        let detail = get_doctor(&conn, &doctor.user_id.to_string()).unwrap();
        assert_eq!(detail.email, "d@x.com");
        assert!(matches!(
            get_doctor(&conn, &patient.user_id.to_string()),
            Err(ClinicError::NotFound(_))
        ));
        assert!(matches!(get_doctor(&conn, "not-a-uuid"), Err(ClinicError::NotFound(_))));
        assert!(matches!(
            get_doctor(&conn, &Uuid::new_v4().to_string()),
            Err(ClinicError::NotFound(_))
        ));
    }

    #[test]
    fn patient_profile_missing_until_created() {
        let conn = test_db();
        let patient = make_caller(&conn, "p@x.com", "Pat", Role::Patient);
        assert!(matches!(
            my_patient_profile(&conn, &patient),
            Err(ClinicError::NotFound(_))
        ));

        repository::upsert_patient_profile(
            &conn,
            &patient.user_id,
            &PatientProfileChanges {
                gender: Some("M".into()),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();
        let found = my_patient_profile(&conn, &patient).unwrap();
        assert_eq!(found.user.email, "p@x.com");
        assert_eq!(found.profile.gender.as_deref(), Some("M"));
    }
}
