//! Operator commands that work directly on the database.

use chrono::Utc;
use rusqlite::Connection;

use super::{present, ClinicError};
use crate::crypto::{hash_password, verify_password};
use crate::db::repository;
use crate::models::{AppointmentListing, ParticipantScope, Role, User};

fn user_by_email(conn: &Connection, email: &str) -> Result<User, ClinicError> {
    repository::get_user_by_email(conn, email)?
        .ok_or_else(|| ClinicError::NotFound(format!("No user with email {email}.")))
}

#[derive(Debug)]
pub struct AppointmentReport {
    pub user: User,
    pub appointments: Vec<AppointmentListing>,
    pub doctor_count: i64,
}

/// A user's appointments on their own side, plus how many doctors exist.
pub fn check_appointments(conn: &Connection, email: &str) -> Result<AppointmentReport, ClinicError> {
    let user = user_by_email(conn, email)?;
    let appointments =
        repository::list_appointments_for(conn, ParticipantScope::new(user.id, user.role))?;
    let doctor_count = repository::count_users_by_role(conn, Role::Doctor)?;
    Ok(AppointmentReport {
        user,
        appointments,
        doctor_count,
    })
}

/// Delete an account and its profile. Refused while any appointment,
/// visit, remark or feedback references the user.
pub fn delete_user(conn: &Connection, email: &str) -> Result<User, ClinicError> {
    let user = user_by_email(conn, email)?;
    let records = repository::count_clinical_records_for_user(conn, &user.id)?;
    if records > 0 {
        return Err(ClinicError::Conflict(format!(
            "User {email} has {records} clinical record(s) and cannot be deleted."
        )));
    }
    repository::delete_user(conn, &user.id)?;
    tracing::info!(user_id = %user.id, "User deleted");
    Ok(user)
}

/// Replace a user's password hash.
pub fn reset_password(
    conn: &Connection,
    email: &str,
    password: &str,
    cost: u32,
) -> Result<User, ClinicError> {
    let Some(password) = present(Some(password)) else {
        return Err(ClinicError::Validation("Password must not be empty.".into()));
    };
    let user = user_by_email(conn, email)?;
    let hash = hash_password(password, cost)?;
    repository::set_password_hash(conn, &user.id, &hash, Utc::now())?;
    tracing::info!(user_id = %user.id, "Password reset");
    Ok(user)
}

/// Whether the credentials would log in. Unknown emails are reported as
/// not found so operators can tell the two apart.
pub fn verify_login(conn: &Connection, email: &str, password: &str) -> Result<bool, ClinicError> {
    let Some((_, hash)) = repository::get_credentials_by_email(conn, email)? else {
        return Err(ClinicError::NotFound(format!("No user with email {email}.")));
    };
    Ok(verify_password(password, &hash)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clinic::accounts::{register, Registration};
    use crate::clinic::appointments::{create_appointment, NewAppointment};
    use crate::clinic::test_support::{make_caller, test_db};

    const COST: u32 = 4;

    fn registered(conn: &Connection, email: &str, role: &str) -> User {
        register(
            conn,
            &Registration {
                email: Some(email.into()),
                password: Some("first-pass".into()),
                full_name: Some("Someone".into()),
                role: Some(role.into()),
            },
            COST,
        )
        .unwrap()
    }

    #[test]
    fn report_counts_doctors() {
        let conn = test_db();
        registered(&conn, "p@x.com", "PATIENT");
        let report = check_appointments(&conn, "p@x.com").unwrap();
        assert!(report.appointments.is_empty());
        assert_eq!(report.doctor_count, 0);

        assert!(matches!(
            check_appointments(&conn, "ghost@x.com"),
            Err(ClinicError::NotFound(_))
        ));
    }

    #[test]
    fn reset_then_verify() {
        let conn = test_db();
        registered(&conn, "p@x.com", "PATIENT");
        assert!(verify_login(&conn, "p@x.com", "first-pass").unwrap());

        reset_password(&conn, "p@x.com", "second-pass", COST).unwrap();
        assert!(!verify_login(&conn, "p@x.com", "first-pass").unwrap());
        assert!(verify_login(&conn, "p@x.com", "second-pass").unwrap());
        assert!(reset_password(&conn, "p@x.com", "", COST).is_err());
    }

    #[test]
    fn delete_refused_with_records() {
        let conn = test_db();
        let patient = make_caller(&conn, "p@x.com", "Pat", Role::Patient);
        make_caller(&conn, "idle@x.com", "Idle", Role::Patient);
        create_appointment(
            &conn,
            &patient,
            &NewAppointment {
                doctor_id: Some(uuid::Uuid::new_v4().to_string()),
                appointment_time: Some("2025-01-01T10:00:00Z".into()),
                ..Default::default()
            },
        )
        .unwrap();

        assert!(matches!(delete_user(&conn, "p@x.com"), Err(ClinicError::Conflict(_))));
        delete_user(&conn, "idle@x.com").unwrap();
        assert!(repository::get_user_by_email(&conn, "idle@x.com").unwrap().is_none());
    }
}
