use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{json_col, json_text, uuid_col};
use crate::db::DatabaseError;
use crate::models::*;

const PATIENT_PROFILE_COLUMNS: &str = "pp.id, pp.user_id, pp.dob, pp.gender, pp.address,
    pp.emergency_contact, pp.medical_history, pp.created_at, pp.updated_at";

const DOCTOR_PROFILE_COLUMNS: &str = "dp.id, dp.user_id, dp.specialization, dp.registration_no,
    dp.available_slots, dp.bio, dp.location, dp.created_at, dp.updated_at";

fn map_patient_profile(row: &Row<'_>) -> rusqlite::Result<PatientProfile> {
    Ok(PatientProfile {
        id: uuid_col(row, 0)?,
        user_id: uuid_col(row, 1)?,
        dob: row.get(2)?,
        gender: row.get(3)?,
        address: row.get(4)?,
        emergency_contact: row.get(5)?,
        medical_history: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// Maps a doctor profile starting at column `base`.
fn map_doctor_profile(row: &Row<'_>, base: usize) -> rusqlite::Result<DoctorProfile> {
    Ok(DoctorProfile {
        id: uuid_col(row, base)?,
        user_id: uuid_col(row, base + 1)?,
        specialization: row.get(base + 2)?,
        registration_no: row.get(base + 3)?,
        available_slots: json_col(row, base + 4)?,
        bio: row.get(base + 5)?,
        location: row.get(base + 6)?,
        created_at: row.get(base + 7)?,
        updated_at: row.get(base + 8)?,
    })
}

pub fn get_patient_profile(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Option<PatientProfile>, DatabaseError> {
    let profile = conn
        .query_row(
            &format!("SELECT {PATIENT_PROFILE_COLUMNS} FROM patient_profiles pp WHERE pp.user_id = ?1"),
            params![user_id.to_string()],
            map_patient_profile,
        )
        .optional()?;
    Ok(profile)
}

pub fn get_doctor_profile(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Option<DoctorProfile>, DatabaseError> {
    let profile = conn
        .query_row(
            &format!("SELECT {DOCTOR_PROFILE_COLUMNS} FROM doctor_profiles dp WHERE dp.user_id = ?1"),
            params![user_id.to_string()],
            |row| map_doctor_profile(row, 0),
        )
        .optional()?;
    Ok(profile)
}

/// Create the patient's profile (dob + gender only) or update every
/// provided field of the existing one.
pub fn upsert_patient_profile(
    conn: &Connection,
    user_id: &Uuid,
    changes: &PatientProfileChanges,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patient_profiles (id, user_id, dob, gender, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?8, ?8)
         ON CONFLICT(user_id) DO UPDATE SET
            dob = COALESCE(?3, dob),
            gender = COALESCE(?4, gender),
            address = COALESCE(?5, address),
            emergency_contact = COALESCE(?6, emergency_contact),
            medical_history = COALESCE(?7, medical_history),
            updated_at = ?8",
        params![
            Uuid::new_v4().to_string(),
            user_id.to_string(),
            changes.dob,
            changes.gender,
            changes.address,
            changes.emergency_contact,
            changes.medical_history,
            now,
        ],
    )?;
    Ok(())
}

/// Create the doctor's profile (specialization only) or update every
/// provided field of the existing one.
pub fn upsert_doctor_profile(
    conn: &Connection,
    user_id: &Uuid,
    changes: &DoctorProfileChanges,
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO doctor_profiles (id, user_id, specialization, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?8, ?8)
         ON CONFLICT(user_id) DO UPDATE SET
            specialization = COALESCE(?3, specialization),
            registration_no = COALESCE(?4, registration_no),
            available_slots = COALESCE(?5, available_slots),
            bio = COALESCE(?6, bio),
            location = COALESCE(?7, location),
            updated_at = ?8",
        params![
            Uuid::new_v4().to_string(),
            user_id.to_string(),
            changes.specialization,
            changes.registration_no,
            json_text(changes.available_slots.as_ref()),
            changes.bio,
            changes.location,
            now,
        ],
    )?;
    Ok(())
}

/// Public doctor directory, oldest registration first.
pub fn list_doctor_summaries(conn: &Connection) -> Result<Vec<DoctorSummary>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT u.id, u.full_name, dp.id IS NOT NULL, dp.specialization, dp.bio, dp.location
         FROM users u
         LEFT JOIN doctor_profiles dp ON dp.user_id = u.id
         WHERE u.role = ?1
         ORDER BY u.created_at, u.rowid",
    )?;

    let rows = stmt
        .query_map(params![Role::Doctor], |row| {
            let has_profile: bool = row.get(2)?;
            Ok(DoctorSummary {
                id: uuid_col(row, 0)?,
                full_name: row.get(1)?,
                doctor_profile: if has_profile {
                    Some(DoctorCard {
                        specialization: row.get(3)?,
                        bio: row.get(4)?,
                        location: row.get(5)?,
                    })
                } else {
                    None
                },
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Doctor detail; `None` for unknown ids and for non-doctor users.
pub fn get_doctor_detail(
    conn: &Connection,
    doctor_id: &Uuid,
) -> Result<Option<DoctorDetail>, DatabaseError> {
    let detail = conn
        .query_row(
            &format!(
                "SELECT u.id, u.full_name, u.email, u.phone, dp.id IS NOT NULL, {DOCTOR_PROFILE_COLUMNS}
                 FROM users u
                 LEFT JOIN doctor_profiles dp ON dp.user_id = u.id
                 WHERE u.id = ?1 AND u.role = ?2"
            ),
            params![doctor_id.to_string(), Role::Doctor],
            |row| {
                let has_profile: bool = row.get(4)?;
                Ok(DoctorDetail {
                    id: uuid_col(row, 0)?,
                    full_name: row.get(1)?,
                    email: row.get(2)?,
                    phone: row.get(3)?,
                    doctor_profile: if has_profile {
                        Some(map_doctor_profile(row, 5)?)
                    } else {
                        None
                    },
                })
            },
        )
        .optional()?;
    Ok(detail)
}

pub fn get_patient_profile_with_user(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Option<PatientProfileWithUser>, DatabaseError> {
    let found = conn
        .query_row(
            &format!(
                "SELECT {PATIENT_PROFILE_COLUMNS}, u.full_name, u.email, u.phone
                 FROM patient_profiles pp
                 JOIN users u ON u.id = pp.user_id
                 WHERE pp.user_id = ?1"
            ),
            params![user_id.to_string()],
            |row| {
                Ok(PatientProfileWithUser {
                    profile: map_patient_profile(row)?,
                    user: ContactInfo {
                        full_name: row.get(9)?,
                        email: row.get(10)?,
                        phone: row.get(11)?,
                    },
                })
            },
        )
        .optional()?;
    Ok(found)
}
