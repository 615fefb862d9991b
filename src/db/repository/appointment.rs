use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::uuid_col;
use crate::db::DatabaseError;
use crate::models::*;

const APPOINTMENT_COLUMNS: &str = "a.id, a.patient_id, a.doctor_id, a.appointment_time,
    a.duration_minutes, a.reason, a.status, a.created_at, a.updated_at";

fn map_appointment(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: uuid_col(row, 0)?,
        patient_id: uuid_col(row, 1)?,
        doctor_id: uuid_col(row, 2)?,
        appointment_time: row.get(3)?,
        duration_minutes: row.get(4)?,
        reason: row.get(5)?,
        status: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (id, patient_id, doctor_id, appointment_time, duration_minutes,
         reason, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            appt.id.to_string(),
            appt.patient_id.to_string(),
            appt.doctor_id.to_string(),
            appt.appointment_time,
            appt.duration_minutes,
            appt.reason,
            appt.status,
            appt.created_at,
            appt.updated_at,
        ],
    )?;
    Ok(())
}

pub fn get_appointment(conn: &Connection, id: &Uuid) -> Result<Option<Appointment>, DatabaseError> {
    let appt = conn
        .query_row(
            &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments a WHERE a.id = ?1"),
            params![id.to_string()],
            map_appointment,
        )
        .optional()?;
    Ok(appt)
}

/// SCHEDULED -> COMPLETED. Returns `false` when the appointment is unknown.
pub fn complete_appointment(
    conn: &Connection,
    id: &Uuid,
    now: DateTime<Utc>,
) -> Result<bool, DatabaseError> {
    let updated = conn.execute(
        "UPDATE appointments SET status = ?2, updated_at = ?3 WHERE id = ?1",
        params![id.to_string(), AppointmentStatus::Completed, now],
    )?;
    Ok(updated > 0)
}

/// Appointments on the caller's side, newest first, with the other
/// party's display fields.
pub fn list_appointments_for(
    conn: &Connection,
    scope: ParticipantScope,
) -> Result<Vec<AppointmentListing>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS},
                d.full_name, dp.id IS NOT NULL, dp.specialization,
                p.full_name
         FROM appointments a
         LEFT JOIN users d ON d.id = a.doctor_id
         LEFT JOIN doctor_profiles dp ON dp.user_id = d.id
         LEFT JOIN users p ON p.id = a.patient_id
         WHERE a.{} = ?1
         ORDER BY a.appointment_time DESC, a.rowid DESC",
        scope.column()
    ))?;

    let rows = stmt
        .query_map(params![scope.user_id().to_string()], |row| {
            let doctor_name: Option<String> = row.get(9)?;
            let has_profile: bool = row.get(10)?;
            let doctor = match doctor_name {
                Some(full_name) => Some(DoctorRef {
                    full_name,
                    doctor_profile: if has_profile {
                        Some(SpecializationRef {
                            specialization: row.get(11)?,
                        })
                    } else {
                        None
                    },
                }),
                None => None,
            };
            let patient = row
                .get::<_, Option<String>>(12)?
                .map(|full_name| PersonRef { full_name });

            Ok(AppointmentListing {
                appointment: map_appointment(row)?,
                doctor,
                patient,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}
