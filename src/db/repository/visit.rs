use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::uuid_col;
use crate::db::DatabaseError;
use crate::models::*;

const VISIT_COLUMNS: &str = "v.id, v.appointment_id, v.patient_id, v.doctor_id, v.visit_time,
    v.diagnosis_code, v.diagnosis_text, v.prescription, v.follow_up_reco, v.created_at";

fn map_visit(row: &Row<'_>) -> rusqlite::Result<Visit> {
    Ok(Visit {
        id: uuid_col(row, 0)?,
        appointment_id: uuid_col(row, 1)?,
        patient_id: uuid_col(row, 2)?,
        doctor_id: uuid_col(row, 3)?,
        visit_time: row.get(4)?,
        diagnosis_code: row.get(5)?,
        diagnosis_text: row.get(6)?,
        prescription: row.get(7)?,
        follow_up_reco: row.get(8)?,
        created_at: row.get(9)?,
    })
}

pub fn insert_visit(conn: &Connection, visit: &Visit) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO visits (id, appointment_id, patient_id, doctor_id, visit_time,
         diagnosis_code, diagnosis_text, prescription, follow_up_reco, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            visit.id.to_string(),
            visit.appointment_id.to_string(),
            visit.patient_id.to_string(),
            visit.doctor_id.to_string(),
            visit.visit_time,
            visit.diagnosis_code,
            visit.diagnosis_text,
            visit.prescription,
            visit.follow_up_reco,
            visit.created_at,
        ],
    )?;
    Ok(())
}

pub fn get_visit(conn: &Connection, id: &Uuid) -> Result<Option<Visit>, DatabaseError> {
    let visit = conn
        .query_row(
            &format!("SELECT {VISIT_COLUMNS} FROM visits v WHERE v.id = ?1"),
            params![id.to_string()],
            map_visit,
        )
        .optional()?;
    Ok(visit)
}

/// Visits on the caller's side, newest first.
pub fn list_visits_for(
    conn: &Connection,
    scope: ParticipantScope,
) -> Result<Vec<VisitListing>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {VISIT_COLUMNS}, d.full_name, p.full_name, a.appointment_time, a.reason
         FROM visits v
         JOIN users d ON d.id = v.doctor_id
         JOIN users p ON p.id = v.patient_id
         JOIN appointments a ON a.id = v.appointment_id
         WHERE v.{} = ?1
         ORDER BY v.visit_time DESC, v.rowid DESC",
        scope.column()
    ))?;

    let rows = stmt
        .query_map(params![scope.user_id().to_string()], |row| {
            Ok(VisitListing {
                visit: map_visit(row)?,
                doctor: PersonRef {
                    full_name: row.get(10)?,
                },
                patient: PersonRef {
                    full_name: row.get(11)?,
                },
                appointment: AppointmentRef {
                    appointment_time: row.get(12)?,
                    reason: row.get(13)?,
                },
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Appointments, visits, remarks and feedback that reference the user.
pub fn count_clinical_records_for_user(conn: &Connection, user_id: &Uuid) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT
            (SELECT COUNT(*) FROM appointments WHERE patient_id = ?1 OR doctor_id = ?1)
          + (SELECT COUNT(*) FROM visits WHERE patient_id = ?1 OR doctor_id = ?1)
          + (SELECT COUNT(*) FROM remarks WHERE doctor_id = ?1)
          + (SELECT COUNT(*) FROM feedbacks WHERE patient_id = ?1)",
        params![user_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}
