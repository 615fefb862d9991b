use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::uuid_col;
use crate::db::DatabaseError;
use crate::models::*;

fn map_feedback(row: &Row<'_>) -> rusqlite::Result<Feedback> {
    Ok(Feedback {
        id: uuid_col(row, 0)?,
        visit_id: uuid_col(row, 1)?,
        patient_id: uuid_col(row, 2)?,
        rating: row.get(3)?,
        comments: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Fails with a unique violation when the patient already rated the visit.
pub fn insert_feedback(conn: &Connection, feedback: &Feedback) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO feedbacks (id, visit_id, patient_id, rating, comments, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            feedback.id.to_string(),
            feedback.visit_id.to_string(),
            feedback.patient_id.to_string(),
            feedback.rating,
            feedback.comments,
            feedback.created_at,
        ],
    )?;
    Ok(())
}

/// Feedback on a visit, visible only when `doctor_id` ran that visit.
/// Any other doctor gets an empty list.
pub fn list_feedback_for_visit(
    conn: &Connection,
    visit_id: &Uuid,
    doctor_id: &Uuid,
) -> Result<Vec<FeedbackListing>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT f.id, f.visit_id, f.patient_id, f.rating, f.comments, f.created_at, p.full_name
         FROM feedbacks f
         JOIN visits v ON v.id = f.visit_id
         JOIN users p ON p.id = f.patient_id
         WHERE f.visit_id = ?1 AND v.doctor_id = ?2
         ORDER BY f.created_at ASC, f.rowid ASC",
    )?;

    let rows = stmt
        .query_map(params![visit_id.to_string(), doctor_id.to_string()], |row| {
            Ok(FeedbackListing {
                feedback: map_feedback(row)?,
                patient: PersonRef {
                    full_name: row.get(6)?,
                },
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

#[cfg(test)]
pub fn count_feedback_for_visit(conn: &Connection, visit_id: &Uuid) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM feedbacks WHERE visit_id = ?1",
        params![visit_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}
