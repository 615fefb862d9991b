use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::uuid_col;
use crate::db::DatabaseError;
use crate::models::*;

fn map_remark(row: &Row<'_>) -> rusqlite::Result<Remark> {
    let tags: String = row.get(4)?;
    let symptom_tags = serde_json::from_str(&tags).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Remark {
        id: uuid_col(row, 0)?,
        visit_id: uuid_col(row, 1)?,
        doctor_id: uuid_col(row, 2)?,
        raw_text: row.get(3)?,
        symptom_tags,
        created_at: row.get(5)?,
    })
}

pub fn insert_remark(conn: &Connection, remark: &Remark) -> Result<(), DatabaseError> {
    let tags = serde_json::to_string(&remark.symptom_tags)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
    conn.execute(
        "INSERT INTO remarks (id, visit_id, doctor_id, raw_text, symptom_tags, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            remark.id.to_string(),
            remark.visit_id.to_string(),
            remark.doctor_id.to_string(),
            remark.raw_text,
            tags,
            remark.created_at,
        ],
    )?;
    Ok(())
}

/// Remarks on one visit, oldest first, each with its author's name.
pub fn list_remarks_for_visit(
    conn: &Connection,
    visit_id: &Uuid,
) -> Result<Vec<RemarkListing>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.visit_id, r.doctor_id, r.raw_text, r.symptom_tags, r.created_at, d.full_name
         FROM remarks r
         JOIN users d ON d.id = r.doctor_id
         WHERE r.visit_id = ?1
         ORDER BY r.created_at ASC, r.rowid ASC",
    )?;

    let rows = stmt
        .query_map(params![visit_id.to_string()], |row| {
            Ok(RemarkListing {
                remark: map_remark(row)?,
                doctor: PersonRef {
                    full_name: row.get(6)?,
                },
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}
