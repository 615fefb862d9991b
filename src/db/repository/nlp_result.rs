use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{opt_uuid_col, uuid_col};
use crate::db::DatabaseError;
use crate::models::*;

/// Written by the NLP pipeline; the server only reads these rows.
pub fn insert_nlp_result(conn: &Connection, result: &NlpResult) -> Result<(), DatabaseError> {
    let payload = serde_json::to_string(&result.payload)
        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?;
    conn.execute(
        "INSERT INTO nlp_results (id, source_type, remark_id, feedback_id, payload, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            result.id.to_string(),
            result.source_type,
            result.remark_id.map(|id| id.to_string()),
            result.feedback_id.map(|id| id.to_string()),
            payload,
            result.created_at,
        ],
    )?;
    Ok(())
}

/// The result plus the participants of the visit its source belongs to.
/// Participants are `None` when the source chain is broken.
pub fn get_nlp_result_with_visit(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<(NlpResult, Option<VisitParticipants>)>, DatabaseError> {
    let found = conn
        .query_row(
            "SELECT n.id, n.source_type, n.remark_id, n.feedback_id, n.payload, n.created_at,
                    v.patient_id, v.doctor_id
             FROM nlp_results n
             LEFT JOIN remarks r ON r.id = n.remark_id
             LEFT JOIN feedbacks f ON f.id = n.feedback_id
             LEFT JOIN visits v ON v.id = COALESCE(r.visit_id, f.visit_id)
             WHERE n.id = ?1",
            params![id.to_string()],
            |row| {
                let payload: String = row.get(4)?;
                let payload = serde_json::from_str(&payload).map_err(|e| {
                    tracing::error!(
                        result_id = %id,
                        error = %e,
                        "Stored NLP payload is not valid JSON"
                    );
                    rusqlite::Error::FromSqlConversionFailure(
                        4,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?;
                let result = NlpResult {
                    id: uuid_col(row, 0)?,
                    source_type: row.get(1)?,
                    remark_id: opt_uuid_col(row, 2)?,
                    feedback_id: opt_uuid_col(row, 3)?,
                    payload,
                    created_at: row.get(5)?,
                };
                let participants = match (opt_uuid_col(row, 6)?, opt_uuid_col(row, 7)?) {
                    (Some(patient_id), Some(doctor_id)) => Some(VisitParticipants {
                        patient_id,
                        doctor_id,
                    }),
                    _ => None,
                };
                Ok((result, participants))
            },
        )
        .optional()?;
    Ok(found)
}
