//! Doctor remarks on visits.

use chrono::Utc;
use rusqlite::Connection;
use serde::Deserialize;
use uuid::Uuid;

use super::{parse_body_id, parse_path_id, present, ClinicError};
use crate::authorization::{self, Caller};
use crate::db::repository;
use crate::models::*;

const NOT_OWN_VISIT: &str = "You can only add remarks to your own visits.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRemark {
    pub visit_id: Option<String>,
    pub raw_text: Option<String>,
    pub symptom_tags: Option<Vec<String>>,
}

/// Add a remark to one of the caller's own visits. A missing visit and
/// someone else's visit are both refused as forbidden.
pub fn create_remark(
    conn: &Connection,
    caller: &Caller,
    input: &NewRemark,
) -> Result<Remark, ClinicError> {
    let (Some(visit_id), Some(raw_text)) = (
        present(input.visit_id.as_deref()),
        present(input.raw_text.as_deref()),
    ) else {
        return Err(ClinicError::Validation(
            "Visit ID and remark text are required.".into(),
        ));
    };
    let visit_id = parse_body_id(visit_id, "visit id")?;

    let visit = repository::get_visit(conn, &visit_id)?;
    let participants = visit.as_ref().map(Visit::participants);
    let decision = authorization::can_add_remark(caller, participants.as_ref());
    if !decision.allowed {
        tracing::warn!(
            user_id = %caller.user_id,
            visit_id = %visit_id,
            reason = ?decision.reason,
            "Remark refused"
        );
        return Err(ClinicError::Forbidden(NOT_OWN_VISIT.into()));
    }

    let remark = Remark {
        id: Uuid::new_v4(),
        visit_id,
        doctor_id: caller.user_id,
        raw_text: raw_text.to_string(),
        symptom_tags: input.symptom_tags.clone().unwrap_or_default(),
        created_at: Utc::now(),
    };
    repository::insert_remark(conn, &remark)?;
    Ok(remark)
}

/// Remarks on a visit, oldest first, for either participant.
pub fn remarks_for_visit(
    conn: &Connection,
    caller: &Caller,
    visit_id: &str,
) -> Result<Vec<RemarkListing>, ClinicError> {
    const NOT_FOUND: &str = "Visit not found.";
    let visit_id = parse_path_id(visit_id, NOT_FOUND)?;

    let visit = repository::get_visit(conn, &visit_id)?
        .ok_or_else(|| ClinicError::NotFound(NOT_FOUND.into()))?;
    let decision = authorization::can_read_remarks(caller, Some(&visit.participants()));
    if !decision.allowed {
        tracing::warn!(
            user_id = %caller.user_id,
            visit_id = %visit_id,
            reason = ?decision.reason,
            "Remark read refused"
        );
        return Err(ClinicError::Forbidden(
            "Access denied. You are not part of this visit.".into(),
        ));
    }

    Ok(repository::list_remarks_for_visit(conn, &visit_id)?)
}
