//! Read access to NLP pipeline output.

use rusqlite::Connection;

use super::{parse_path_id, ClinicError};
use crate::authorization::{self, Caller};
use crate::db::repository;
use crate::models::NlpResult;

/// One NLP result, for the doctor of the visit its source belongs to.
pub fn get_nlp_result(
    conn: &Connection,
    caller: &Caller,
    result_id: &str,
) -> Result<NlpResult, ClinicError> {
    const NOT_FOUND: &str = "NLP result not found.";
    let id = parse_path_id(result_id, NOT_FOUND)?;

    let (result, visit) = repository::get_nlp_result_with_visit(conn, &id)?
        .ok_or_else(|| ClinicError::NotFound(NOT_FOUND.into()))?;

    let decision = authorization::can_read_nlp_result(caller, visit.as_ref());
    if !decision.allowed {
        tracing::warn!(
            user_id = %caller.user_id,
            result_id = %id,
            reason = ?decision.reason,
            "NLP result read refused"
        );
        return Err(ClinicError::Forbidden(
            "You are not authorized to view this result.".into(),
        ));
    }
    Ok(result)
}
