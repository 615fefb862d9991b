//! Clinic operations: one sub-module per resource.
//!
//! Operations validate input, apply the access policy and run the
//! repository calls. They know nothing about HTTP; the API layer maps
//! [`ClinicError`] onto status codes.

pub mod accounts;
pub mod appointments;
pub mod directory;
pub mod feedback;
pub mod maintenance;
pub mod nlp;
pub mod remarks;
pub mod visits;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::crypto::CryptoError;
use crate::db::DatabaseError;

#[derive(Debug, thiserror::Error)]
pub enum ClinicError {
    #[error("{0}")]
    Validation(String),
    #[error("User with this email already exists.")]
    EmailTaken,
    #[error("Invalid credentials.")]
    InvalidCredentials,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Feedback for this visit has already been submitted.")]
    AlreadySubmitted,
    #[error("{0}")]
    Conflict(String),
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

impl From<rusqlite::Error> for ClinicError {
    fn from(err: rusqlite::Error) -> Self {
        ClinicError::Database(err.into())
    }
}

// ═══════════════════════════════════════════════════════════
// Input parsing
// ═══════════════════════════════════════════════════════════

/// A non-empty string, or `None` when absent or blank.
pub(crate) fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// Parse a UUID supplied in a request body.
pub(crate) fn parse_body_id(value: &str, field: &str) -> Result<Uuid, ClinicError> {
    Uuid::parse_str(value.trim())
        .map_err(|_| ClinicError::Validation(format!("Invalid {field}.")))
}

/// Accepts RFC 3339, or a naive `YYYY-MM-DDTHH:MM[:SS]` taken as UTC.
pub(crate) fn parse_timestamp(value: &str, field: &str) -> Result<DateTime<Utc>, ClinicError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(ClinicError::Validation(format!("Invalid {field}.")))
}

/// Accepts `YYYY-MM-DD` or the date part of an RFC 3339 timestamp.
pub(crate) fn parse_date(value: &str, field: &str) -> Result<NaiveDate, ClinicError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).date_naive())
        })
        .ok_or_else(|| ClinicError::Validation(format!("Invalid {field}.")))
}

/// Parse a UUID taken from a URL path. Unparseable ids name nothing, so
/// they read as "not found".
pub(crate) fn parse_path_id(value: &str, not_found: &str) -> Result<Uuid, ClinicError> {
    Uuid::parse_str(value).map_err(|_| ClinicError::NotFound(not_found.to_string()))
}
