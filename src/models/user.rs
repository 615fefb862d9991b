use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Role;
use super::profile::{DoctorProfile, PatientProfile};

/// A registered account. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The role-specific profile attached to a user, serialized under
/// `patient_profile` or `doctor_profile`.
#[derive(Debug, Clone, Serialize)]
pub enum RoleProfile {
    #[serde(rename = "patient_profile")]
    Patient(Option<PatientProfile>),
    #[serde(rename = "doctor_profile")]
    Doctor(Option<DoctorProfile>),
}

#[derive(Debug, Clone, Serialize)]
pub struct UserWithProfile {
    #[serde(flatten)]
    pub user: User,
    #[serde(flatten)]
    pub profile: RoleProfile,
}
