use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub medical_history: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub specialization: Option<String>,
    pub registration_no: Option<String>,
    /// Free-form slot description supplied by the doctor (JSON).
    pub available_slots: Option<serde_json::Value>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields a patient may change on their own profile.
#[derive(Debug, Clone, Default)]
pub struct PatientProfileChanges {
    pub dob: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub medical_history: Option<String>,
}

/// Fields a doctor may change on their own profile.
#[derive(Debug, Clone, Default)]
pub struct DoctorProfileChanges {
    pub specialization: Option<String>,
    pub registration_no: Option<String>,
    pub available_slots: Option<serde_json::Value>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

// ═══════════════════════════════════════════════════════════
// Public directory projections
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct DoctorCard {
    pub specialization: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

/// Entry in the public doctor list.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorSummary {
    pub id: Uuid,
    pub full_name: String,
    pub doctor_profile: Option<DoctorCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorDetail {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub doctor_profile: Option<DoctorProfile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactInfo {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientProfileWithUser {
    #[serde(flatten)]
    pub profile: PatientProfile,
    pub user: ContactInfo,
}
