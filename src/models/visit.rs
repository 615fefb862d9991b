use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::appointment::PersonRef;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub visit_time: DateTime<Utc>,
    pub diagnosis_code: Option<String>,
    pub diagnosis_text: Option<String>,
    pub prescription: Option<String>,
    pub follow_up_reco: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The two participants of a visit, all that access checks need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisitParticipants {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
}

impl Visit {
    pub fn participants(&self) -> VisitParticipants {
        VisitParticipants {
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRef {
    pub appointment_time: DateTime<Utc>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisitListing {
    #[serde(flatten)]
    pub visit: Visit,
    pub doctor: PersonRef,
    pub patient: PersonRef,
    pub appointment: AppointmentRef,
}
