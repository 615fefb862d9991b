use uuid::Uuid;

use super::enums::Role;

/// Which side of a record a caller sits on. Drives the "my appointments"
/// and "my visits" filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantScope {
    Doctor(Uuid),
    Patient(Uuid),
}

impl ParticipantScope {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        match role {
            Role::Doctor => Self::Doctor(user_id),
            Role::Patient => Self::Patient(user_id),
        }
    }

    /// Column holding the caller's id on appointments and visits.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Doctor(_) => "doctor_id",
            Self::Patient(_) => "patient_id",
        }
    }

    pub fn user_id(&self) -> Uuid {
        match self {
            Self::Doctor(id) | Self::Patient(id) => *id,
        }
    }
}
