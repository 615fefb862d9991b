//! Per-endpoint access policy.
//!
//! Each check is a pure function of the caller and (where relevant) the
//! participants of the visit being touched. Default-deny: a missing visit
//! never grants access. Callers decide which HTTP status a denial maps to.

use uuid::Uuid;

use crate::models::{Role, VisitParticipants};

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Authenticated identity attached to a request by the auth middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// Why access was granted or denied. Logged with refusals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessReason {
    /// Caller holds the role the endpoint requires.
    RoleMatch,
    /// Caller is the doctor who ran the visit.
    VisitDoctor,
    /// Caller is the patient seen in the visit.
    VisitPatient,
    /// Caller lacks the required role.
    WrongRole,
    /// The visit does not exist.
    UnknownVisit,
    /// The visit exists but the caller is not on the required side of it.
    NotParticipant,
}

/// Result of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: AccessReason,
}

impl AccessDecision {
    fn allow(reason: AccessReason) -> Self {
        Self {
            allowed: true,
            reason,
        }
    }

    fn deny(reason: AccessReason) -> Self {
        Self {
            allowed: false,
            reason,
        }
    }

    fn deny_for(visit: Option<&VisitParticipants>) -> Self {
        match visit {
            Some(_) => Self::deny(AccessReason::NotParticipant),
            None => Self::deny(AccessReason::UnknownVisit),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Policies
// ═══════════════════════════════════════════════════════════

pub fn require_role(caller: &Caller, role: Role) -> AccessDecision {
    if caller.role == role {
        AccessDecision::allow(AccessReason::RoleMatch)
    } else {
        AccessDecision::deny(AccessReason::WrongRole)
    }
}

fn as_visit_doctor(caller: &Caller, visit: Option<&VisitParticipants>) -> Option<AccessDecision> {
    visit
        .filter(|v| caller.role == Role::Doctor && v.doctor_id == caller.user_id)
        .map(|_| AccessDecision::allow(AccessReason::VisitDoctor))
}

fn as_visit_patient(caller: &Caller, visit: Option<&VisitParticipants>) -> Option<AccessDecision> {
    visit
        .filter(|v| caller.role == Role::Patient && v.patient_id == caller.user_id)
        .map(|_| AccessDecision::allow(AccessReason::VisitPatient))
}

/// Only the visit's own doctor may annotate it.
pub fn can_add_remark(caller: &Caller, visit: Option<&VisitParticipants>) -> AccessDecision {
    as_visit_doctor(caller, visit).unwrap_or_else(|| AccessDecision::deny_for(visit))
}

/// Either participant of the visit may read its remarks.
pub fn can_read_remarks(caller: &Caller, visit: Option<&VisitParticipants>) -> AccessDecision {
    as_visit_doctor(caller, visit)
        .or_else(|| as_visit_patient(caller, visit))
        .unwrap_or_else(|| AccessDecision::deny_for(visit))
}

/// Only the patient seen in the visit may rate it.
pub fn can_submit_feedback(caller: &Caller, visit: Option<&VisitParticipants>) -> AccessDecision {
    as_visit_patient(caller, visit).unwrap_or_else(|| AccessDecision::deny_for(visit))
}

/// NLP output is readable by the doctor of the visit it was derived from.
pub fn can_read_nlp_result(caller: &Caller, visit: Option<&VisitParticipants>) -> AccessDecision {
    as_visit_doctor(caller, visit).unwrap_or_else(|| AccessDecision::deny_for(visit))
}
