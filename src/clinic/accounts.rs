//! Registration, login and the caller's own account.

use chrono::Utc;
use rusqlite::{Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{parse_date, present, ClinicError};
use crate::authorization::Caller;
use crate::crypto::{hash_password, verify_password, TokenSigner};
use crate::db::repository;
use crate::models::*;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Everything a user may change about themselves. Fields that do not
/// apply to the caller's role are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    // patient
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub medical_history: Option<String>,
    // doctor
    pub specialization: Option<String>,
    pub registration_no: Option<String>,
    pub available_slots: Option<serde_json::Value>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

/// Create an account. The password is hashed with `cost` before storage
/// and never returned.
pub fn register(conn: &Connection, input: &Registration, cost: u32) -> Result<User, ClinicError> {
    let (Some(email), Some(password), Some(full_name), Some(role)) = (
        present(input.email.as_deref()),
        present(input.password.as_deref()),
        present(input.full_name.as_deref()),
        present(input.role.as_deref()),
    ) else {
        return Err(ClinicError::Validation(
            "Please provide email, password, full name, and role.".into(),
        ));
    };

    let role: Role = role
        .parse()
        .map_err(|_| ClinicError::Validation("Role must be PATIENT or DOCTOR.".into()))?;

    if repository::email_exists(conn, email)? {
        return Err(ClinicError::EmailTaken);
    }

    let password_hash = hash_password(password, cost)?;
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        full_name: full_name.to_string(),
        phone: None,
        role,
        created_at: now,
        updated_at: now,
    };

    // A concurrent registration can still win between the check and the insert
    repository::insert_user(conn, &user, &password_hash).map_err(|e| {
        if e.is_unique_violation() {
            ClinicError::EmailTaken
        } else {
            e.into()
        }
    })?;

    tracing::info!(user_id = %user.id, role = %user.role, "User registered");
    Ok(user)
}

/// Check credentials and issue a bearer token. Unknown email and wrong
/// password fail identically.
pub fn login(
    conn: &Connection,
    tokens: &TokenSigner,
    input: &Credentials,
) -> Result<Session, ClinicError> {
    let (Some(email), Some(password)) = (
        present(input.email.as_deref()),
        present(input.password.as_deref()),
    ) else {
        return Err(ClinicError::Validation(
            "Please provide email and password.".into(),
        ));
    };

    let Some((user, password_hash)) = repository::get_credentials_by_email(conn, email)? else {
        return Err(ClinicError::InvalidCredentials);
    };
    if !verify_password(password, &password_hash)? {
        return Err(ClinicError::InvalidCredentials);
    }

    let token = tokens.issue(user.id, user.role)?;
    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Session { token, user })
}

fn load_with_profile(conn: &Connection, user_id: &Uuid) -> Result<Option<UserWithProfile>, ClinicError> {
    let Some(user) = repository::get_user(conn, user_id)? else {
        return Ok(None);
    };
    let profile = match user.role {
        Role::Patient => RoleProfile::Patient(repository::get_patient_profile(conn, user_id)?),
        Role::Doctor => RoleProfile::Doctor(repository::get_doctor_profile(conn, user_id)?),
    };
    Ok(Some(UserWithProfile { user, profile }))
}

pub fn get_me(conn: &Connection, caller: &Caller) -> Result<UserWithProfile, ClinicError> {
    load_with_profile(conn, &caller.user_id)?
        .ok_or_else(|| ClinicError::NotFound("User profile not found.".into()))
}

/// Update contact fields and upsert the role profile in one transaction,
/// then return the combined record.
pub fn update_me(
    conn: &mut Connection,
    caller: &Caller,
    input: &ProfileUpdate,
) -> Result<UserWithProfile, ClinicError> {
    let dob = present(input.dob.as_deref())
        .map(|d| parse_date(d, "date of birth"))
        .transpose()?;
    let now = Utc::now();

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let found = repository::update_user_contact(
        &tx,
        &caller.user_id,
        present(input.full_name.as_deref()),
        input.phone.as_deref(),
        now,
    )?;
    if !found {
        return Err(ClinicError::NotFound("User profile not found.".into()));
    }

    // The stored role is authoritative over the token's claim
    let role = repository::get_user(&tx, &caller.user_id)?
        .map(|u| u.role)
        .unwrap_or(caller.role);

    match role {
        Role::Patient => {
            let changes = PatientProfileChanges {
                dob,
                gender: input.gender.clone(),
                address: input.address.clone(),
                emergency_contact: input.emergency_contact.clone(),
                medical_history: input.medical_history.clone(),
            };
            repository::upsert_patient_profile(&tx, &caller.user_id, &changes, now)?;
        }
        Role::Doctor => {
            let changes = DoctorProfileChanges {
                specialization: input.specialization.clone(),
                registration_no: input.registration_no.clone(),
                available_slots: input.available_slots.clone(),
                bio: input.bio.clone(),
                location: input.location.clone(),
            };
            repository::upsert_doctor_profile(&tx, &caller.user_id, &changes, now)?;
        }
    }

    let updated = load_with_profile(&tx, &caller.user_id)?
        .ok_or_else(|| ClinicError::NotFound("User profile not found.".into()))?;
    tx.commit()?;

    tracing::info!(user_id = %caller.user_id, "Profile updated");
    Ok(updated)
}
