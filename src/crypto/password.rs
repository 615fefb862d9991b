//! Adaptive password hashing (PBKDF2-HMAC-SHA256).
//!
//! Encoded form: `$pbkdf2-sha256$<cost>$<salt>$<hash>` with base64 salt and
//! hash. A cost of `c` means `2^(c + 6)` iterations, so cost 12 runs 262,144
//! rounds. Verification always uses the cost stored in the hash.

use std::ops::RangeInclusive;

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::CryptoError;

pub const COST_RANGE: RangeInclusive<u32> = 4..=20;
pub const SALT_LENGTH: usize = 16;
pub const HASH_LENGTH: usize = 32;

const SCHEME: &str = "pbkdf2-sha256";

fn iterations(cost: u32) -> u32 {
    1u32 << (cost + 6)
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str, cost: u32) -> Result<String, CryptoError> {
    if !COST_RANGE.contains(&cost) {
        return Err(CryptoError::InvalidCost(cost));
    }
    let salt = generate_salt();
    let hash = derive(password, &salt, cost);
    Ok(format!(
        "${SCHEME}${cost}${}${}",
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(hash)
    ))
}

/// Check a password against an encoded hash in constant time.
pub fn verify_password(password: &str, encoded: &str) -> Result<bool, CryptoError> {
    let parsed = ParsedHash::parse(encoded)?;
    let candidate = derive(password, &parsed.salt, parsed.cost);
    Ok(candidate[..].ct_eq(&parsed.hash[..]).into())
}

struct ParsedHash {
    cost: u32,
    salt: Vec<u8>,
    hash: Vec<u8>,
}

impl ParsedHash {
    fn parse(encoded: &str) -> Result<Self, CryptoError> {
        let mut parts = encoded.split('$');
        // Leading '$' yields an empty first segment
        if parts.next() != Some("") || parts.next() != Some(SCHEME) {
            return Err(CryptoError::MalformedHash);
        }
        let cost: u32 = parts
            .next()
            .and_then(|c| c.parse().ok())
            .filter(|c| COST_RANGE.contains(c))
            .ok_or(CryptoError::MalformedHash)?;
        let salt = parts
            .next()
            .and_then(|s| STANDARD_NO_PAD.decode(s).ok())
            .ok_or(CryptoError::MalformedHash)?;
        let hash = parts
            .next()
            .and_then(|h| STANDARD_NO_PAD.decode(h).ok())
            .filter(|h| h.len() == HASH_LENGTH)
            .ok_or(CryptoError::MalformedHash)?;
        if parts.next().is_some() {
            return Err(CryptoError::MalformedHash);
        }
        Ok(Self { cost, salt, hash })
    }
}

fn derive(password: &str, salt: &[u8], cost: u32) -> [u8; HASH_LENGTH] {
    let mut out = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations(cost), &mut out);
    out
}

fn generate_salt() -> [u8; SALT_LENGTH] {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn hash_then_verify() {
        let encoded = hash_password("pw123456", TEST_COST).unwrap();
        assert!(encoded.starts_with("$pbkdf2-sha256$4$"));
        assert!(verify_password("pw123456", &encoded).unwrap());
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let encoded = hash_password("pw123456", TEST_COST).unwrap();
        assert!(!verify_password("pw1234567", &encoded).unwrap());
        assert!(!verify_password("", &encoded).unwrap());
    }

    #[test]
    fn same_password_gets_different_salts() {
        let a = hash_password("same", TEST_COST).unwrap();
        let b = hash_password("same", TEST_COST).unwrap();
        assert_ne!(a, b);
        assert!(verify_password("same", &a).unwrap());
        assert!(verify_password("same", &b).unwrap());
    }

    #[test]
    fn cost_is_recorded_and_honoured() {
        let encoded = hash_password("pw", 5).unwrap();
        assert!(encoded.starts_with("$pbkdf2-sha256$5$"));
        assert!(verify_password("pw", &encoded).unwrap());
    }

    #[test]
    fn cost_twelve_is_accepted() {
        assert!(COST_RANGE.contains(&12));
        assert_eq!(iterations(12), 262_144);
    }

    #[test]
    fn out_of_range_cost_rejected() {
        assert!(matches!(hash_password("pw", 3), Err(CryptoError::InvalidCost(3))));
        assert!(matches!(hash_password("pw", 21), Err(CryptoError::InvalidCost(21))));
    }

    #[test]
    fn malformed_hashes_rejected() {
        for bad in [
            "",
            "plaintext",
            "$bcrypt$12$abc$def",
            "$pbkdf2-sha256$x$abc$def",
            "$pbkdf2-sha256$4$!!!$def",
            "$pbkdf2-sha256$4$c2FsdA$c2hvcnQ",
        ] {
            assert!(
                matches!(verify_password("pw", bad), Err(CryptoError::MalformedHash)),
                "accepted {bad:?}"
            );
        }
    }
}
