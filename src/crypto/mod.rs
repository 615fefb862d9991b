pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenError, TokenSigner};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Password cost {0} outside supported range")]
    InvalidCost(u32),

    #[error("Malformed password hash")]
    MalformedHash,

    #[error("Token signing failed: {0}")]
    Signing(String),
}
