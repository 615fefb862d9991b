//! Shared application state.
//!
//! `CoreState` holds everything a request needs: the injected database
//! handle, the token signer and the password cost. Built once at startup
//! and wrapped in `Arc` for the router.

use chrono::Duration;

use crate::config::Config;
use crate::crypto::password::COST_RANGE;
use crate::crypto::TokenSigner;
use crate::db::{self, Database, DbConn};

pub struct CoreState {
    db: Database,
    tokens: TokenSigner,
    /// Cost factor for newly hashed passwords.
    pub password_cost: u32,
}

impl CoreState {
    pub fn new(db: Database, tokens: TokenSigner, password_cost: u32) -> Self {
        Self {
            db,
            tokens,
            password_cost,
        }
    }

    /// Open the configured database (running migrations) and build state.
    pub fn from_config(config: &Config) -> Result<Self, CoreError> {
        let db = Database::open_location(&config.database)?;
        let tokens = TokenSigner::new(
            config.jwt_secret.as_bytes(),
            Duration::hours(config.token_ttl_hours),
        );
        Ok(Self::new(db, tokens, config.password_cost))
    }

    /// In-memory database, throwaway secret and the cheapest hash cost.
    pub fn in_memory(secret: &str) -> Result<Self, CoreError> {
        let db = Database::open_in_memory()?;
        let tokens = TokenSigner::new(secret, Duration::hours(24));
        Ok(Self::new(db, tokens, *COST_RANGE.start()))
    }

    /// Borrow a database connection for one unit of work.
    ///
    /// Never hold the returned connection across an `.await`: in-memory
    /// databases hand out a shared, locked connection.
    pub fn open_db(&self) -> Result<DbConn<'_>, CoreError> {
        self.db.connect().map_err(CoreError::Database)
    }

    pub fn tokens(&self) -> &TokenSigner {
        &self.tokens
    }
}

/// Errors from core state operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
}
