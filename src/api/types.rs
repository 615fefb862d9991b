//! Shared API types.

use std::sync::Arc;

use serde::Serialize;

use crate::core_state::CoreState;

/// Shared context for API handlers and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

/// Success envelope carrying a message next to the payload.
#[derive(Debug, Serialize)]
pub struct Message<T> {
    pub message: &'static str,
    #[serde(flatten)]
    pub data: T,
}

impl<T> Message<T> {
    pub fn new(message: &'static str, data: T) -> Self {
        Self { message, data }
    }
}
