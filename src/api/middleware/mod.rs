//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Auth validator: bearer token, injects `Caller`
//! 2. Audit logger: logs after auth, has the caller id
//! 3. Role guard: per route, doctor or patient only

pub mod audit;
pub mod auth;
