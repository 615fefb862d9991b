//! API endpoint handlers.
//!
//! One module per resource. Handlers open a connection, call the matching
//! `clinic` operation and shape the response.

pub mod appointments;
pub mod auth;
pub mod feedbacks;
pub mod health;
pub mod nlp_results;
pub mod profiles;
pub mod remarks;
pub mod users;
pub mod visits;
