//! API router.
//!
//! Returns a composable `Router`: the liveness route at `/` and every
//! resource under `/api/`.
//!
//! Middleware stack on protected routes (outermost → innermost):
//! 1. Auth validator → 2. Audit logger → 3. Role guard (per route)

use std::sync::Arc;

use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::middleware::auth::{require_doctor, require_patient};
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    // Protected routes: bearer token required, role guards per method.
    //
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route(
            "/users/me",
            get(endpoints::users::me).put(endpoints::users::update_me),
        )
        .route(
            "/profiles/patients/me",
            get(endpoints::profiles::my_patient_profile).route_layer(from_fn(require_patient)),
        )
        .route(
            "/appointments",
            get(endpoints::appointments::list).post(endpoints::appointments::create),
        )
        .route(
            "/visits",
            get(endpoints::visits::list)
                .merge(post(endpoints::visits::create).route_layer(from_fn(require_doctor))),
        )
        .route(
            "/feedbacks",
            post(endpoints::feedbacks::create).route_layer(from_fn(require_patient)),
        )
        .route(
            "/feedbacks/:visitId",
            get(endpoints::feedbacks::for_visit).route_layer(from_fn(require_doctor)),
        )
        .route(
            "/remarks",
            post(endpoints::remarks::create).route_layer(from_fn(require_doctor)),
        )
        .route("/remarks/:visitId", get(endpoints::remarks::for_visit))
        .route(
            "/nlp-results/:resultId",
            get(endpoints::nlp_results::get).route_layer(from_fn(require_doctor)),
        )
        .with_state(ctx.clone())
        // Middleware stack (innermost first, outermost last):
        .layer(from_fn(middleware::audit::log_access))
        .layer(from_fn(middleware::auth::require_auth))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx.clone()));

    // Public routes (no auth)
    let public = Router::new()
        .route("/auth/register", post(endpoints::auth::register))
        .route("/auth/login", post(endpoints::auth::login))
        .route("/profiles/doctors", get(endpoints::profiles::doctors))
        .route("/profiles/doctors/:doctorId", get(endpoints::profiles::doctor))
        .with_state(ctx.clone())
        .layer(from_fn(middleware::audit::log_access))
        .layer(axum::Extension(ctx));

    Router::new()
        .route("/", get(endpoints::health::root))
        .nest("/api", protected.merge(public))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
