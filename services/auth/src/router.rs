use axum::{
    Router,
    routing::{get, patch, post},
};

use parcelbox_core::health::healthz;
use parcelbox_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    account::create_account,
    health::readyz,
    profile::{create_profile, get_profile, profile_events, update_profile},
    session::{current_session, sign_in, sign_out},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Accounts
        .route("/auth/accounts", post(create_account))
        // Session
        .route(
            "/auth/session",
            post(sign_in).get(current_session).delete(sign_out),
        )
        // Profiles
        .route("/profiles", post(create_profile))
        .route("/profiles/{id}", get(get_profile))
        .route("/profiles/{id}", patch(update_profile))
        .route("/profiles/{id}/events", get(profile_events))
        .with_state(state)
        // Layers run bottom-up on requests: request id first, so the trace span sees it.
        .layer(propagate_request_id_layer())
        .layer(trace_layer())
        .layer(request_id_layer())
}
