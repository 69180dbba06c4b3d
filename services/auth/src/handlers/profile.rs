use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
};
use futures::stream::{self, Stream};
use serde::Deserialize;
use tokio::sync::broadcast::{self, error::RecvError};

use parcelbox_auth_types::identity::SessionClaims;
use parcelbox_auth_types::wire::PROFILE_CHANGED_EVENT;
use parcelbox_domain::id::IdentityId;
use parcelbox_domain::profile::{Profile, ProfileUpdate};

use crate::error::AuthServiceError;
use crate::handlers::resolve_caller;
use crate::state::AppState;
use crate::usecase::profile::{
    CreateProfileInput, CreateProfileUseCase, GetProfileUseCase, UpdateProfileUseCase,
};

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

// ── GET /profiles/{id} ────────────────────────────────────────────────────────

pub async fn get_profile(
    State(state): State<AppState>,
    claims: SessionClaims,
    Path(id): Path<IdentityId>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let caller = resolve_caller(&state, claims).await?;
    let usecase = GetProfileUseCase {
        profiles: state.profile_repo(),
    };
    Ok(Json(usecase.execute(caller, id).await?))
}

// ── POST /profiles ────────────────────────────────────────────────────────────

/// Accepts a full profile document too; fields other than these are ignored.
#[derive(Deserialize)]
pub struct CreateProfileRequest {
    pub id: IdentityId,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

pub async fn create_profile(
    State(state): State<AppState>,
    claims: SessionClaims,
    Json(body): Json<CreateProfileRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let caller = resolve_caller(&state, claims).await?;
    let usecase = CreateProfileUseCase {
        accounts: state.account_repo(),
        profiles: state.profile_repo(),
    };
    let profile = usecase
        .execute(
            caller,
            CreateProfileInput {
                id: body.id,
                first_name: body.first_name,
                last_name: body.last_name,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

// ── PATCH /profiles/{id} ──────────────────────────────────────────────────────

pub async fn update_profile(
    State(state): State<AppState>,
    claims: SessionClaims,
    Path(id): Path<IdentityId>,
    Json(body): Json<ProfileUpdate>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let caller = resolve_caller(&state, claims).await?;
    let usecase = UpdateProfileUseCase {
        profiles: state.profile_repo(),
    };
    let profile = usecase.execute(caller, id, body).await?;

    // No receivers is the common case, not an error.
    let _ = state.profile_events.send(profile.clone());
    Ok(Json(profile))
}

// ── GET /profiles/{id}/events ─────────────────────────────────────────────────

pub async fn profile_events(
    State(state): State<AppState>,
    claims: SessionClaims,
    Path(id): Path<IdentityId>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let caller = resolve_caller(&state, claims).await?;
    if !caller.can_access(id) {
        return Err(AuthServiceError::Forbidden);
    }

    let rx = state.profile_events.subscribe();
    tracing::debug!(identity_id = %id, "profile event stream opened");
    Ok(Sse::new(profile_stream(rx, id)).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL)))
}

/// Changes to profile `id`, as `profile_changed` events carrying the full profile.
fn profile_stream(
    rx: broadcast::Receiver<Profile>,
    id: IdentityId,
) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(rx, move |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(profile) if profile.id == id => {
                    let event = match Event::default().event(PROFILE_CHANGED_EVENT).json_data(&profile) {
                        Ok(event) => event,
                        Err(e) => {
                            tracing::error!(error = %e, identity_id = %id, "failed to encode profile event");
                            continue;
                        }
                    };
                    return Some((Ok(event), rx));
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(identity_id = %id, skipped, "profile event stream lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
}
