use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;

use parcelbox_auth_types::cookie::{clear_session_cookie, set_session_cookie};
use parcelbox_auth_types::identity::SessionClaims;
use parcelbox_auth_types::wire::{SessionResponse, SignInRequest};

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::session::{CurrentSessionUseCase, SignInInput, SignInUseCase, SignOutUseCase};

// ── POST /auth/session ────────────────────────────────────────────────────────

pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<SignInRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = SignInUseCase {
        accounts: state.account_repo(),
        sessions: state.session_repo(),
        jwt_secret: state.jwt_secret.0.to_string(),
        session_ttl_secs: state.session_ttl_secs,
    };

    let out = usecase
        .execute(SignInInput {
            email: body.email,
            password: body.password,
        })
        .await?;

    let jar = set_session_cookie(
        jar,
        out.access_token.clone(),
        state.cookie_domain.clone(),
        state.session_ttl_secs,
    );
    let body = SessionResponse {
        access_token: out.access_token,
        expires_at: out.expires_at,
        identity: out.identity,
    };

    Ok((StatusCode::CREATED, jar, Json(body)))
}

// ── GET /auth/session ─────────────────────────────────────────────────────────

pub async fn current_session(
    State(state): State<AppState>,
    SessionClaims(token): SessionClaims,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = CurrentSessionUseCase {
        accounts: state.account_repo(),
        sessions: state.session_repo(),
    };
    let identity = usecase.execute(token).await?;
    Ok(Json(identity))
}

// ── DELETE /auth/session ──────────────────────────────────────────────────────

pub async fn sign_out(
    State(state): State<AppState>,
    SessionClaims(token): SessionClaims,
    jar: CookieJar,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = SignOutUseCase {
        sessions: state.session_repo(),
    };
    usecase.execute(token).await?;

    let jar = clear_session_cookie(jar, state.cookie_domain.clone());
    Ok((StatusCode::NO_CONTENT, jar))
}
