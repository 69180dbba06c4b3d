use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use parcelbox_auth_types::identity::SessionClaims;
use parcelbox_auth_types::wire::CreateAccountRequest;
use parcelbox_domain::profile::Role;

use crate::error::AuthServiceError;
use crate::handlers::resolve_caller;
use crate::state::AppState;
use crate::usecase::account::{CreateAccountInput, CreateAccountUseCase};

// ── POST /auth/accounts ───────────────────────────────────────────────────────

pub async fn create_account(
    State(state): State<AppState>,
    claims: Result<SessionClaims, StatusCode>,
    Json(body): Json<CreateAccountRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    // Only a staff role grant looks at the token; customer sign-up ignores it.
    let caller = match claims {
        Ok(claims) if body.role.is_some_and(|role| role != Role::Customer) => {
            Some(resolve_caller(&state, claims).await?)
        }
        _ => None,
    };

    let usecase = CreateAccountUseCase {
        accounts: state.account_repo(),
    };
    let identity = usecase
        .execute(
            caller,
            CreateAccountInput {
                email: body.email,
                password: body.password,
                first_name: body.first_name,
                last_name: body.last_name,
                role: body.role,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(identity)))
}
