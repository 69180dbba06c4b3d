pub mod account;
pub mod health;
pub mod profile;
pub mod session;

use parcelbox_auth_types::identity::SessionClaims;

use crate::domain::types::Caller;
use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::session::ResolveCallerUseCase;

/// Resolve the live caller behind validated claims.
pub(crate) async fn resolve_caller(
    state: &AppState,
    claims: SessionClaims,
) -> Result<Caller, AuthServiceError> {
    ResolveCallerUseCase {
        accounts: state.account_repo(),
        sessions: state.session_repo(),
        profiles: state.profile_repo(),
    }
    .execute(claims.0)
    .await
}
