use axum::extract::FromRef;
use sea_orm::DatabaseConnection;
use tokio::sync::broadcast;

use parcelbox_auth_types::identity::TokenSecret;
use parcelbox_domain::profile::Profile;

use crate::infra::db::{DbAccountRepository, DbProfileRepository, DbSessionRepository};

/// Buffered profile changes per event-stream subscriber before it starts lagging.
const PROFILE_EVENTS_CAPACITY: usize = 64;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: TokenSecret,
    pub cookie_domain: String,
    pub session_ttl_secs: u64,
    /// Every profile written through `PATCH /profiles/{id}`.
    pub profile_events: broadcast::Sender<Profile>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        jwt_secret: impl Into<String>,
        cookie_domain: impl Into<String>,
        session_ttl_secs: u64,
    ) -> Self {
        let (profile_events, _) = broadcast::channel(PROFILE_EVENTS_CAPACITY);
        Self {
            db,
            jwt_secret: TokenSecret::new(jwt_secret.into()),
            cookie_domain: cookie_domain.into(),
            session_ttl_secs,
            profile_events,
        }
    }

    pub fn account_repo(&self) -> DbAccountRepository {
        DbAccountRepository {
            db: self.db.clone(),
        }
    }

    pub fn session_repo(&self) -> DbSessionRepository {
        DbSessionRepository {
            db: self.db.clone(),
        }
    }

    pub fn profile_repo(&self) -> DbProfileRepository {
        DbProfileRepository {
            db: self.db.clone(),
        }
    }
}

impl FromRef<AppState> for TokenSecret {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_secret.clone()
    }
}
