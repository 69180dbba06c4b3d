//! Externally-managed account reference.

use serde::{Deserialize, Serialize};

use crate::id::IdentityId;

/// Authenticated account as reported by the auth backend.
///
/// Owned and mutated by the backend only; everything else holds a read-only copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    pub email: String,
    pub email_verified: bool,
}
