//! Account service: password accounts, server-side sessions behind signed access
//! tokens, and the profile records the session store reads and watches.

pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod infra;
pub mod router;
pub mod state;
pub mod usecase;
