//! Service plumbing shared by Parcelbox binaries: error responses, health probes,
//! request-id/trace layers, tracing setup and serde helpers.

pub mod error;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
