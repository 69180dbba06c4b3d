//! Test utilities for Parcelbox crates.
//!
//! Provides `MockAuth` (signed session headers) and domain fixtures.
//! Import from dev-dependencies only, never from production code.

pub mod auth;
pub mod fixture;
