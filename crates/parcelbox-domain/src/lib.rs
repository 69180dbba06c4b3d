//! Domain types shared across all Parcelbox crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! The session store, the account service and its wire types all build on these.

pub mod capability;
pub mod id;
pub mod identity;
pub mod page;
pub mod profile;
