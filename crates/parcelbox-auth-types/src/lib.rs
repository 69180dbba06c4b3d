//! Auth types shared by the account service and its clients.
//!
//! Provides JWT issuing/validation, the session cookie builders, the `SessionClaims`
//! extractor, and the JSON wire types of the account API.

pub mod cookie;
pub mod identity;
pub mod token;
pub mod wire;
