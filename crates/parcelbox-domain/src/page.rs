//! Logical page names understood by the navigation callback.
//!
//! Pages are opaque strings to the session core; only these two are used for redirects.

/// Public landing page.
pub const HOME: &str = "home";

/// Default authenticated landing page.
pub const DASHBOARD: &str = "dashboard";
