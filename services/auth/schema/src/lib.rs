//! sea-orm entities of the account service.

pub mod accounts;
pub mod profiles;
pub mod sessions;
