//! Session-related types.
//!
//! The session only identifies the account. Tier and name are reloaded from
//! the user store on every request, so an admin's tier change applies to the
//! next page the user opens.

/// Session keys for authentication data.
pub mod keys {
    /// Key for the signed-in account's email.
    pub const USER_EMAIL: &str = "user_email";
}
