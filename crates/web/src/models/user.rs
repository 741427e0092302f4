//! User domain types.
//!
//! [`UserRecord`] is the stored row; [`UserAccount`] is the validated domain
//! object handed to routes and templates. The password hash never leaves the
//! repository layer.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use speakerlab_core::{Email, Tier};

/// Accounts keyed by lower-cased email.
pub type UserTable = BTreeMap<String, UserRecord>;

/// One account as stored in `users.json`.
///
/// Reads the first-generation field names (`password`, `created`) and tier
/// ids (`paid1`..`paid3`); writes the current ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Argon2 PHC string, or a legacy unsalted SHA-256 hex digest.
    #[serde(alias = "password")]
    pub password_hash: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Subscription tier.
    #[serde(default)]
    pub tier: Tier,
    /// When the account was created.
    #[serde(alias = "created", deserialize_with = "super::timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

/// A Speaker Lab account (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// Account key.
    pub email: Email,
    /// Display name. Falls back to "Speaker" when blank.
    pub name: String,
    /// Current subscription tier.
    pub tier: Tier,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    /// Build the domain object from a stored row.
    #[must_use]
    pub fn from_record(email: Email, record: &UserRecord) -> Self {
        let name = if record.name.trim().is_empty() {
            "Speaker".to_string()
        } else {
            record.name.clone()
        };

        Self {
            email,
            name,
            tier: record.tier,
            created_at: record.created_at,
        }
    }

    /// Whether this account may use the admin panel.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.tier.is_admin()
    }
}
