//! Account records used for login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::OwnerId;

/// A registered account.
///
/// The account id is the owner identity stamped on every vault record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: OwnerId,
    pub email: String,
    /// Argon2id PHC string. Never the password itself.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with a fresh id.
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: OwnerId::generate(),
            email: email.into(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }
}
