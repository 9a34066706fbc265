//! Admin credential types.

use chrono::{DateTime, Utc};

/// A salted one-way hash of the admin secret, in PHC string format.
///
/// Never holds the plaintext. `Debug` is redacted so the hash does not end up
/// in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an already computed PHC hash string.
    #[must_use]
    pub const fn new(phc: String) -> Self {
        Self(phc)
    }

    /// Get the PHC string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the PHC string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordHash([REDACTED])")
    }
}

/// The singleton admin credential record.
///
/// There is at most one of these. It is created once and afterwards only
/// overwritten in place.
#[derive(Debug, Clone)]
pub struct AdminCredential {
    /// Hash of the current admin secret.
    pub password_hash: PasswordHash,
    /// When the credential was first initialized.
    pub created_at: DateTime<Utc>,
    /// When the secret was last changed.
    pub updated_at: DateTime<Utc>,
}
