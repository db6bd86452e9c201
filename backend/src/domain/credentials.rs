//! Password hashing used for authentication and new accounts.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// SHA-256 of `password`, as lowercase hex
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// How `UserService::reset_password` writes the new password.
///
/// Accounts created through registration always store a hash, but the reset
/// flow has historically stored the new password as typed. `Plaintext` keeps
/// that behaviour; `Hashed` has to be opted into explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordResetStorage {
    #[default]
    Plaintext,
    Hashed,
}

impl PasswordResetStorage {
    /// The value to store for `new_password`
    pub fn stored_value(self, new_password: &str) -> String {
        match self {
            PasswordResetStorage::Plaintext => new_password.to_string(),
            PasswordResetStorage::Hashed => hash_password(new_password),
        }
    }
}
