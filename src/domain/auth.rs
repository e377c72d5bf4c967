//! Credential verification.

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::domain::Identity;

/// Errors raised while logging in.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The username is unknown or the password is wrong. Callers cannot
    /// tell which.
    #[error("invalid username or password")]
    InvalidCredentials,
}

/// Verifies a username and password and yields the caller's identity.
pub trait Authenticator {
    /// Checks the credentials.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if they do not match a known
    /// account.
    fn authenticate(&self, username: &str, password: &str) -> Result<Identity, AuthError>;
}

/// Computes the stored digest for a password.
///
/// The username is mixed in so that two accounts with the same password do
/// not share a digest.
#[must_use]
pub fn password_digest(username: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(username.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    let hash = hasher.finalize();

    format!("{hash:x}")
}
