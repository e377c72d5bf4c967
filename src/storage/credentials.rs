//! A file-backed credential store.
//!
//! Accounts live in a TOML file:
//!
//! ```toml
//! [[accounts]]
//! username = "admin"
//! role = "admin"
//! password_sha256 = "…"
//! ```
//!
//! Only password digests are stored, see [`password_digest`].

use std::{io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    AuthError, Authenticator, EmptyIdError, Identity, Role, Username, password_digest,
};

/// Errors raised while reading or writing the credential file.
#[derive(Debug, Error)]
pub enum CredentialsError {
    /// The file could not be read or written.
    #[error("failed to access credential file: {0}")]
    Io(#[from] io::Error),
    /// The file is not valid TOML or has the wrong shape.
    #[error("failed to parse credential file: {0}")]
    Parse(#[from] toml::de::Error),
    /// The store could not be serialized.
    #[error("failed to serialize credentials: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// An account with this name already exists.
    #[error("account '{0}' already exists")]
    DuplicateAccount(Username),
    /// The username is blank once surrounding whitespace is removed.
    #[error(transparent)]
    EmptyUsername(#[from] EmptyIdError),
}

/// One login account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Login name.
    pub username: Username,
    /// Granted role.
    pub role: Role,
    /// Hex SHA-256 digest from [`password_digest`].
    pub password_sha256: String,
}

/// A set of accounts that can authenticate users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialStore {
    #[serde(default)]
    accounts: Vec<Account>,
}

impl CredentialStore {
    /// Reads the store from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or lists the
    /// same username twice.
    pub fn load(path: &Path) -> Result<Self, CredentialsError> {
        let content = std::fs::read_to_string(path)?;
        let store: Self = toml::from_str(&content)?;

        for (i, account) in store.accounts.iter().enumerate() {
            if store.accounts[..i]
                .iter()
                .any(|other| other.username == account.username)
            {
                return Err(CredentialsError::DuplicateAccount(account.username.clone()));
            }
        }

        tracing::debug!(path = %path.display(), accounts = store.accounts.len(), "loaded credentials");
        Ok(store)
    }

    /// Reads the store, or starts an empty one if the file does not exist.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn load_or_default(path: &Path) -> Result<Self, CredentialsError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Writes the store to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be serialized or written.
    pub fn save(&self, path: &Path) -> Result<(), CredentialsError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Adds an account, storing only the digest of `password`.
    ///
    /// Surrounding whitespace is stripped from the username, matching how
    /// logins are read.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialsError::DuplicateAccount`] if the username is
    /// taken, or [`CredentialsError::EmptyUsername`] if it is blank.
    pub fn add_account(
        &mut self,
        username: Username,
        role: Role,
        password: &str,
    ) -> Result<(), CredentialsError> {
        let username = if username.trim().len() == username.len() {
            username
        } else {
            Username::new(username.trim())?
        };

        if self.accounts.iter().any(|a| a.username == username) {
            return Err(CredentialsError::DuplicateAccount(username));
        }

        let password_sha256 = password_digest(&username, password);
        self.accounts.push(Account {
            username,
            role,
            password_sha256,
        });
        Ok(())
    }

    /// The accounts, in file order.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }
}

impl Authenticator for CredentialStore {
    fn authenticate(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        let digest = password_digest(username, password);
        let account = self
            .accounts
            .iter()
            .find(|a| a.username.as_str() == username && a.password_sha256 == digest)
            .ok_or_else(|| {
                tracing::info!(user = username, "login failed");
                AuthError::InvalidCredentials
            })?;

        tracing::info!(user = username, role = %account.role, "login succeeded");
        Ok(Identity {
            username: account.username.clone(),
            role: account.role,
        })
    }
}
