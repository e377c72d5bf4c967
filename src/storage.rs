//! File formats: seed fixtures and the credential store.

mod credentials;
pub use credentials::{Account, CredentialStore, CredentialsError};

/// Seed fixtures in YAML or JSON.
pub mod fixture;
pub use fixture::{Fixture, FixtureError};
