//! Authentication middleware for the Atelier API
//!
//! Session issuance lives outside this workspace; the bearer credential is
//! opaque here. This crate resolves a credential to the identity it was
//! issued for by delegating to a `CredentialVerifier`, and provides an axum
//! extractor that works with any domain state implementing `FromRef<S>` for
//! `AuthBackend`.

mod backend;
mod config;
mod error;
mod extractors;
mod mock;
mod types;
mod verifier;

pub use backend::AuthBackend;
pub use config::AuthConfig;
pub use error::AuthError;
pub use extractors::AuthUser;
pub use mock::MockVerifier;
pub use types::AuthIdentity;
pub use verifier::{CredentialVerifier, RemoteVerifier};
