//! Mock credential verifier
//!
//! Programmable verifier for tests and local development: tokens are
//! registered up front and resolve to fixed identities.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::AuthError;
use crate::types::AuthIdentity;
use crate::verifier::CredentialVerifier;

/// In-memory token → identity map.
#[derive(Clone, Default)]
pub struct MockVerifier {
    tokens: Arc<RwLock<HashMap<String, AuthIdentity>>>,
}

impl MockVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a credential that resolves to the given identity.
    pub fn register(&self, token: impl Into<String>, identity: AuthIdentity) {
        self.tokens.write().unwrap().insert(token.into(), identity);
    }

    /// Revoke a previously registered credential.
    pub fn revoke(&self, token: &str) {
        self.tokens.write().unwrap().remove(token);
    }
}

#[async_trait::async_trait]
impl CredentialVerifier for MockVerifier {
    async fn verify(&self, token: &str) -> Result<AuthIdentity, AuthError> {
        self.tokens
            .read()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
