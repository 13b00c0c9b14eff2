//! Credential verification
//!
//! The bearer credential is opaque to this workspace; verification is
//! delegated to the session collaborator through `CredentialVerifier`.
//! `RemoteVerifier` is the production implementation: it POSTs the
//! credential to the collaborator's introspection endpoint.

use crate::error::AuthError;
use crate::types::AuthIdentity;

/// Resolves an opaque bearer credential to the identity it was issued for.
#[async_trait::async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AuthIdentity, AuthError>;
}

/// HTTP client for the session collaborator's introspection endpoint.
pub struct RemoteVerifier {
    http: reqwest::Client,
    introspect_url: String,
}

impl RemoteVerifier {
    pub fn new(introspect_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            introspect_url,
        }
    }
}

#[async_trait::async_trait]
impl CredentialVerifier for RemoteVerifier {
    async fn verify(&self, token: &str) -> Result<AuthIdentity, AuthError> {
        let response = self
            .http
            .post(&self.introspect_url)
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Credential verifier unreachable");
                AuthError::VerifierUnavailable
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AuthError::InvalidToken);
        }
        if !status.is_success() {
            tracing::error!(status = %status, "Credential verifier returned an error");
            return Err(AuthError::VerifierUnavailable);
        }

        response.json::<AuthIdentity>().await.map_err(|e| {
            tracing::error!(error = %e, "Credential verifier returned malformed identity");
            AuthError::VerifierUnavailable
        })
    }
}
