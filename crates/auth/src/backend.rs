//! Concrete authentication backend
//!
//! Wraps a `CredentialVerifier` behind a cloneable handle that domain
//! states expose via `FromRef`:
//!
//! ```ignore
//! impl FromRef<MyDomainState> for AuthBackend {
//!     fn from_ref(state: &MyDomainState) -> Self {
//!         state.auth.clone()
//!     }
//! }
//! ```

use std::sync::Arc;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::mock::MockVerifier;
use crate::types::AuthIdentity;
use crate::verifier::{CredentialVerifier, RemoteVerifier};

/// Concrete authentication backend.
#[derive(Clone)]
pub struct AuthBackend {
    verifier: Arc<dyn CredentialVerifier>,
}

impl AuthBackend {
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { verifier }
    }

    /// Build a backend from environment-driven configuration.
    pub fn from_config(config: AuthConfig) -> Result<Self, AuthError> {
        match config.provider.as_str() {
            "remote" => {
                let url = config.introspect_url.ok_or_else(|| {
                    tracing::error!("AUTH_INTROSPECT_URL is required for the remote provider");
                    AuthError::VerifierUnavailable
                })?;
                tracing::info!("Creating remote credential verifier");
                Ok(Self::new(Arc::new(RemoteVerifier::new(url))))
            }
            "mock" => {
                tracing::info!("Creating mock credential verifier");
                Ok(Self::new(Arc::new(MockVerifier::new())))
            }
            provider => {
                tracing::error!(provider, "Unknown auth provider");
                Err(AuthError::VerifierUnavailable)
            }
        }
    }

    /// Resolve an opaque bearer credential to an identity.
    pub async fn authenticate(&self, token: &str) -> Result<AuthIdentity, AuthError> {
        self.verifier.verify(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_backend_delegates_to_verifier() {
        let verifier = MockVerifier::new();
        let identity = AuthIdentity {
            id: Uuid::new_v4(),
            username: "lin".to_string(),
            full_name: "Lin Mei".to_string(),
            email: "lin@example.com".to_string(),
        };
        verifier.register("tok", identity.clone());

        let backend = AuthBackend::new(Arc::new(verifier));
        let resolved = backend.authenticate("tok").await.unwrap();
        assert_eq!(resolved, identity);

        let denied = backend.authenticate("other").await;
        assert!(matches!(denied, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_from_config_rejects_unknown_provider() {
        let config = AuthConfig {
            provider: "ldap".to_string(),
            introspect_url: None,
        };
        assert!(AuthBackend::from_config(config).is_err());
    }

    #[test]
    fn test_from_config_remote_requires_url() {
        let config = AuthConfig {
            provider: "remote".to_string(),
            introspect_url: None,
        };
        assert!(AuthBackend::from_config(config).is_err());
    }

    #[test]
    fn test_from_config_mock_provider() {
        let config = AuthConfig {
            provider: "mock".to_string(),
            introspect_url: None,
        };
        assert!(AuthBackend::from_config(config).is_ok());
    }
}
