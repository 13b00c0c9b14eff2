//! Auth configuration

use crate::error::AuthError;

/// Credential verifier configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// Verifier provider: "remote" or "mock"
    pub provider: String,
    /// Introspection endpoint of the session collaborator (remote provider)
    pub introspect_url: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("provider", &self.provider)
            .field("introspect_url", &self.introspect_url)
            .finish()
    }
}

impl AuthConfig {
    /// Create auth config from environment variables
    pub fn from_env() -> Result<Self, AuthError> {
        let provider = std::env::var("AUTH_PROVIDER").unwrap_or_else(|_| "remote".to_string());
        let introspect_url = std::env::var("AUTH_INTROSPECT_URL").ok();

        Ok(Self {
            provider,
            introspect_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_auth_config_defaults_to_remote() {
        std::env::remove_var("AUTH_PROVIDER");
        let config = AuthConfig::from_env().unwrap();
        assert_eq!(config.provider, "remote");
    }

    #[test]
    #[serial]
    fn test_auth_config_reads_provider() {
        std::env::set_var("AUTH_PROVIDER", "mock");
        let config = AuthConfig::from_env().unwrap();
        assert_eq!(config.provider, "mock");
        std::env::remove_var("AUTH_PROVIDER");
    }
}
