//! External content store client for Atelier
//!
//! Artifact bytes are held durably by an external content store; this
//! workspace only keeps a reference to them. This crate provides:
//! - `ContentStore`: the upload/read/delete boundary trait
//! - `HttpContentStore`: the production HTTP client
//! - `MockContentStore`: programmable in-memory store for tests
//! - `ContentStoreFactory`: env-driven provider selection

pub mod http;
pub mod mock;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Content store configuration error: {0}")]
    Configuration(String),

    #[error("Content store request error: {0}")]
    Request(String),

    #[error("Content store response error: {0}")]
    Response(String),

    #[error("Object not found: {0}")]
    NotFound(String),
}

/// Location and size of an object held by the content store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredObject {
    pub url: String,
    pub size: i64,
}

/// Content store configuration
#[derive(Clone)]
pub struct StorageConfig {
    pub provider: String,
    pub base_url: String,
    pub access_token: Option<String>,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl StorageConfig {
    /// Create storage config from environment variables
    pub fn from_env() -> Result<Self, StorageError> {
        let provider =
            std::env::var("CONTENT_STORE_PROVIDER").unwrap_or_else(|_| "mock".to_string());
        let base_url = std::env::var("CONTENT_STORE_URL")
            .unwrap_or_else(|_| "http://localhost:9000".to_string());
        let access_token = std::env::var("CONTENT_STORE_TOKEN").ok();

        Ok(Self {
            provider,
            base_url,
            access_token,
        })
    }
}

/// Boundary to the external content store.
///
/// Implementations must not assume anything about the URL shape beyond
/// it being resolvable by the same store later.
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// Store an object and return its durable location.
    async fn put(&self, name: &str, bytes: Vec<u8>) -> Result<StoredObject, StorageError>;

    /// Read an object back by its location.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, StorageError>;

    /// Delete an object by its location.
    async fn delete(&self, url: &str) -> Result<(), StorageError>;
}

/// Factory for creating ContentStore implementations
pub struct ContentStoreFactory;

impl ContentStoreFactory {
    pub fn create(config: StorageConfig) -> Result<Arc<dyn ContentStore>, StorageError> {
        match config.provider.as_str() {
            "http" => {
                tracing::info!("Creating HTTP content store client");
                Ok(Arc::new(http::HttpContentStore::new(config)))
            }
            "mock" => {
                tracing::info!("Creating mock content store");
                Ok(Arc::new(mock::MockContentStore::new()))
            }
            provider => Err(StorageError::Configuration(format!(
                "Unknown content store provider: {}. Supported providers: http, mock",
                provider
            ))),
        }
    }
}
