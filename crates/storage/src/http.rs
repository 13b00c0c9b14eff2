//! HTTP content store client
//!
//! Talks to the content store's object API: `POST {base}/v1/objects?name=…`
//! with the raw bytes as the body returns the stored location; reads and
//! deletes address the returned URL directly.

use crate::{ContentStore, StorageConfig, StorageError, StoredObject};

pub struct HttpContentStore {
    http: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl HttpContentStore {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token,
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait::async_trait]
impl ContentStore for HttpContentStore {
    async fn put(&self, name: &str, bytes: Vec<u8>) -> Result<StoredObject, StorageError> {
        let size = bytes.len() as i64;
        let request = self
            .http
            .post(format!("{}/v1/objects", self.base_url))
            .query(&[("name", name)])
            .body(bytes);

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read response body".to_string());
            return Err(StorageError::Response(format!(
                "Content store returned {}: {}",
                status, body
            )));
        }

        let stored: StoredObject = response
            .json()
            .await
            .map_err(|e| StorageError::Response(e.to_string()))?;

        tracing::debug!(name, size, url = %stored.url, "Object stored");
        Ok(stored)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, StorageError> {
        let response = self
            .authorize(self.http.get(url))
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound(url.to_string()));
        }
        if !response.status().is_success() {
            return Err(StorageError::Response(format!(
                "Content store returned {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StorageError::Response(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        let response = self
            .authorize(self.http.delete(url))
            .send()
            .await
            .map_err(|e| StorageError::Request(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound(url.to_string()));
        }
        if !response.status().is_success() {
            return Err(StorageError::Response(format!(
                "Content store returned {}",
                response.status()
            )));
        }

        tracing::debug!(url, "Object deleted");
        Ok(())
    }
}
