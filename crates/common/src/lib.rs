//! Shared utilities, configuration, and error handling for Atelier
//!
//! This crate provides common functionality used across the Atelier workspace:
//! - Configuration management following 12-factor principles
//! - Error types and handling
//! - Identifier normalization at the API boundary
//! - Custom axum extractors

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod ident;
pub mod state;

pub use config::Config;
pub use db::RepositoryError;
pub use error::{Error, Result};
pub use extractors::ValidatedJson;
pub use ident::Identifier;
pub use state::StateError;
