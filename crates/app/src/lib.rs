//! Atelier application composition root
//!
//! Composes the domain routers and collaborator clients into a single
//! application.

use axum::Router;
use sqlx::PgPool;

use atelier_auth::{AuthBackend, AuthConfig};
use atelier_projects::{ProjectsRepositories, ProjectsState};
use atelier_storage::{ContentStoreFactory, StorageConfig};

/// Create the main application router with all routes and middleware
pub async fn create_app(pool: PgPool) -> Result<Router, anyhow::Error> {
    // Create repositories
    let projects_repos = ProjectsRepositories::new(pool);

    // Credential verifier (session collaborator)
    let auth_config =
        AuthConfig::from_env().map_err(|_| anyhow::anyhow!("Failed to load auth config"))?;
    let auth = AuthBackend::from_config(auth_config)
        .map_err(|_| anyhow::anyhow!("Failed to create auth backend"))?;

    // Content store (artifact bytes collaborator)
    let storage_config = StorageConfig::from_env()?;
    let store = ContentStoreFactory::create(storage_config)?;

    // Create Projects domain state
    let projects_state = ProjectsState {
        repos: projects_repos,
        auth,
        store,
    };

    // Build router — compose domain routers with shared infrastructure routes
    let app = Router::new()
        .route("/health", axum::routing::get(health_check))
        .route("/", axum::routing::get(|| async { "Atelier API v0.1.0" }))
        .merge(atelier_projects::routes().with_state(projects_state));

    Ok(app)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
