//! Projects domain state and auth backend integration

use std::sync::Arc;

use axum::extract::FromRef;

use atelier_auth::AuthBackend;
use atelier_storage::ContentStore;

use crate::repository::ProjectsRepositories;

/// Application state for the Projects domain
#[derive(Clone)]
pub struct ProjectsState {
    pub repos: ProjectsRepositories,
    pub auth: AuthBackend,
    pub store: Arc<dyn ContentStore>,
}

impl FromRef<ProjectsState> for AuthBackend {
    fn from_ref(state: &ProjectsState) -> Self {
        state.auth.clone()
    }
}
