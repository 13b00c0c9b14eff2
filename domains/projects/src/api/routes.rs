//! Route definitions for the Projects domain API

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers::{files, join_requests, projects, roster};
use super::middleware::ProjectsState;

/// Create project read routes
fn project_routes() -> Router<ProjectsState> {
    Router::new()
        .route("/v1/projects", get(projects::list_projects))
        .route("/v1/projects/{project_id}", get(projects::get_project))
}

/// Create roster management routes
fn roster_routes() -> Router<ProjectsState> {
    Router::new()
        .route(
            "/v1/projects/{project_id}/members",
            get(roster::list_members).post(roster::add_member),
        )
        .route(
            "/v1/projects/{project_id}/members/{user_id}",
            delete(roster::remove_member),
        )
        .route("/v1/projects/{project_id}/lead", post(roster::set_lead))
}

/// Create join request workflow routes
fn join_request_routes() -> Router<ProjectsState> {
    Router::new()
        .route(
            "/v1/projects/{project_id}/join-requests",
            get(join_requests::list_join_requests).post(join_requests::submit_join_request),
        )
        .route(
            "/v1/join-requests/{request_id}/resolve",
            post(join_requests::resolve_join_request),
        )
}

/// Create artifact routes
fn file_routes() -> Router<ProjectsState> {
    Router::new()
        .route(
            "/v1/projects/{project_id}/files",
            get(files::list_files).post(files::register_file),
        )
        .route(
            "/v1/projects/{project_id}/files/upload",
            post(files::upload_files),
        )
        .route(
            "/v1/projects/{project_id}/files/{file_id}",
            delete(files::delete_file),
        )
        .route(
            "/v1/projects/{project_id}/files/{file_id}/view",
            get(files::view_file),
        )
}

/// Create all Projects domain API routes
pub fn routes() -> Router<ProjectsState> {
    Router::new()
        .merge(project_routes())
        .merge(roster_routes())
        .merge(join_request_routes())
        .merge(file_routes())
}
