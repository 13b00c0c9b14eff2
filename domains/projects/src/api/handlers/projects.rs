//! Project read API handlers
//!
//! Projects are created and administered by collaborators outside this
//! domain; these handlers only expose the member's view of the workspace.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use atelier_auth::AuthUser;
use atelier_common::{Error, Result};

use crate::api::handlers::files::ProjectFileResponse;
use crate::api::handlers::roster::MemberResponse;
use crate::api::middleware::ProjectsState;
use crate::domain::entities::{Project, ProjectStatus};

/// Response for project listings
#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub github_link: Option<String>,
    pub member_ids: Vec<Uuid>,
    pub project_lead_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Project> for ProjectResponse {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            status: p.status,
            github_link: p.github_link,
            member_ids: p.member_ids,
            project_lead_id: p.project_lead_id,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Project detail with denormalized roster and files
#[derive(Debug, Serialize)]
pub struct ProjectDetailResponse {
    #[serde(flatten)]
    pub project: ProjectResponse,
    pub members: Vec<MemberResponse>,
    pub files: Vec<ProjectFileResponse>,
}

/// List the caller's projects
///
/// **GET /v1/projects**
///
/// Returns the projects the authenticated user belongs to.
pub async fn list_projects(
    AuthUser(user): AuthUser,
    State(state): State<ProjectsState>,
) -> Result<Json<Vec<ProjectResponse>>> {
    let projects = state.repos.projects.list_for_member(user.id).await?;
    let responses: Vec<ProjectResponse> = projects.into_iter().map(Into::into).collect();

    Ok(Json(responses))
}

/// Get a project's workspace view
///
/// **GET /v1/projects/{project_id}**
///
/// Project detail with member profiles and file records. Members only.
pub async fn get_project(
    AuthUser(user): AuthUser,
    State(state): State<ProjectsState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<ProjectDetailResponse>> {
    let project = state
        .repos
        .projects
        .find(project_id)
        .await?
        .ok_or_else(|| Error::NotFound("Project not found".to_string()))?;

    if !project.is_member(user.id) {
        return Err(Error::Authorization(
            "Access denied: Not a member of this project".to_string(),
        ));
    }

    let members = state.repos.members.list_profiles(project_id).await?;
    let files = state.repos.files.list_by_project(project_id).await?;

    Ok(Json(ProjectDetailResponse {
        project: project.into(),
        members: members.into_iter().map(Into::into).collect(),
        files: files.into_iter().map(Into::into).collect(),
    }))
}
