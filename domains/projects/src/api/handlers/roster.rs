//! Roster and role management API handlers
//!
//! Maintains the member set and the at-most-one-lead invariant. Every
//! operation here is lead-only except viewing the roster, which any member
//! may do. The workflow engine's approval path adds members through its own
//! transactional call, not through these handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use atelier_auth::AuthUser;
use atelier_common::{Error, Identifier, Result, ValidatedJson};

use crate::api::middleware::ProjectsState;
use crate::repository::MemberProfile;

/// Request for adding a roster member
#[derive(Debug, Deserialize, Validate)]
pub struct AddMemberRequest {
    pub member_id: Identifier,
}

/// Request for assigning the project lead
#[derive(Debug, Deserialize, Validate)]
pub struct SetLeadRequest {
    pub member_id: Identifier,
}

/// Response for roster listings
#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub user_id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub added_at: DateTime<Utc>,
}

impl From<MemberProfile> for MemberResponse {
    fn from(m: MemberProfile) -> Self {
        Self {
            user_id: m.user_id,
            username: m.username,
            full_name: m.full_name,
            email: m.email,
            added_at: m.added_at,
        }
    }
}

/// List project members
///
/// **GET /v1/projects/{project_id}/members**
///
/// Returns the roster with user details. Any member can view it.
pub async fn list_members(
    AuthUser(user): AuthUser,
    State(state): State<ProjectsState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<MemberResponse>>> {
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
    let responses: Vec<MemberResponse> = members.into_iter().map(Into::into).collect();

    Ok(Json(responses))
}

/// Add a member to the roster
///
/// **POST /v1/projects/{project_id}/members**
///
/// Lead-only. Adding a user who is already on the roster is a no-op.
pub async fn add_member(
    AuthUser(user): AuthUser,
    State(state): State<ProjectsState>,
    Path(project_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<AddMemberRequest>,
) -> Result<StatusCode> {
    let project = state
        .repos
        .projects
        .find(project_id)
        .await?
        .ok_or_else(|| Error::NotFound("Project not found".to_string()))?;

    if !project.is_lead(user.id) {
        return Err(Error::Authorization(
            "Only the project lead can add members".to_string(),
        ));
    }

    let member_id = request.member_id.into_inner();
    state
        .repos
        .users
        .find(member_id)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

    state.repos.members.add(project_id, member_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Remove a member from the roster
///
/// **DELETE /v1/projects/{project_id}/members/{user_id}**
///
/// Lead-only. The current lead cannot be removed — reassign the lead first;
/// there is no implicit demotion.
pub async fn remove_member(
    AuthUser(user): AuthUser,
    State(state): State<ProjectsState>,
    Path((project_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    let project = state
        .repos
        .projects
        .find(project_id)
        .await?
        .ok_or_else(|| Error::NotFound("Project not found".to_string()))?;

    if !project.is_lead(user.id) {
        return Err(Error::Authorization(
            "Only the project lead can remove members".to_string(),
        ));
    }

    if project.is_lead(member_id) {
        return Err(Error::Conflict(
            "Cannot remove the project lead. Assign a new lead first".to_string(),
        ));
    }

    let removed = state.repos.members.remove(project_id, member_id).await?;
    if !removed {
        return Err(Error::NotFound(
            "Member not found in this project".to_string(),
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Assign the project lead
///
/// **POST /v1/projects/{project_id}/lead**
///
/// Lead-only. The new lead must already be on the roster.
pub async fn set_lead(
    AuthUser(user): AuthUser,
    State(state): State<ProjectsState>,
    Path(project_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<SetLeadRequest>,
) -> Result<StatusCode> {
    let project = state
        .repos
        .projects
        .find(project_id)
        .await?
        .ok_or_else(|| Error::NotFound("Project not found".to_string()))?;

    if !project.is_lead(user.id) {
        return Err(Error::Authorization(
            "Only the project lead can reassign the lead role".to_string(),
        ));
    }

    let member_id = request.member_id.into_inner();
    if !project.is_member(member_id) {
        return Err(Error::Conflict(
            "Project lead must be a member of the project".to_string(),
        ));
    }

    state.repos.projects.set_lead(project_id, member_id).await?;

    tracing::info!(project_id = %project_id, lead_id = %member_id, "Project lead reassigned");

    Ok(StatusCode::NO_CONTENT)
}
