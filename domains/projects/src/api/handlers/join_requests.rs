//! Join request workflow API handlers
//!
//! The admission state machine lives here: a non-member asks to join, the
//! project lead reviews and resolves, and approval puts the requester on
//! the roster in the same transaction.

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
use atelier_common::{Error, Result, ValidatedJson};

use crate::api::middleware::ProjectsState;
use crate::domain::entities::JoinRequest;
use crate::domain::state::JoinRequestStatus;
use crate::repository::{add_member_tx, resolve_join_request_tx, JoinRequestWithUser};

/// Request for submitting a join request
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitJoinRequestRequest {
    /// Free-text note to the project lead
    #[validate(length(max = 2000))]
    pub message: String,
}

/// Decision carried by a resolve call
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinRequestDecision {
    Approved,
    Rejected,
}

impl JoinRequestDecision {
    fn to_status(self) -> JoinRequestStatus {
        match self {
            JoinRequestDecision::Approved => JoinRequestStatus::Approved,
            JoinRequestDecision::Rejected => JoinRequestStatus::Rejected,
        }
    }
}

/// Request for resolving a join request
#[derive(Debug, Deserialize, Validate)]
pub struct ResolveJoinRequestRequest {
    pub decision: JoinRequestDecision,
}

/// Response for join request operations
#[derive(Debug, Serialize)]
pub struct JoinRequestResponse {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub status: JoinRequestStatus,
    pub created_at: DateTime<Utc>,
}

impl From<JoinRequest> for JoinRequestResponse {
    fn from(request: JoinRequest) -> Self {
        Self {
            id: request.id,
            project_id: request.project_id,
            user_id: request.user_id,
            message: request.message,
            status: request.status,
            created_at: request.created_at,
        }
    }
}

/// Requester profile fields denormalized into the review list
#[derive(Debug, Serialize)]
pub struct RequesterProfile {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: String,
}

/// Join request with requester details, as the lead sees it
#[derive(Debug, Serialize)]
pub struct JoinRequestDetailResponse {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub status: JoinRequestStatus,
    pub created_at: DateTime<Utc>,
    pub user: RequesterProfile,
}

impl From<JoinRequestWithUser> for JoinRequestDetailResponse {
    fn from(r: JoinRequestWithUser) -> Self {
        Self {
            id: r.id,
            project_id: r.project_id,
            user_id: r.user_id,
            message: r.message,
            status: r.status,
            created_at: r.created_at,
            user: RequesterProfile {
                id: r.user_id,
                username: r.username,
                full_name: r.full_name,
                email: r.email,
            },
        }
    }
}

/// Response for a resolve call
#[derive(Debug, Serialize)]
pub struct ResolveJoinRequestResponse {
    pub status: JoinRequestStatus,
}

/// Submit a join request
///
/// **POST /v1/projects/{project_id}/join-requests**
///
/// The authenticated caller asks to join the project's roster.
///
/// **Business Rules:**
/// - Existing members cannot submit requests
/// - One pending request per user per project
pub async fn submit_join_request(
    AuthUser(user): AuthUser,
    State(state): State<ProjectsState>,
    Path(project_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<SubmitJoinRequestRequest>,
) -> Result<(StatusCode, Json<JoinRequestResponse>)> {
    let project = state
        .repos
        .projects
        .find(project_id)
        .await?
        .ok_or_else(|| Error::NotFound("Project not found".to_string()))?;

    if project.is_member(user.id) {
        return Err(Error::Conflict(
            "You are already a member of this project".to_string(),
        ));
    }

    if state
        .repos
        .join_requests
        .has_pending(project_id, user.id)
        .await?
    {
        return Err(Error::Conflict(
            "You already have a pending request for this project".to_string(),
        ));
    }

    let join_request = JoinRequest::new(project_id, user.id, request.message);
    let created = state.repos.join_requests.create(&join_request).await?;

    tracing::info!(
        project_id = %project_id,
        request_id = %created.id,
        "Join request submitted"
    );

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// List join requests for a project
///
/// **GET /v1/projects/{project_id}/join-requests**
///
/// Returns every request for the project, any status, with requester
/// profile fields. Only the project lead may review requests. No ordering
/// is promised; clients sort by `created_at` when it matters.
pub async fn list_join_requests(
    AuthUser(user): AuthUser,
    State(state): State<ProjectsState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<JoinRequestDetailResponse>>> {
    let project = state
        .repos
        .projects
        .find(project_id)
        .await?
        .ok_or_else(|| Error::NotFound("Project not found".to_string()))?;

    if !project.is_lead(user.id) {
        return Err(Error::Authorization(
            "Only the project lead can view join requests".to_string(),
        ));
    }

    let requests = state
        .repos
        .join_requests
        .list_with_requesters(project_id)
        .await?;

    let responses: Vec<JoinRequestDetailResponse> =
        requests.into_iter().map(Into::into).collect();

    Ok(Json(responses))
}

/// Resolve a join request
///
/// **POST /v1/join-requests/{request_id}/resolve**
///
/// Approve or reject a pending request. Only the lead of the request's
/// project may resolve it, and a request resolves at most once.
///
/// On approval the status change and the roster insertion run in one
/// transaction: callers observe both or neither. Rejection changes only
/// the status.
pub async fn resolve_join_request(
    AuthUser(user): AuthUser,
    State(state): State<ProjectsState>,
    Path(request_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<ResolveJoinRequestRequest>,
) -> Result<Json<ResolveJoinRequestResponse>> {
    let join_request = state
        .repos
        .join_requests
        .find(request_id)
        .await?
        .ok_or_else(|| Error::NotFound("Join request not found".to_string()))?;

    let project = state
        .repos
        .projects
        .find(join_request.project_id)
        .await?
        .ok_or_else(|| Error::NotFound("Project not found".to_string()))?;

    if !project.is_lead(user.id) {
        return Err(Error::Authorization(
            "Only the project lead can resolve join requests".to_string(),
        ));
    }

    if join_request.status != JoinRequestStatus::Pending {
        return Err(Error::Conflict(
            "Join request has already been resolved".to_string(),
        ));
    }

    let new_status = request.decision.to_status();

    // Status change and roster mutation are one atomic unit
    let mut tx = state
        .repos
        .begin()
        .await
        .map_err(|e| Error::Internal(format!("Failed to begin transaction: {}", e)))?;

    // Guarded update: a concurrent resolve loses the race here and conflicts
    resolve_join_request_tx(&mut tx, request_id, new_status)
        .await
        .map_err(|e| match e {
            atelier_common::RepositoryError::AlreadyExists => {
                Error::Conflict("Join request has already been resolved".to_string())
            }
            other => Error::from(other),
        })?;

    if new_status == JoinRequestStatus::Approved {
        add_member_tx(&mut tx, join_request.project_id, join_request.user_id)
            .await
            .map_err(|e| Error::Internal(format!("Failed to add member to project: {}", e)))?;
    }

    // Explicit commit — drop without commit = rollback (RAII)
    tx.commit()
        .await
        .map_err(|e| Error::Internal(format!("Failed to commit transaction: {}", e)))?;

    tracing::info!(
        request_id = %request_id,
        status = %new_status,
        "Join request resolved"
    );

    Ok(Json(ResolveJoinRequestResponse { status: new_status }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_request_validation() {
        let valid = SubmitJoinRequestRequest {
            message: "let me in".to_string(),
        };
        assert!(valid.validate().is_ok());

        // Empty message is allowed — it is free text
        let empty = SubmitJoinRequestRequest {
            message: String::new(),
        };
        assert!(empty.validate().is_ok());

        let too_long = SubmitJoinRequestRequest {
            message: "x".repeat(2001),
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_decision_deserialization() {
        let approved: JoinRequestDecision = serde_json::from_str(r#""approved""#).unwrap();
        assert_eq!(approved, JoinRequestDecision::Approved);
        assert_eq!(approved.to_status(), JoinRequestStatus::Approved);

        let rejected: JoinRequestDecision = serde_json::from_str(r#""rejected""#).unwrap();
        assert_eq!(rejected.to_status(), JoinRequestStatus::Rejected);

        // Anything outside the decision set fails deserialization
        let bogus: std::result::Result<JoinRequestDecision, _> =
            serde_json::from_str(r#""revoked""#);
        assert!(bogus.is_err());
    }

    #[test]
    fn test_join_request_response_serialization() {
        let request = JoinRequest::new(Uuid::new_v4(), Uuid::new_v4(), "hi".to_string());
        let response = JoinRequestResponse::from(request.clone());
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains(r#""status":"pending""#));
        assert!(json.contains(&request.id.to_string()));
    }

    #[test]
    fn test_detail_response_carries_requester_profile() {
        let detail = JoinRequestDetailResponse::from(JoinRequestWithUser {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            message: "let me in".to_string(),
            status: JoinRequestStatus::Pending,
            created_at: Utc::now(),
            username: "ada".to_string(),
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
        });

        assert_eq!(detail.user.id, detail.user_id);
        let json = serde_json::to_string(&detail).unwrap();
        assert!(json.contains("ada@example.com"));
        assert!(json.contains("Ada Lovelace"));
    }
}
