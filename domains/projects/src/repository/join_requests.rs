//! Join request repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use atelier_common::Result;

use crate::domain::entities::JoinRequest;
use crate::domain::state::JoinRequestStatus;

/// All columns in the join_requests table.
const JOIN_REQUEST_COLUMNS: &str = "\
    id, project_id, user_id, message, status, created_at, updated_at";

/// Join request with joined requester details for the lead's review list
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct JoinRequestWithUser {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub status: JoinRequestStatus,
    pub created_at: DateTime<Utc>,
    pub username: String,
    pub full_name: String,
    pub email: String,
}

#[derive(Clone)]
pub struct JoinRequestRepository {
    pool: PgPool,
}

impl JoinRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new join request
    pub async fn create(&self, request: &JoinRequest) -> Result<JoinRequest> {
        let query = format!(
            "INSERT INTO join_requests ({JOIN_REQUEST_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {JOIN_REQUEST_COLUMNS}"
        );
        let created = sqlx::query_as::<_, JoinRequest>(&query)
            .bind(request.id)
            .bind(request.project_id)
            .bind(request.user_id)
            .bind(&request.message)
            .bind(request.status)
            .bind(request.created_at)
            .bind(request.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    /// Find a join request by ID
    pub async fn find(&self, id: Uuid) -> Result<Option<JoinRequest>> {
        let query = format!("SELECT {JOIN_REQUEST_COLUMNS} FROM join_requests WHERE id = $1");
        let request = sqlx::query_as::<_, JoinRequest>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(request)
    }

    /// Check for an unresolved request from this user for this project
    pub async fn has_pending(&self, project_id: Uuid, user_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM join_requests \
             WHERE project_id = $1 AND user_id = $2 AND status = 'pending')",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// List every request for a project (any status) with requester details.
    /// No ordering promise; callers sort by created_at when it matters.
    pub async fn list_with_requesters(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<JoinRequestWithUser>> {
        let requests = sqlx::query_as::<_, JoinRequestWithUser>(
            "SELECT jr.id, jr.project_id, jr.user_id, jr.message, jr.status, jr.created_at, \
                    u.username, u.full_name, u.email \
             FROM join_requests jr \
             INNER JOIN users u ON u.id = jr.user_id \
             WHERE jr.project_id = $1",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }
}
