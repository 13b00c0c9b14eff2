//! Roster membership repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use atelier_common::Result;

/// Roster entry with joined user details for list responses
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MemberProfile {
    pub user_id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub added_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add a user to the roster. Idempotent: adding an existing member is a
    /// no-op, not an error.
    pub async fn add(&self, project_id: Uuid, user_id: Uuid) -> Result<()> {
        sqlx::query(
            "INSERT INTO project_members (project_id, user_id, added_at) \
             VALUES ($1, $2, NOW()) ON CONFLICT DO NOTHING",
        )
        .bind(project_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Remove a user from the roster. Returns whether a row was removed.
    pub async fn remove(&self, project_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM project_members WHERE project_id = $1 AND user_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List roster members with user details
    pub async fn list_profiles(&self, project_id: Uuid) -> Result<Vec<MemberProfile>> {
        let profiles = sqlx::query_as::<_, MemberProfile>(
            "SELECT pm.user_id, u.username, u.full_name, u.email, pm.added_at \
             FROM project_members pm \
             INNER JOIN users u ON u.id = pm.user_id \
             WHERE pm.project_id = $1 \
             ORDER BY pm.added_at ASC",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }
}
