//! User repository (read-only)
//!
//! Users are owned by an external collaborator; this domain only reads the
//! profile fields it denormalizes into roster and join-request responses.

use sqlx::PgPool;
use uuid::Uuid;

use atelier_common::Result;

/// Read-only projection of the externally-owned user record
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub email: String,
}

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user profile by ID
    pub async fn find(&self, id: Uuid) -> Result<Option<UserProfile>> {
        let user = sqlx::query_as::<_, UserProfile>(
            "SELECT id, username, full_name, email FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
