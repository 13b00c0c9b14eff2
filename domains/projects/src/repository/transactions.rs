//! Transactional free functions for the Projects domain (Zero2Prod pattern)
//!
//! Approval must mutate the request and the roster as one unit: either both
//! happen or neither does. These helpers run inside a caller-owned
//! transaction; dropping it without commit rolls everything back.

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use atelier_common::RepositoryError;

use crate::domain::state::JoinRequestStatus;

/// Move a join request out of `pending` within an existing transaction.
///
/// The `status = 'pending'` guard makes the transition race-safe: a request
/// resolved by a concurrent call affects zero rows here, which surfaces as
/// `RepositoryError::AlreadyExists` (→ Conflict at the API boundary).
pub async fn resolve_join_request_tx(
    transaction: &mut Transaction<'_, Postgres>,
    request_id: Uuid,
    status: JoinRequestStatus,
) -> std::result::Result<(), RepositoryError> {
    let result = sqlx::query(
        "UPDATE join_requests SET status = $2, updated_at = NOW() \
         WHERE id = $1 AND status = 'pending'",
    )
    .bind(request_id)
    .bind(status)
    .execute(&mut **transaction)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::AlreadyExists);
    }
    Ok(())
}

/// Add a user to a project roster within an existing transaction.
/// Idempotent, matching the roster manager's add semantics.
pub async fn add_member_tx(
    transaction: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
    user_id: Uuid,
) -> std::result::Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO project_members (project_id, user_id, added_at) \
         VALUES ($1, $2, NOW()) ON CONFLICT DO NOTHING",
    )
    .bind(project_id)
    .bind(user_id)
    .execute(&mut **transaction)
    .await?;
    Ok(())
}
