//! Project repository
//!
//! Projects are created and destroyed outside this domain; reads assemble
//! the roster from the membership table, mutations touch the lead column.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use atelier_common::Result;

use crate::domain::entities::{Project, ProjectStatus};

/// All columns in the projects table, used for SELECT clauses.
const PROJECT_COLUMNS: &str = "\
    id, name, description, status, github_link, \
    project_lead_id, created_by, created_at, updated_at";

/// Raw projects row; the roster is joined in separately.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ProjectRow {
    id: Uuid,
    name: String,
    description: String,
    status: ProjectStatus,
    github_link: Option<String>,
    project_lead_id: Option<Uuid>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct MemberRow {
    project_id: Uuid,
    user_id: Uuid,
}

impl ProjectRow {
    fn assemble(self, member_ids: Vec<Uuid>) -> Project {
        Project {
            id: self.id,
            name: self.name,
            description: self.description,
            status: self.status,
            github_link: self.github_link,
            member_ids,
            project_lead_id: self.project_lead_id,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a project by ID, roster included
    pub async fn find(&self, id: Uuid) -> Result<Option<Project>> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");
        let row = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let member_ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM project_members WHERE project_id = $1 ORDER BY added_at ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(row.assemble(member_ids)))
    }

    /// List the projects a user belongs to
    pub async fn list_for_member(&self, user_id: Uuid) -> Result<Vec<Project>> {
        let query = format!(
            "SELECT p.{} FROM projects p \
             INNER JOIN project_members pm ON pm.project_id = p.id \
             WHERE pm.user_id = $1 ORDER BY p.created_at ASC",
            PROJECT_COLUMNS.replace(", ", ", p.")
        );
        let rows = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        let project_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let members = sqlx::query_as::<_, MemberRow>(
            "SELECT project_id, user_id FROM project_members \
             WHERE project_id = ANY($1) ORDER BY added_at ASC",
        )
        .bind(&project_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_project: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for member in members {
            by_project
                .entry(member.project_id)
                .or_default()
                .push(member.user_id);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let member_ids = by_project.remove(&row.id).unwrap_or_default();
                row.assemble(member_ids)
            })
            .collect())
    }

    /// Set the project lead
    pub async fn set_lead(&self, project_id: Uuid, user_id: Uuid) -> Result<()> {
        sqlx::query(
            "UPDATE projects SET project_lead_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(project_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
