//! Project file repository
//!
//! Metadata records only; the bytes live in the external content store.

use sqlx::PgPool;
use uuid::Uuid;

use atelier_common::Result;

use crate::domain::entities::ProjectFile;

/// All columns in the project_files table, used for SELECT and RETURNING clauses.
const FILE_COLUMNS: &str = "\
    id, project_id, name, url, file_type, size_bytes, uploaded_by, uploaded_at";

#[derive(Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a file metadata record
    pub async fn create(&self, file: &ProjectFile) -> Result<ProjectFile> {
        let query = format!(
            "INSERT INTO project_files ({FILE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {FILE_COLUMNS}"
        );
        let created = sqlx::query_as::<_, ProjectFile>(&query)
            .bind(file.id)
            .bind(file.project_id)
            .bind(&file.name)
            .bind(&file.url)
            .bind(file.file_type)
            .bind(file.size_bytes)
            .bind(file.uploaded_by)
            .bind(file.uploaded_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    /// Find a file within a project
    pub async fn find(&self, project_id: Uuid, file_id: Uuid) -> Result<Option<ProjectFile>> {
        let query =
            format!("SELECT {FILE_COLUMNS} FROM project_files WHERE project_id = $1 AND id = $2");
        let file = sqlx::query_as::<_, ProjectFile>(&query)
            .bind(project_id)
            .bind(file_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(file)
    }

    /// List a project's files in insertion order
    pub async fn list_by_project(&self, project_id: Uuid) -> Result<Vec<ProjectFile>> {
        let query = format!(
            "SELECT {FILE_COLUMNS} FROM project_files \
             WHERE project_id = $1 ORDER BY uploaded_at ASC, id ASC"
        );
        let files = sqlx::query_as::<_, ProjectFile>(&query)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(files)
    }

    /// Delete a file record. Returns whether a row was removed.
    pub async fn delete(&self, project_id: Uuid, file_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM project_files WHERE project_id = $1 AND id = $2")
            .bind(project_id)
            .bind(file_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
