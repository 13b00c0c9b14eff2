//! Engineering artifact API handlers
//!
//! Metadata lives in the repository; bytes live in the external content
//! store. Upload is open to any member while deletion is lead-only — that
//! asymmetry is part of the observed contract, not an oversight.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use uuid::Uuid;
use validator::Validate;

use atelier_auth::AuthUser;
use atelier_common::{Error, Result, ValidatedJson};
use atelier_storage::ContentStore;
use atelier_viewer::{render, Canvas, Scene};

use crate::api::middleware::ProjectsState;
use crate::domain::entities::{FileKind, Project, ProjectFile};
use crate::repository::FileRepository;

/// Request for recording a file already placed in the content store
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterFileRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    /// Location returned by the content store
    #[validate(url)]
    pub url: String,

    #[validate(range(min = 0))]
    pub size: i64,

    /// Optional client-declared type; must agree with the name's extension
    pub file_type: Option<String>,
}

/// Response for file operations
#[derive(Debug, Serialize)]
pub struct ProjectFileResponse {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub url: String,
    pub file_type: FileKind,
    pub size_bytes: i64,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
}

impl From<ProjectFile> for ProjectFileResponse {
    fn from(f: ProjectFile) -> Self {
        Self {
            id: f.id,
            project_id: f.project_id,
            name: f.name,
            url: f.url,
            file_type: f.file_type,
            size_bytes: f.size_bytes,
            uploaded_by: f.uploaded_by,
            uploaded_at: f.uploaded_at,
        }
    }
}

/// Per-file result of a batch upload
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    /// Stored and recorded
    Stored,
    /// Rejected before any network call (unsupported extension, bad part)
    Rejected,
    /// Accepted but the store or repository failed
    Failed,
}

/// One entry in the batch upload response, in submission order
#[derive(Debug, Serialize)]
pub struct FileUploadOutcome {
    pub name: String,
    pub status: UploadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<ProjectFileResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileUploadOutcome {
    fn stored(file: ProjectFile) -> Self {
        Self {
            name: file.name.clone(),
            status: UploadStatus::Stored,
            file: Some(file.into()),
            error: None,
        }
    }

    fn rejected(name: String, error: String) -> Self {
        Self {
            name,
            status: UploadStatus::Rejected,
            file: None,
            error: Some(error),
        }
    }

    fn failed(name: String, error: String) -> Self {
        Self {
            name,
            status: UploadStatus::Failed,
            file: None,
            error: Some(error),
        }
    }
}

async fn find_project(state: &ProjectsState, project_id: Uuid) -> Result<Project> {
    state
        .repos
        .projects
        .find(project_id)
        .await?
        .ok_or_else(|| Error::NotFound("Project not found".to_string()))
}

/// List project files
///
/// **GET /v1/projects/{project_id}/files**
///
/// Returns the project's file records in insertion order. Any member.
pub async fn list_files(
    AuthUser(user): AuthUser,
    State(state): State<ProjectsState>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<Vec<ProjectFileResponse>>> {
    let project = find_project(&state, project_id).await?;

    if !project.is_member(user.id) {
        return Err(Error::Authorization(
            "Access denied: Not a member of this project".to_string(),
        ));
    }

    let files = state.repos.files.list_by_project(project_id).await?;
    let responses: Vec<ProjectFileResponse> = files.into_iter().map(Into::into).collect();

    Ok(Json(responses))
}

/// Record a file already held by the content store
///
/// **POST /v1/projects/{project_id}/files**
///
/// Any member. The extension is derived from `name` and validated against
/// the closed format set before anything else happens; a declared
/// `file_type` must agree with it.
pub async fn register_file(
    AuthUser(user): AuthUser,
    State(state): State<ProjectsState>,
    Path(project_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<RegisterFileRequest>,
) -> Result<(StatusCode, Json<ProjectFileResponse>)> {
    let project = find_project(&state, project_id).await?;

    if !project.is_member(user.id) {
        return Err(Error::Authorization(
            "Access denied: Not a member of this project".to_string(),
        ));
    }

    let kind = FileKind::from_file_name(&request.name)?;
    if let Some(declared) = &request.file_type {
        if declared.to_ascii_lowercase() != kind.to_string() {
            return Err(Error::Validation(format!(
                "Declared file type '{}' does not match file name '{}'",
                declared, request.name
            )));
        }
    }

    let file = ProjectFile::new(project_id, request.name, request.url, request.size, user.id)?;
    let created = state.repos.files.create(&file).await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Upload file bytes
///
/// **POST /v1/projects/{project_id}/files/upload** (multipart)
///
/// Any member. Each part is validated and uploaded independently: the
/// response reports a per-file status in submission order, and one file's
/// failure never aborts or rolls back its siblings. Unsupported extensions
/// are rejected before any call to the content store.
pub async fn upload_files(
    AuthUser(user): AuthUser,
    State(state): State<ProjectsState>,
    Path(project_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<Vec<FileUploadOutcome>>> {
    let project = find_project(&state, project_id).await?;

    if !project.is_member(user.id) {
        return Err(Error::Authorization(
            "Access denied: Not a member of this project".to_string(),
        ));
    }

    // Multipart parts must be drained sequentially before fanning out
    let mut parts: Vec<(Option<String>, Vec<u8>)> = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Validation(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::Validation(format!("Malformed multipart body: {}", e)))?
            .to_vec();
        parts.push((name, bytes));
    }

    let mut outcomes: Vec<Option<FileUploadOutcome>> = Vec::with_capacity(parts.len());
    outcomes.resize_with(parts.len(), || None);

    // Validate everything first, then fan the valid parts out as
    // independent tasks; results are collected back into submission order.
    let mut tasks: JoinSet<(usize, String, Result<ProjectFile>)> = JoinSet::new();

    for (index, (name, bytes)) in parts.into_iter().enumerate() {
        let Some(name) = name else {
            outcomes[index] = Some(FileUploadOutcome::rejected(
                format!("part-{}", index),
                "Multipart part has no file name".to_string(),
            ));
            continue;
        };

        if let Err(e) = FileKind::from_file_name(&name) {
            outcomes[index] = Some(FileUploadOutcome::rejected(name, e.to_string()));
            continue;
        }

        let store = Arc::clone(&state.store);
        let files = state.repos.files.clone();
        let uploader = user.id;
        tasks.spawn(async move {
            let result =
                store_one(store, files, project_id, uploader, name.clone(), bytes).await;
            (index, name, result)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let (index, name, result) =
            joined.map_err(|e| Error::Internal(format!("Upload task failed: {}", e)))?;
        outcomes[index] = Some(match result {
            Ok(file) => FileUploadOutcome::stored(file),
            Err(e) => {
                tracing::warn!(name = %name, error = %e, "File upload failed");
                FileUploadOutcome::failed(name, e.to_string())
            }
        });
    }

    let outcomes: Vec<FileUploadOutcome> = outcomes.into_iter().flatten().collect();
    Ok(Json(outcomes))
}

/// Store one file's bytes and record its metadata.
async fn store_one(
    store: Arc<dyn ContentStore>,
    files: FileRepository,
    project_id: Uuid,
    uploader: Uuid,
    name: String,
    bytes: Vec<u8>,
) -> Result<ProjectFile> {
    let stored = store
        .put(&name, bytes)
        .await
        .map_err(|e| Error::Internal(format!("Content store error: {}", e)))?;

    let record = ProjectFile::new(project_id, name, stored.url, stored.size, uploader)?;
    files.create(&record).await
}

/// Delete a file
///
/// **DELETE /v1/projects/{project_id}/files/{file_id}**
///
/// Lead-only. Removes the metadata record; remote object cleanup is
/// best-effort and never fails the call.
pub async fn delete_file(
    AuthUser(user): AuthUser,
    State(state): State<ProjectsState>,
    Path((project_id, file_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    let project = find_project(&state, project_id).await?;

    if !project.is_lead(user.id) {
        return Err(Error::Authorization(
            "Only the project lead can delete files".to_string(),
        ));
    }

    let file = state
        .repos
        .files
        .find(project_id, file_id)
        .await?
        .ok_or_else(|| Error::NotFound("File not found".to_string()))?;

    state.repos.files.delete(project_id, file_id).await?;

    if let Err(e) = state.store.delete(&file.url).await {
        tracing::warn!(url = %file.url, error = %e, "Remote object cleanup failed");
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Render a file for viewing
///
/// **GET /v1/projects/{project_id}/files/{file_id}/view**
///
/// Any member. Fetches the bytes from the content store and dispatches to
/// the renderer matching the file's kind. Malformed bytes are a
/// validation failure local to this call — the rest of the workspace is
/// unaffected.
pub async fn view_file(
    AuthUser(user): AuthUser,
    State(state): State<ProjectsState>,
    Path((project_id, file_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Scene>> {
    let project = find_project(&state, project_id).await?;

    if !project.is_member(user.id) {
        return Err(Error::Authorization(
            "Access denied: Not a member of this project".to_string(),
        ));
    }

    let file = state
        .repos
        .files
        .find(project_id, file_id)
        .await?
        .ok_or_else(|| Error::NotFound("File not found".to_string()))?;

    let bytes = state
        .store
        .fetch(&file.url)
        .await
        .map_err(|e| Error::Internal(format!("Failed to read artifact bytes: {}", e)))?;

    let scene = render(file.file_type.render_target(), &bytes, Canvas::default())
        .map_err(|e| Error::Validation(e.to_string()))?;

    Ok(Json(scene))
}
