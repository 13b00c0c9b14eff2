//! Domain entities for the Projects domain
//!
//! A project owns its roster (member set plus an optional lead), its join
//! requests, and its engineering artifact records. Users are externally
//! owned and referenced by identifier only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use atelier_common::{Error, Result};
use atelier_viewer::RenderTarget;

use crate::domain::state::{JoinRequestEvent, JoinRequestStateMachine, JoinRequestStatus};

/// Maximum project name length, matching the original admin form limits
pub const MAX_PROJECT_NAME_LEN: usize = 200;

/// Project status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "project_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Completed,
    OnHold,
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectStatus::Active => write!(f, "active"),
            ProjectStatus::Completed => write!(f, "completed"),
            ProjectStatus::OnHold => write!(f, "onhold"),
        }
    }
}

/// Project entity
///
/// Created and destroyed by collaborators outside this domain; here it is
/// read, and its roster and file list are mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub github_link: Option<String>,
    pub member_ids: Vec<Uuid>,
    pub project_lead_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a new project with validation
    pub fn new(name: String, description: String, created_by: Uuid) -> Result<Self> {
        if name.is_empty() || name.len() > MAX_PROJECT_NAME_LEN {
            return Err(Error::Validation(format!(
                "Project name must be 1-{} characters",
                MAX_PROJECT_NAME_LEN
            )));
        }

        let now = Utc::now();
        Ok(Project {
            id: Uuid::new_v4(),
            name,
            description,
            status: ProjectStatus::default(),
            github_link: None,
            member_ids: Vec::new(),
            project_lead_id: None,
            created_by,
            created_at: now,
            updated_at: now,
        })
    }

    /// Check roster membership
    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.member_ids.contains(&user_id)
    }

    /// Check whether the user is the project lead
    pub fn is_lead(&self, user_id: Uuid) -> bool {
        self.project_lead_id == Some(user_id)
    }

    /// Validate invariants
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() || self.name.len() > MAX_PROJECT_NAME_LEN {
            return Err(Error::Validation(format!(
                "Project name must be 1-{} characters",
                MAX_PROJECT_NAME_LEN
            )));
        }

        // The lead, when set, must be on the roster
        if let Some(lead_id) = self.project_lead_id {
            if !self.is_member(lead_id) {
                return Err(Error::Validation(
                    "Project lead must be a member of the project".to_string(),
                ));
            }
        }

        // Member identifiers form a set
        let unique: HashSet<&Uuid> = self.member_ids.iter().collect();
        if unique.len() != self.member_ids.len() {
            return Err(Error::Validation(
                "Member identifiers must be unique".to_string(),
            ));
        }

        Ok(())
    }
}

/// Closed set of supported artifact formats, derived from the file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "file_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Stl,
    Dxf,
}

impl FileKind {
    /// Derive the kind from a file name's extension.
    ///
    /// Any extension outside the closed set is rejected here, before any
    /// network call is made.
    pub fn from_file_name(name: &str) -> Result<Self> {
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "stl" => Ok(FileKind::Stl),
            "dxf" => Ok(FileKind::Dxf),
            _ => Err(Error::Validation(format!(
                "Unsupported file type: {}. Only .stl and .dxf files are allowed",
                name
            ))),
        }
    }

    /// Which renderer displays this kind of artifact.
    pub fn render_target(&self) -> RenderTarget {
        match self {
            FileKind::Stl => RenderTarget::Mesh,
            FileKind::Dxf => RenderTarget::Vector,
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileKind::Stl => write!(f, "stl"),
            FileKind::Dxf => write!(f, "dxf"),
        }
    }
}

/// Engineering artifact record. The bytes live in the external content
/// store; only the location is kept here. Owned by its project and deleted
/// with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectFile {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub url: String,
    pub file_type: FileKind,
    pub size_bytes: i64,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
}

impl ProjectFile {
    /// Create a new file record with validation.
    ///
    /// Re-uploading the same name later creates a new, independent record —
    /// there is no versioning.
    pub fn new(
        project_id: Uuid,
        name: String,
        url: String,
        size_bytes: i64,
        uploaded_by: Uuid,
    ) -> Result<Self> {
        let file_type = FileKind::from_file_name(&name)?;

        if size_bytes < 0 {
            return Err(Error::Validation(
                "File size cannot be negative".to_string(),
            ));
        }

        Ok(ProjectFile {
            id: Uuid::new_v4(),
            project_id,
            name,
            url,
            file_type,
            size_bytes,
            uploaded_by,
            uploaded_at: Utc::now(),
        })
    }
}

/// A pending ask by a non-member to join a project's roster.
///
/// Mutated exactly once, by the lead, and never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct JoinRequest {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub status: JoinRequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JoinRequest {
    pub fn new(project_id: Uuid, user_id: Uuid, message: String) -> Self {
        let now = Utc::now();
        JoinRequest {
            id: Uuid::new_v4(),
            project_id,
            user_id,
            message,
            status: JoinRequestStatus::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a resolution event. Resolving a request that is no longer
    /// pending is a conflict, never a silent overwrite.
    pub fn resolve(&mut self, event: JoinRequestEvent) -> Result<()> {
        let next = JoinRequestStateMachine::transition(self.status, event)
            .map_err(|_| Error::Conflict("Join request has already been resolved".to_string()))?;
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_creation() {
        let creator = Uuid::new_v4();
        let project = Project::new(
            "Rover Arm".to_string(),
            "Six-axis arm for the rover".to_string(),
            creator,
        )
        .unwrap();

        assert_eq!(project.status, ProjectStatus::Active);
        assert!(project.member_ids.is_empty());
        assert!(project.project_lead_id.is_none());
        assert_eq!(project.created_by, creator);
        assert!(project.validate().is_ok());
    }

    #[test]
    fn test_project_name_boundaries() {
        let creator = Uuid::new_v4();

        assert!(Project::new("".to_string(), "d".to_string(), creator).is_err());
        assert!(Project::new("a".repeat(200), "d".to_string(), creator).is_ok());
        assert!(Project::new("a".repeat(201), "d".to_string(), creator).is_err());
    }

    #[test]
    fn test_lead_must_be_member() {
        let creator = Uuid::new_v4();
        let lead = Uuid::new_v4();
        let mut project =
            Project::new("Rover Arm".to_string(), "d".to_string(), creator).unwrap();

        // Lead set but not on the roster → invalid
        project.project_lead_id = Some(lead);
        assert!(project.validate().is_err());

        // Lead on the roster → valid
        project.member_ids.push(lead);
        assert!(project.validate().is_ok());
    }

    #[test]
    fn test_duplicate_members_rejected() {
        let creator = Uuid::new_v4();
        let member = Uuid::new_v4();
        let mut project =
            Project::new("Rover Arm".to_string(), "d".to_string(), creator).unwrap();

        project.member_ids = vec![member, member];
        assert!(project.validate().is_err());
    }

    #[test]
    fn test_membership_checks() {
        let creator = Uuid::new_v4();
        let member = Uuid::new_v4();
        let outsider = Uuid::new_v4();
        let mut project =
            Project::new("Rover Arm".to_string(), "d".to_string(), creator).unwrap();
        project.member_ids.push(member);
        project.project_lead_id = Some(member);

        assert!(project.is_member(member));
        assert!(!project.is_member(outsider));
        assert!(project.is_lead(member));
        assert!(!project.is_lead(outsider));
    }

    #[test]
    fn test_file_kind_from_name() {
        assert_eq!(FileKind::from_file_name("arm.stl").unwrap(), FileKind::Stl);
        assert_eq!(
            FileKind::from_file_name("sketch.dxf").unwrap(),
            FileKind::Dxf
        );
        // Extension comparison is case-insensitive
        assert_eq!(FileKind::from_file_name("ARM.STL").unwrap(), FileKind::Stl);
        // Only the last extension counts
        assert_eq!(
            FileKind::from_file_name("arm.v2.stl").unwrap(),
            FileKind::Stl
        );
    }

    #[test]
    fn test_file_kind_rejects_closed_set_violations() {
        assert!(FileKind::from_file_name("model.obj").is_err());
        assert!(FileKind::from_file_name("part.step").is_err());
        assert!(FileKind::from_file_name("noextension").is_err());
        assert!(FileKind::from_file_name("trailingdot.").is_err());
        assert!(FileKind::from_file_name("").is_err());
    }

    #[test]
    fn test_file_kind_render_target() {
        assert_eq!(FileKind::Stl.render_target(), RenderTarget::Mesh);
        assert_eq!(FileKind::Dxf.render_target(), RenderTarget::Vector);
    }

    #[test]
    fn test_project_file_creation() {
        let project_id = Uuid::new_v4();
        let uploader = Uuid::new_v4();

        let mesh = ProjectFile::new(
            project_id,
            "arm.stl".to_string(),
            "https://store.example.com/abc".to_string(),
            2_000_000,
            uploader,
        )
        .unwrap();
        assert_eq!(mesh.file_type, FileKind::Stl);
        assert_eq!(mesh.size_bytes, 2_000_000);

        let drawing = ProjectFile::new(
            project_id,
            "sketch.dxf".to_string(),
            "https://store.example.com/def".to_string(),
            50_000,
            uploader,
        )
        .unwrap();
        assert_eq!(drawing.file_type, FileKind::Dxf);
        assert_eq!(drawing.size_bytes, 50_000);
    }

    #[test]
    fn test_project_file_rejects_unsupported_extension() {
        let result = ProjectFile::new(
            Uuid::new_v4(),
            "model.obj".to_string(),
            "https://store.example.com/ghi".to_string(),
            1024,
            Uuid::new_v4(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_project_file_rejects_negative_size() {
        let result = ProjectFile::new(
            Uuid::new_v4(),
            "arm.stl".to_string(),
            "https://store.example.com/jkl".to_string(),
            -1,
            Uuid::new_v4(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_same_name_uploads_are_independent_records() {
        let project_id = Uuid::new_v4();
        let uploader = Uuid::new_v4();
        let first = ProjectFile::new(
            project_id,
            "arm.stl".to_string(),
            "https://store.example.com/1".to_string(),
            10,
            uploader,
        )
        .unwrap();
        let second = ProjectFile::new(
            project_id,
            "arm.stl".to_string(),
            "https://store.example.com/2".to_string(),
            10,
            uploader,
        )
        .unwrap();

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_join_request_starts_pending() {
        let request = JoinRequest::new(Uuid::new_v4(), Uuid::new_v4(), "let me in".to_string());
        assert_eq!(request.status, JoinRequestStatus::Pending);
    }

    #[test]
    fn test_join_request_resolves_once() {
        let mut request =
            JoinRequest::new(Uuid::new_v4(), Uuid::new_v4(), "let me in".to_string());

        request.resolve(JoinRequestEvent::Approve).unwrap();
        assert_eq!(request.status, JoinRequestStatus::Approved);

        // Second resolution of any kind is a conflict
        let again = request.resolve(JoinRequestEvent::Approve);
        assert!(matches!(again, Err(Error::Conflict(_))));
        let flip = request.resolve(JoinRequestEvent::Reject);
        assert!(matches!(flip, Err(Error::Conflict(_))));
        assert_eq!(request.status, JoinRequestStatus::Approved);
    }

    #[test]
    fn test_join_request_reject_is_terminal() {
        let mut request =
            JoinRequest::new(Uuid::new_v4(), Uuid::new_v4(), "please".to_string());

        request.resolve(JoinRequestEvent::Reject).unwrap();
        assert_eq!(request.status, JoinRequestStatus::Rejected);
        assert!(request.resolve(JoinRequestEvent::Approve).is_err());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let file = ProjectFile::new(
            Uuid::new_v4(),
            "arm.stl".to_string(),
            "https://store.example.com/abc".to_string(),
            1024,
            Uuid::new_v4(),
        )
        .unwrap();

        let json = serde_json::to_string(&file).unwrap();
        assert!(json.contains(r#""file_type":"stl""#));
        let deserialized: ProjectFile = serde_json::from_str(&json).unwrap();
        assert_eq!(file, deserialized);
    }

    #[test]
    fn test_project_status_display() {
        assert_eq!(ProjectStatus::Active.to_string(), "active");
        assert_eq!(ProjectStatus::Completed.to_string(), "completed");
        assert_eq!(ProjectStatus::OnHold.to_string(), "onhold");
    }
}
