//! Projects domain: rosters, join requests, engineering artifacts

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{
    FileKind, JoinRequest, Project, ProjectFile, ProjectStatus, MAX_PROJECT_NAME_LEN,
};
pub use domain::state::{
    JoinRequestEvent, JoinRequestStateMachine, JoinRequestStatus, StateError,
};

// Re-export repository types
pub use repository::{
    add_member_tx, resolve_join_request_tx, FileRepository, JoinRequestRepository,
    JoinRequestWithUser, MemberProfile, MemberRepository, ProjectRepository,
    ProjectsRepositories, UserProfile, UserRepository,
};

// Re-export API types
pub use api::routes;
pub use api::ProjectsState;
