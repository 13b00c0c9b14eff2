//! Repository implementations for the Projects domain

pub mod files;
pub mod join_requests;
pub mod members;
pub mod projects;
pub mod transactions;
pub mod users;

use sqlx::{PgPool, Postgres, Transaction};

pub use files::FileRepository;
pub use join_requests::{JoinRequestRepository, JoinRequestWithUser};
pub use members::{MemberProfile, MemberRepository};
pub use projects::ProjectRepository;
pub use transactions::{add_member_tx, resolve_join_request_tx};
pub use users::{UserProfile, UserRepository};

/// Combined repository access for the Projects domain
#[derive(Clone)]
pub struct ProjectsRepositories {
    pool: PgPool,
    pub projects: ProjectRepository,
    pub members: MemberRepository,
    pub files: FileRepository,
    pub join_requests: JoinRequestRepository,
    pub users: UserRepository,
}

impl ProjectsRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            projects: ProjectRepository::new(pool.clone()),
            members: MemberRepository::new(pool.clone()),
            files: FileRepository::new(pool.clone()),
            join_requests: JoinRequestRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            pool,
        }
    }

    /// Begin a new database transaction.
    pub async fn begin(&self) -> std::result::Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }
}
