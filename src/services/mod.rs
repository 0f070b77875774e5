// Service exports
pub mod cache;
pub mod memory;
pub mod postgres;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use memory::MemoryUserStore;
pub use postgres::PostgresUserStore;

use crate::models::{NewUser, User, UserId};
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when interacting with user storage
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("A user with email {0} already exists")]
    DuplicateEmail(String),

    #[error("User {0} not found")]
    NotFound(UserId),

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

/// Population storage
///
/// Implementations must never expose a partially written user: every read
/// observes complete records, and `list_users` returns one consistent
/// snapshot ordered by `user_id`.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Short backend name for health reporting
    fn backend(&self) -> &'static str;

    /// Persist a new user and assign its id and creation time
    async fn create_user(&self, new_user: NewUser) -> Result<User, StoreError>;

    /// Replace every field of an existing user, keeping id and creation time
    async fn replace_user(&self, user_id: UserId, new_user: NewUser) -> Result<User, StoreError>;

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, StoreError>;

    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
