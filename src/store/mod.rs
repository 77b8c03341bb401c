//! Repository interfaces for users and messages.
//!
//! Services only see `Arc<dyn UserStore>` / `Arc<dyn MessageStore>`; the
//! PostgreSQL and in-process backends both implement the two traits.

use async_trait::async_trait;
use uuid::Uuid;

pub mod memory;
pub mod postgres;
pub mod types;

use types::{Message, ProfileChanges, User};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already registered")]
    EmailTaken,

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            // users_email_key is the only unique index besides primary keys.
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::EmailTaken,
            sqlx::Error::PoolTimedOut => StoreError::Unavailable("connection pool timed out".into()),
            sqlx::Error::PoolClosed => StoreError::Unavailable("connection pool closed".into()),
            other => StoreError::Database(other),
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. A duplicate email fails with `EmailTaken`, atomically.
    async fn create(&self, name: &str, email: &str, password_hash: &str)
        -> Result<User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Apply only the supplied fields. `None` when the user does not exist.
    async fn update_profile(
        &self,
        id: Uuid,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, StoreError>;

    /// Compare-and-swap on the stored hash.
    ///
    /// Returns `false` if the user is gone or its hash no longer equals
    /// `expected_hash`, so two concurrent changes cannot both win.
    async fn replace_password_hash(
        &self,
        id: Uuid,
        expected_hash: &str,
        new_hash: &str,
    ) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn insert(
        &self,
        user_id: Uuid,
        content: &str,
        from_automated: bool,
    ) -> Result<Message, StoreError>;

    /// All messages owned by `user_id`, oldest first.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Message>, StoreError>;
}
