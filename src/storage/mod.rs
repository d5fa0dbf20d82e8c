use async_trait::async_trait;
use thiserror::Error;

use crate::expenses::repo_types::{Expense, ExpenseFields};
use crate::users::repo_types::{NewUser, User};

pub mod memory;

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("duplicate value for a unique key")]
    Duplicate,
    #[error("referenced record does not exist")]
    MissingReference,
    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return Self::Duplicate;
            }
            if db.is_foreign_key_violation() {
                return Self::MissingReference;
            }
        }
        Self::Database(e)
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> StorageResult<User>;
    async fn get_by_id(&self, id: i64) -> StorageResult<Option<User>>;
    async fn get_all(&self) -> StorageResult<Vec<User>>;
    async fn exists_by_email(&self, email: &str) -> StorageResult<bool>;
    async fn find_by_email(&self, email: &str) -> StorageResult<Option<User>>;
}

/// Listings are returned in id (insertion) order.
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    async fn create(&self, fields: ExpenseFields) -> StorageResult<Expense>;
    async fn get_by_id(&self, id: i64) -> StorageResult<Option<Expense>>;
    async fn get_all(&self) -> StorageResult<Vec<Expense>>;
    async fn get_by_user(&self, user_id: i64) -> StorageResult<Vec<Expense>>;
    async fn exists_by_id(&self, id: i64) -> StorageResult<bool>;
    /// `None` when no row with `expense.id` exists anymore.
    async fn update(&self, expense: &Expense) -> StorageResult<Option<Expense>>;
    /// Returns whether a row was removed.
    async fn delete_by_id(&self, id: i64) -> StorageResult<bool>;
}
