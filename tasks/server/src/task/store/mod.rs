//! Persistence contract for tasks and its adapters.
//!
//! Stores never fail because a row is missing: lookups return `None` and
//! deletes return `false`. Only backend failures surface as [`StorageError`].

use async_trait::async_trait;

use crate::task::{Task, ValidTask};

mod database;
mod memory;

pub use database::SeaOrmTaskStore;
pub use memory::InMemoryTaskStore;

/// Errors raised by a [`TaskStore`] when the backend fails.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    /// Represents a stored row that no longer maps onto a task.
    #[error("Task {id} holds an invalid record: {reason}")]
    CorruptRecord { id: i32, reason: String },
    /// Represents a store that cannot be reached.
    #[error("Task store unavailable: {0}")]
    Unavailable(String),
}

/// Storage operations the task use cases rely on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Returns every task, ordered by ID.
    async fn get_all(&self) -> Result<Vec<Task>, StorageError>;

    /// Returns the task with the given ID, or `None` if there is none.
    async fn get_by_id(&self, id: i32) -> Result<Option<Task>, StorageError>;

    /// Inserts a task and returns it with its assigned ID.
    async fn create(&self, task: ValidTask) -> Result<Task, StorageError>;

    /// Overwrites the mutable fields of a task. The creation time is never written.
    ///
    /// Returns `None` if no task has the given ID.
    async fn update(&self, id: i32, task: ValidTask) -> Result<Option<Task>, StorageError>;

    /// Removes a task. Returns `true` if a row was deleted.
    async fn delete(&self, id: i32) -> Result<bool, StorageError>;
}
