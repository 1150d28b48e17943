use std::sync::Arc;

use crate::task::store::{StorageError, TaskStore};
use crate::task::{Task, TaskChanges, TaskDraft, TaskFields, ValidationError};

/// Error type for TaskService operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    /// Represents a task that breaks one of the task rules.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Represents a task not found error.
    #[error("Task with ID {0} not found")]
    NotFound(i32),
    /// Represents a storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Task use cases, written against any [`TaskStore`].
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Retrieves all tasks.
    ///
    /// # Returns
    ///
    /// A `Result` containing every stored `Task`, or a storage error.
    #[tracing::instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Task>, TaskServiceError> {
        Ok(self.store.get_all().await?)
    }

    /// Retrieves a task by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to retrieve.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Task`, or `NotFound` if no task has this ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_id(&self, id: i32) -> Result<Task, TaskServiceError> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or(TaskServiceError::NotFound(id))
    }

    /// Creates a new task from the given fields, applying the task defaults.
    ///
    /// # Arguments
    ///
    /// * `fields` - The fields of the new task.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `Task`, or a validation or storage error.
    #[tracing::instrument(skip(self))]
    pub async fn create(&self, fields: TaskFields) -> Result<Task, TaskServiceError> {
        let valid_task = TaskDraft::new(fields).validate()?;
        Ok(self.store.create(valid_task).await?)
    }

    /// Updates a task by merging `changes` onto the stored record.
    ///
    /// Fields missing from `changes` keep their current value.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to update.
    /// * `changes` - The fields to overwrite.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `Task`, or a not found, validation or storage error.
    #[tracing::instrument(skip(self))]
    pub async fn update(&self, id: i32, changes: TaskChanges) -> Result<Task, TaskServiceError> {
        let existing = self.get_by_id(id).await?;
        let valid_task = TaskDraft::from(existing).apply(changes).validate()?;

        match self.store.update(id, valid_task).await? {
            Some(task) => Ok(task),
            None => {
                tracing::warn!("Task {} disappeared before it could be updated", id);
                Err(TaskServiceError::NotFound(id))
            }
        }
    }

    /// Deletes a task by its ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to delete.
    ///
    /// # Returns
    ///
    /// An empty `Result`, or `NotFound` if no task has this ID.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), TaskServiceError> {
        if self.store.delete(id).await? {
            Ok(())
        } else {
            Err(TaskServiceError::NotFound(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::store::MockTaskStore;
    use crate::task::{Priority, Status};
    use chrono::{NaiveDate, Utc};
    use mockall::predicate::eq;

    fn stored_task(id: i32) -> Task {
        Task::new(
            id,
            "Write report".to_string(),
            Some("Quarterly numbers".to_string()),
            Status::Pending,
            Utc::now(),
            NaiveDate::from_ymd_opt(2025, 6, 30),
            Priority::High,
        )
    }

    fn service(store: MockTaskStore) -> TaskService {
        TaskService::new(Arc::new(store))
    }

    #[tokio::test]
    async fn can_list_all_tasks_verbatim() {
        let tasks = vec![stored_task(1), stored_task(2)];
        let returned = tasks.clone();
        let mut store = MockTaskStore::new();
        store
            .expect_get_all()
            .times(1)
            .returning(move || Ok(returned.clone()));

        let listed = service(store).list_all().await.unwrap();

        assert_eq!(listed, tasks);
    }

    #[tokio::test]
    async fn can_report_missing_task_as_not_found() {
        let mut store = MockTaskStore::new();
        store
            .expect_get_by_id()
            .with(eq(42))
            .returning(|_| Ok(None));

        let result = service(store).get_by_id(42).await;

        assert!(matches!(result, Err(TaskServiceError::NotFound(42))));
    }

    #[tokio::test]
    async fn can_create_task_with_defaults() {
        let mut store = MockTaskStore::new();
        store
            .expect_create()
            .withf(|task| {
                task.title() == "Buy milk"
                    && task.status() == Status::Pending
                    && task.priority() == Priority::Medium
            })
            .times(1)
            .returning(|task| Ok(task.into_task(5)));

        let created = service(store)
            .create(TaskFields {
                title: "Buy milk".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(created.id(), 5);
        assert_eq!(created.status(), Status::Pending);
        assert_eq!(created.priority(), Priority::Medium);
    }

    #[tokio::test]
    async fn can_reject_invalid_task_without_touching_store() {
        let mut store = MockTaskStore::new();
        store.expect_create().never();

        let service = service(store);
        let empty_title = service.create(TaskFields::default()).await;
        let bad_status = service
            .create(TaskFields {
                title: "x".to_string(),
                status: Some("archived".to_string()),
                ..Default::default()
            })
            .await;

        assert!(matches!(
            empty_title,
            Err(TaskServiceError::Validation(ValidationError::MissingTitle))
        ));
        assert!(matches!(
            bad_status,
            Err(TaskServiceError::Validation(ValidationError::InvalidStatus(_)))
        ));
    }

    #[tokio::test]
    async fn can_update_only_the_given_fields() {
        let existing = stored_task(3);
        let expected_title = existing.title().to_string();
        let mut store = MockTaskStore::new();
        let found = existing.clone();
        store
            .expect_get_by_id()
            .with(eq(3))
            .returning(move |_| Ok(Some(found.clone())));
        store
            .expect_update()
            .withf(move |id, task| {
                *id == 3 && task.title() == expected_title && task.priority() == Priority::Low
            })
            .times(1)
            .returning(|id, task| Ok(Some(task.into_task(id))));

        let updated = service(store)
            .update(
                3,
                TaskChanges {
                    priority: Some("low".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id(), 3);
        assert_eq!(updated.title(), existing.title());
        assert_eq!(updated.description(), existing.description());
        assert_eq!(updated.status(), existing.status());
        assert_eq!(updated.due_date(), existing.due_date());
        assert_eq!(updated.priority(), Priority::Low);
    }

    #[tokio::test]
    async fn can_reject_invalid_update_without_writing() {
        let mut store = MockTaskStore::new();
        store
            .expect_get_by_id()
            .returning(|id| Ok(Some(stored_task(id))));
        store.expect_update().never();

        let result = service(store)
            .update(
                3,
                TaskChanges {
                    priority: Some("urgent".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(TaskServiceError::Validation(ValidationError::InvalidPriority(_)))
        ));
    }

    #[tokio::test]
    async fn can_report_not_found_when_updating_missing_task() {
        let mut store = MockTaskStore::new();
        store.expect_get_by_id().returning(|_| Ok(None));
        store.expect_update().never();

        let result = service(store).update(8, TaskChanges::default()).await;

        assert!(matches!(result, Err(TaskServiceError::NotFound(8))));
    }

    #[tokio::test]
    async fn can_report_not_found_when_task_vanishes_during_update() {
        let mut store = MockTaskStore::new();
        store
            .expect_get_by_id()
            .returning(|id| Ok(Some(stored_task(id))));
        store.expect_update().returning(|_, _| Ok(None));

        let result = service(store).update(4, TaskChanges::default()).await;

        assert!(matches!(result, Err(TaskServiceError::NotFound(4))));
    }

    #[tokio::test]
    async fn can_report_not_found_when_deleting_missing_task() {
        let mut store = MockTaskStore::new();
        store.expect_delete().with(eq(6)).returning(|_| Ok(false));

        let result = service(store).delete(6).await;

        assert!(matches!(result, Err(TaskServiceError::NotFound(6))));
    }

    #[tokio::test]
    async fn can_propagate_storage_errors() {
        let mut store = MockTaskStore::new();
        store
            .expect_get_all()
            .returning(|| Err(StorageError::Unavailable("connection refused".to_string())));
        store
            .expect_delete()
            .returning(|_| Err(StorageError::Unavailable("connection refused".to_string())));

        let service = service(store);

        assert!(matches!(
            service.list_all().await,
            Err(TaskServiceError::Storage(_))
        ));
        assert!(matches!(
            service.delete(1).await,
            Err(TaskServiceError::Storage(_))
        ));
    }
}
