use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{StorageError, TaskStore};
use crate::task::{Task, ValidTask};

/// Thread-safe [`TaskStore`] that keeps tasks in memory.
///
/// IDs start at 1 and are never reused, matching a serial primary key.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: BTreeMap<i32, Task>,
    last_id: i32,
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, InMemoryTaskState>, StorageError> {
        self.state
            .read()
            .map_err(|_| StorageError::Unavailable("task store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, InMemoryTaskState>, StorageError> {
        self.state
            .write()
            .map_err(|_| StorageError::Unavailable("task store lock poisoned".to_string()))
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn get_all(&self) -> Result<Vec<Task>, StorageError> {
        Ok(self.read()?.tasks.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Task>, StorageError> {
        Ok(self.read()?.tasks.get(&id).cloned())
    }

    async fn create(&self, valid_task: ValidTask) -> Result<Task, StorageError> {
        let mut state = self.write()?;
        state.last_id += 1;
        let task = valid_task.into_task(state.last_id);
        state.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update(&self, id: i32, valid_task: ValidTask) -> Result<Option<Task>, StorageError> {
        let mut state = self.write()?;
        let Some(existing) = state.tasks.get_mut(&id) else {
            return Ok(None);
        };
        *existing = Task {
            created_at: existing.created_at,
            ..valid_task.into_task(id)
        };
        Ok(Some(existing.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool, StorageError> {
        Ok(self.write()?.tasks.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Priority, TaskChanges, TaskDraft, TaskFields};

    fn valid(title: &str) -> ValidTask {
        TaskDraft::new(TaskFields {
            title: title.to_string(),
            ..Default::default()
        })
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn can_assign_increasing_ids() {
        let store = InMemoryTaskStore::new();

        let first = store.create(valid("first")).await.unwrap();
        let second = store.create(valid("second")).await.unwrap();

        assert_eq!(first.id(), 1);
        assert_eq!(second.id(), 2);
        assert_eq!(store.get_all().await.unwrap(), vec![first, second]);
    }

    #[tokio::test]
    async fn can_not_reuse_deleted_ids() {
        let store = InMemoryTaskStore::new();
        let first = store.create(valid("first")).await.unwrap();

        assert!(store.delete(first.id()).await.unwrap());
        let second = store.create(valid("second")).await.unwrap();

        assert_eq!(second.id(), 2);
    }

    #[tokio::test]
    async fn can_keep_creation_time_on_update() {
        let store = InMemoryTaskStore::new();
        let created = store.create(valid("first")).await.unwrap();

        let changes = TaskDraft::new(TaskFields {
            title: "renamed".to_string(),
            ..Default::default()
        })
        .apply(TaskChanges {
            priority: Some("high".to_string()),
            ..Default::default()
        })
        .validate()
        .unwrap();
        let updated = store.update(created.id(), changes).await.unwrap().unwrap();

        assert_eq!(updated.title(), "renamed");
        assert_eq!(updated.priority(), Priority::High);
        assert_eq!(updated.created_at(), created.created_at());
    }

    #[tokio::test]
    async fn can_report_missing_rows_without_error() {
        let store = InMemoryTaskStore::new();

        assert_eq!(store.get_by_id(9).await.unwrap(), None);
        assert_eq!(store.update(9, valid("ghost")).await.unwrap(), None);
        assert!(!store.delete(9).await.unwrap());
    }
}
