use async_trait::async_trait;
use chrono::Utc;
use sea_orm::*;
use std::sync::Arc;

use super::{StorageError, TaskStore};
use crate::entities::task;
use crate::task::{Priority, Status, Task, ValidTask};

/// [`TaskStore`] backed by a SeaORM connection pool.
#[derive(Clone, Debug)]
pub struct SeaOrmTaskStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmTaskStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl TryFrom<task::Model> for Task {
    type Error = StorageError;

    fn try_from(model: task::Model) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| StorageError::CorruptRecord {
            id: model.id,
            reason,
        };
        let status = model
            .status
            .parse::<Status>()
            .map_err(|e| corrupt(e.to_string()))?;
        let priority = model
            .priority
            .parse::<Priority>()
            .map_err(|e| corrupt(e.to_string()))?;

        Ok(Task::new(
            model.id,
            model.title,
            model.description,
            status,
            model.created_at.with_timezone(&Utc),
            model.due_date,
            priority,
        ))
    }
}

/// Copies the mutable fields of `valid_task` into `active_model`.
fn set_fields(active_model: &mut task::ActiveModel, valid_task: &ValidTask) {
    active_model.title = ActiveValue::Set(valid_task.title().to_string());
    active_model.description = ActiveValue::Set(valid_task.description().map(str::to_string));
    active_model.status = ActiveValue::Set(valid_task.status().as_str().to_string());
    active_model.due_date = ActiveValue::Set(valid_task.due_date());
    active_model.priority = ActiveValue::Set(valid_task.priority().as_str().to_string());
}

#[async_trait]
impl TaskStore for SeaOrmTaskStore {
    #[tracing::instrument(skip(self), err)]
    async fn get_all(&self) -> Result<Vec<Task>, StorageError> {
        task::Entity::find()
            .order_by_asc(task::Column::Id)
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(Task::try_from)
            .collect()
    }

    #[tracing::instrument(skip(self), err)]
    async fn get_by_id(&self, id: i32) -> Result<Option<Task>, StorageError> {
        task::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .map(Task::try_from)
            .transpose()
    }

    #[tracing::instrument(skip(self), err)]
    async fn create(&self, valid_task: ValidTask) -> Result<Task, StorageError> {
        let mut active_model = task::ActiveModel {
            created_at: ActiveValue::Set(valid_task.created_at().fixed_offset()),
            ..Default::default()
        };
        set_fields(&mut active_model, &valid_task);
        let created_model = active_model.insert(self.db.as_ref()).await?;
        tracing::info!("Created task {}", created_model.id);
        Task::try_from(created_model)
    }

    #[tracing::instrument(skip(self), err)]
    async fn update(&self, id: i32, valid_task: ValidTask) -> Result<Option<Task>, StorageError> {
        let Some(existing) = task::Entity::find_by_id(id).one(self.db.as_ref()).await? else {
            return Ok(None);
        };

        let mut active_model: task::ActiveModel = existing.into();
        set_fields(&mut active_model, &valid_task);
        match active_model.update(self.db.as_ref()).await {
            Ok(updated_model) => Task::try_from(updated_model).map(Some),
            // The row was deleted between the lookup and the write.
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[tracing::instrument(skip(self), err)]
    async fn delete(&self, id: i32) -> Result<bool, StorageError> {
        let result = task::Entity::delete_by_id(id).exec(self.db.as_ref()).await?;
        Ok(result.rows_affected > 0)
    }
}
