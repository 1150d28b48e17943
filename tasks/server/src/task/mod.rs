//! Task domain: the persisted [`Task`] record, the unvalidated [`TaskDraft`]
//! used while building or merging a task, and the rules that turn a draft into
//! a write-ready [`ValidTask`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

pub mod api;
pub mod service;
pub mod store;

/// Longest title the `tasks` table accepts.
pub const MAX_TITLE_LENGTH: usize = 255;

/// Rule violations reported by [`TaskDraft::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Task title is required")]
    MissingTitle,
    #[error("Task title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("Status must be 'pending' or 'completed', got '{0}'")]
    InvalidStatus(String),
    #[error("Priority must be 'low', 'medium' or 'high', got '{0}'")]
    InvalidPriority(String),
}

/// Completion state of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Completed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Completed => "completed",
        }
    }
}

impl FromStr for Status {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Status::Pending),
            "completed" => Ok(Status::Completed),
            other => Err(ValidationError::InvalidStatus(other.to_string())),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(ValidationError::InvalidPriority(other.to_string())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task that has been persisted and therefore has an ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Task {
    id: i32,
    title: String,
    description: Option<String>,
    status: Status,
    created_at: DateTime<Utc>,
    due_date: Option<NaiveDate>,
    priority: Priority,
}

impl Task {
    pub fn new(
        id: i32,
        title: String,
        description: Option<String>,
        status: Status,
        created_at: DateTime<Utc>,
        due_date: Option<NaiveDate>,
        priority: Priority,
    ) -> Self {
        Self {
            id,
            title,
            description,
            status,
            created_at,
            due_date,
            priority,
        }
    }

    /// Returns the ID assigned by the store.
    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }
}

/// Fields supplied when creating a task. Unset fields fall back to the task defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFields {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<String>,
}

/// Partial update of a task.
///
/// `None` leaves a field untouched. For the nullable fields the inner `None`
/// clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<String>,
    pub due_date: Option<Option<NaiveDate>>,
    pub priority: Option<String>,
}

/// A task under construction.
///
/// Status and priority are kept as raw text so that a draft can hold values
/// that [`TaskDraft::validate`] will later reject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    id: Option<i32>,
    title: String,
    description: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    due_date: Option<NaiveDate>,
    priority: String,
}

impl TaskDraft {
    /// Builds a draft from creation fields, defaulting status to `pending`,
    /// priority to `medium` and the creation time to now.
    pub fn new(fields: TaskFields) -> Self {
        Self {
            id: None,
            title: fields.title,
            description: fields.description,
            status: fields
                .status
                .unwrap_or_else(|| Status::default().as_str().to_string()),
            created_at: Utc::now(),
            due_date: fields.due_date,
            priority: fields
                .priority
                .unwrap_or_else(|| Priority::default().as_str().to_string()),
        }
    }

    /// Returns the ID of the task this draft was started from, if any.
    pub fn id(&self) -> Option<i32> {
        self.id
    }

    /// Overlays `changes` on top of the draft. ID and creation time are kept.
    pub fn apply(mut self, changes: TaskChanges) -> Self {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(due_date) = changes.due_date {
            self.due_date = due_date;
        }
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
        self
    }

    /// Checks the title, status and priority rules in that order and returns
    /// the first violation.
    pub fn validate(&self) -> Result<ValidTask, ValidationError> {
        if self.title.is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        if self.title.chars().count() > MAX_TITLE_LENGTH {
            return Err(ValidationError::TitleTooLong {
                max: MAX_TITLE_LENGTH,
            });
        }
        let status = self.status.parse::<Status>()?;
        let priority = self.priority.parse::<Priority>()?;

        Ok(ValidTask {
            title: self.title.clone(),
            description: self.description.clone(),
            status,
            created_at: self.created_at,
            due_date: self.due_date,
            priority,
        })
    }
}

impl From<Task> for TaskDraft {
    fn from(task: Task) -> Self {
        Self {
            id: Some(task.id),
            title: task.title,
            description: task.description,
            status: task.status.as_str().to_string(),
            created_at: task.created_at,
            due_date: task.due_date,
            priority: task.priority.as_str().to_string(),
        }
    }
}

/// A validated task, ready to be written by a [`store::TaskStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTask {
    title: String,
    description: Option<String>,
    status: Status,
    created_at: DateTime<Utc>,
    due_date: Option<NaiveDate>,
    priority: Priority,
}

impl ValidTask {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Combines the validated fields with a store-assigned ID.
    pub fn into_task(self, id: i32) -> Task {
        Task::new(
            id,
            self.title,
            self.description,
            self.status,
            self.created_at,
            self.due_date,
            self.priority,
        )
    }
}
