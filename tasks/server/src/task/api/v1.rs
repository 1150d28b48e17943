use crate::task::service::{TaskService, TaskServiceError};
use crate::task::{Priority, Status, Task, TaskChanges, TaskFields};
use crate::web::api::v1::{MessageResponse, ServerErrorResponse};
use axum::{
    Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::Json,
    routing::get,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

type ApiError = (StatusCode, Json<ServerErrorResponse>);

#[derive(Clone)]
pub struct TaskState {
    pub service: TaskService,
}

/// JSON representation of a Task for API responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct TaskJson {
    /// Unique identifier assigned on creation
    #[schema(example = 1)]
    id: i32,
    /// Title of the task
    #[schema(example = "Write report")]
    title: String,
    /// Optional longer description
    description: Option<String>,
    /// Current status of the task
    status: Status,
    /// When the task was created
    created_at: DateTime<Utc>,
    /// Optional deadline
    due_date: Option<NaiveDate>,
    /// Priority of the task
    priority: Priority,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            id: task.id(),
            title: task.title().to_string(),
            description: task.description().map(str::to_string),
            status: task.status(),
            created_at: task.created_at(),
            due_date: task.due_date(),
            priority: task.priority(),
        }
    }
}

/// Request body for creating a task. Only `title` is required.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    /// Title of the task
    #[schema(example = "Write report")]
    title: Option<String>,
    /// Optional longer description
    description: Option<String>,
    /// `pending` or `completed`, defaults to `pending`
    #[schema(example = "pending")]
    status: Option<String>,
    /// Optional deadline
    due_date: Option<NaiveDate>,
    /// `low`, `medium` or `high`, defaults to `medium`
    #[schema(example = "high")]
    priority: Option<String>,
}

impl From<CreateTaskRequest> for TaskFields {
    fn from(request: CreateTaskRequest) -> Self {
        Self {
            title: request.title.unwrap_or_default(),
            description: request.description,
            status: request.status,
            due_date: request.due_date,
            priority: request.priority,
        }
    }
}

/// Request body for updating a task.
///
/// Omitted fields keep their current value. `null` clears `description` and
/// `due_date`; it is rejected for the other fields.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTaskRequest {
    /// Title of the task
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    title: Option<Option<String>>,
    /// Longer description, `null` to clear it
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    description: Option<Option<String>>,
    /// `pending` or `completed`
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    status: Option<Option<String>>,
    /// Deadline, `null` to clear it
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<NaiveDate>)]
    due_date: Option<Option<NaiveDate>>,
    /// `low`, `medium` or `high`
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    priority: Option<Option<String>>,
}

/// Marks a key as present, so that `null` and a missing key stay distinguishable.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl From<UpdateTaskRequest> for TaskChanges {
    fn from(request: UpdateTaskRequest) -> Self {
        // An explicit null on a required field becomes an empty value, which fails validation.
        Self {
            title: request.title.map(Option::unwrap_or_default),
            description: request.description,
            status: request.status.map(Option::unwrap_or_default),
            due_date: request.due_date,
            priority: request.priority.map(Option::unwrap_or_default),
        }
    }
}

/// Maps a service error onto a status code and a client-safe body.
///
/// Storage failures are logged and replaced by `failure_message`.
fn service_error(err: TaskServiceError, failure_message: &str) -> ApiError {
    match &err {
        TaskServiceError::Validation(_) => (
            StatusCode::BAD_REQUEST,
            Json(ServerErrorResponse::new(err.to_string())),
        ),
        TaskServiceError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(ServerErrorResponse::new(err.to_string())),
        ),
        TaskServiceError::Storage(_) => {
            tracing::error!("{}: {}", failure_message, err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ServerErrorResponse::new(failure_message.to_string())),
            )
        }
    }
}

fn task_id(id: Result<Path<i32>, PathRejection>) -> Result<i32, ApiError> {
    id.map(|Path(id)| id).map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(ServerErrorResponse::new(format!(
                "Invalid task id: {}",
                rejection.body_text()
            ))),
        )
    })
}

fn request_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(ServerErrorResponse::new(format!(
                "Invalid request body: {}",
                rejection.body_text()
            ))),
        )
    })
}

/// Handler for GET /api/tasks - Returns all tasks.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/tasks",
    responses(
        (status = 200, description = "Successfully retrieved tasks", body = [TaskJson]),
        (status = 500, description = "Internal server error", body = ServerErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn list_tasks_handler(
    State(state): State<Arc<TaskState>>,
) -> Result<Json<Vec<TaskJson>>, ApiError> {
    let tasks = state
        .service
        .list_all()
        .await
        .map_err(|err| service_error(err, "Failed to retrieve tasks"))?;
    Ok(Json(tasks.into_iter().map(TaskJson::from).collect()))
}

/// Handler for GET /api/tasks/{id} - Returns a single task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    params(("id" = i32, Path, description = "ID of the task")),
    responses(
        (status = 200, description = "Successfully retrieved task", body = TaskJson),
        (status = 400, description = "Invalid task id", body = ServerErrorResponse),
        (status = 404, description = "Task not found", body = ServerErrorResponse),
        (status = 500, description = "Internal server error", body = ServerErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_task_handler(
    State(state): State<Arc<TaskState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<TaskJson>, ApiError> {
    let id = task_id(id)?;
    let task = state
        .service
        .get_by_id(id)
        .await
        .map_err(|err| service_error(err, "Failed to retrieve task"))?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for POST /api/tasks - Creates a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskJson),
        (status = 400, description = "Invalid task", body = ServerErrorResponse),
        (status = 500, description = "Internal server error", body = ServerErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_task_handler(
    State(state): State<Arc<TaskState>>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskJson>), ApiError> {
    let request = request_body(payload)?;
    let task = state
        .service
        .create(request.into())
        .await
        .map_err(|err| service_error(err, "Failed to create task"))?;
    Ok((StatusCode::CREATED, Json(TaskJson::from(task))))
}

/// Handler for PUT /api/tasks/{id} - Merges the given fields onto a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    params(("id" = i32, Path, description = "ID of the task")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskJson),
        (status = 400, description = "Invalid task", body = ServerErrorResponse),
        (status = 404, description = "Task not found", body = ServerErrorResponse),
        (status = 500, description = "Internal server error", body = ServerErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_handler(
    State(state): State<Arc<TaskState>>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<TaskJson>, ApiError> {
    let id = task_id(id)?;
    let request = request_body(payload)?;
    let task = state
        .service
        .update(id, request.into())
        .await
        .map_err(|err| service_error(err, "Failed to update task"))?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for DELETE /api/tasks/{id} - Deletes a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(("id" = i32, Path, description = "ID of the task")),
    responses(
        (status = 200, description = "Task deleted", body = MessageResponse),
        (status = 400, description = "Invalid task id", body = ServerErrorResponse),
        (status = 404, description = "Task not found", body = ServerErrorResponse),
        (status = 500, description = "Internal server error", body = ServerErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(state): State<Arc<TaskState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = task_id(id)?;
    state
        .service
        .delete(id)
        .await
        .map_err(|err| service_error(err, "Failed to delete task"))?;
    Ok(Json(MessageResponse::new(
        "Task deleted successfully".to_string(),
    )))
}

/// Creates and returns the tasks API router.
pub fn create_api_router(state: Arc<TaskState>) -> Router {
    Router::new()
        .route("/", get(list_tasks_handler).post(create_task_handler))
        .route(
            "/{id}",
            get(get_task_handler)
                .put(update_task_handler)
                .delete(delete_task_handler),
        )
        .with_state(state)
}
