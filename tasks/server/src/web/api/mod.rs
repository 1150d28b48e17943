use std::sync::Arc;

use axum::Router;
use utoipa::OpenApi;

use crate::task::api::v1::{
    self as tasks_v1, CreateTaskRequest, TaskJson, TaskState, UpdateTaskRequest,
};
use crate::task::{Priority, Status};

pub mod v1;

/// OpenAPI document for the JSON API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tasks API",
        version = "1.0.0",
        description = "REST API for managing tasks"
    ),
    paths(
        tasks_v1::list_tasks_handler,
        tasks_v1::get_task_handler,
        tasks_v1::create_task_handler,
        tasks_v1::update_task_handler,
        tasks_v1::delete_task_handler,
    ),
    components(schemas(
        TaskJson,
        CreateTaskRequest,
        UpdateTaskRequest,
        Status,
        Priority,
        v1::ServerErrorResponse,
        v1::MessageResponse,
    )),
    tags((name = "Tasks", description = "Create, read, update and delete tasks"))
)]
pub struct ApiDoc;

/// Creates the API routes for JSON API endpoints.
pub fn create_api_router(task_state: Arc<TaskState>) -> Router {
    let tasks_router = tasks_v1::create_api_router(task_state);
    Router::new().nest("/api/tasks", tasks_router)
}
