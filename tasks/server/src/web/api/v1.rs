use serde::Serialize;
use utoipa::ToSchema;

/// JSON body returned for every failed API request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServerErrorResponse {
    /// Human readable description of the failure
    #[schema(example = "Task with ID 1 not found")]
    pub error: String,
}

impl ServerErrorResponse {
    pub fn new(error: String) -> Self {
        Self { error }
    }
}

/// JSON body confirming an operation that returns no resource.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Task deleted successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: String) -> Self {
        Self { message }
    }
}
