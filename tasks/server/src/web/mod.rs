use axum::Router;
use axum::response::Html;
use migration::MigratorTrait;
use sea_orm::Database;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::task::api::v1::TaskState;
use crate::task::service::TaskService;
use crate::task::store::SeaOrmTaskStore;

pub mod api;

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    let db = Database::connect(&config.db_url).await?;
    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let store = SeaOrmTaskStore::new(Arc::new(db));
    let app = create_app(TaskService::new(Arc::new(store)));
    tracing::info!(
        "API documentation available at http://{}/api-docs",
        server_address
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Assembles the full application router around a task service.
pub fn create_app(service: TaskService) -> Router {
    let task_state = Arc::new(TaskState { service });

    let public_routes = Router::new()
        .route("/health", axum::routing::get(health_check_handler))
        .route("/", axum::routing::get(welcome_handler));

    Router::new()
        .merge(public_routes)
        .merge(api::create_api_router(task_state))
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", api::ApiDoc::openapi()))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}

#[tracing::instrument]
pub async fn welcome_handler() -> Html<&'static str> {
    Html(r#"Tasks API is running. See the <a href="/api-docs">API documentation</a>."#)
}
