// In crates/web-server/src/lib.rs

use app_config::types::ServerSettings;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use engine::{ControlRequest, ControlResponse, StatusReport, TradingExecutor};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use types::ApiResponse;

pub mod error;
pub mod types;

// Re-export our custom error type for convenience.
pub use error::{Error, Result};

/// The shared application state that is available to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<TradingExecutor>,
}

/// Creates the main application router with all routes and middleware.
pub fn create_router(app_state: AppState) -> Router {
    // The control API is consumed by a separately served dashboard.
    let cors = tower_http::cors::CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    let api_router = Router::new().route(
        "/trading/executor",
        get(get_executor_status_handler).post(post_executor_command_handler),
    );

    Router::new()
        .route("/health", get(health_check_handler))
        .nest("/api", api_router)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

async fn health_check_handler() -> &'static str {
    "OK"
}

/// `GET /api/trading/executor`: the status document.
async fn get_executor_status_handler(
    State(state): State<AppState>,
) -> Json<ApiResponse<StatusReport>> {
    Json(ApiResponse::ok(state.executor.status_report().await))
}

/// `POST /api/trading/executor`: a `start`, `stop` or `config` command.
async fn post_executor_command_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<ControlRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ControlResponse>>> {
    let Json(request) = body.map_err(|e| Error::BadRequest(e.body_text()))?;
    tracing::info!(action = %request.action, "Executor command received.");

    let response = state.executor.handle(request).await?;
    Ok(Json(ApiResponse::ok(response)))
}

/// Serves the control API until `shutdown` resolves.
pub async fn run(
    settings: &ServerSettings,
    executor: Arc<TradingExecutor>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = create_router(AppState { executor });

    let address = format!("{}:{}", settings.host, settings.port);
    let listener = TcpListener::bind(&address).await.map_err(Error::ServerBindError)?;
    tracing::info!("Web server listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(Error::ServeError)
}
