//! HTTP API
//!
//! Axum service exposing the process/download lifecycle, a health endpoint,
//! and an optional static frontend.

mod handlers;

pub use handlers::{HealthResponse, ProcessRequest, ProcessResponse};

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{NocturneError, Result};
use crate::executor::JobExecutor;

pub const APP_NAME: &str = "Nocturne";

/// How often the retention sweep runs.
const SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<JobExecutor>,
}

impl IntoResponse for NocturneError {
    fn into_response(self) -> Response {
        let status = if self.is_user_error() {
            match self {
                NocturneError::JobNotFound { .. } => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_REQUEST,
            }
        } else {
            error!("{self}");
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = Json(json!({
            "error": self.to_string(),
            "code": self.error_code(),
        }));
        (status, body).into_response()
    }
}

/// Build the application router.
pub fn create_router(state: AppState, frontend_dir: Option<&Path>) -> Router {
    let mut app = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/process", post(handlers::process))
        .route("/api/download/:job_id", get(handlers::download))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    if let Some(dir) = frontend_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Run the HTTP service until the process is stopped.
pub async fn run(config: Config) -> Result<()> {
    config.check_tools()?;

    let executor = Arc::new(JobExecutor::new(&config)?);

    // Periodic retention sweep so the output root cannot grow unbounded
    let sweep_store = executor.store().clone();
    let max_age = Duration::from_secs(config.retention_hours * 3600);
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            tick.tick().await;
            match sweep_store.sweep(max_age) {
                Ok(0) => {}
                Ok(n) => info!("retention sweep removed {n} expired output(s)"),
                Err(e) => warn!("retention sweep failed: {e}"),
            }
        }
    });

    let app = create_router(AppState { executor }, config.frontend_dir.as_deref());

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
