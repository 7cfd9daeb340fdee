//! Serve command handler.
//!
//! Exposes the conductor over HTTP for the web frontend.

use super::build_conductor;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Args;
use coursebot_core::{config::AppConfig, AppError, AppResult};
use coursebot_knowledge::{Conductor, CourseAnalytics, Source};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Serve the HTTP API
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1", env = "COURSEBOT_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8000, env = "COURSEBOT_PORT")]
    pub port: u16,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let conductor = Arc::new(build_conductor(config).await?);
        let app = router(conductor);

        let bind_addr = format!("{}:{}", self.host, self.port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
        tracing::info!("Listening on http://{}", bind_addr);

        axum::serve(listener, app).await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    pub sources: Vec<Source>,
    pub session_id: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, detail) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

pub fn router(conductor: Arc<Conductor>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/api/query", post(query))
        .route("/api/courses", get(courses))
        .with_state(conductor)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Course materials assistant is running"
    }))
}

async fn query(
    State(conductor): State<Arc<Conductor>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    if request.query.trim().is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".to_string()));
    }

    let session_id = match request.session_id {
        Some(id) => id,
        None => conductor.create_session().await,
    };

    let response = conductor.answer(&request.query, Some(&session_id)).await.map_err(|e| {
        tracing::error!(session = %session_id, "Query failed: {}", e);
        ApiError::from(e)
    })?;

    Ok(Json(QueryResponse {
        answer: response.answer,
        sources: response.sources,
        session_id,
    }))
}

async fn courses(State(conductor): State<Arc<Conductor>>) -> Json<CourseAnalytics> {
    Json(conductor.course_analytics())
}
