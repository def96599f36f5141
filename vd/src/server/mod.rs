//! Planning service
//!
//! `POST /plan` with `{"text": ...}` answers with the validated command JSON,
//! or `{"detail": ...}` with 400/502/500. `GET /health` reports the model.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::planner::{PlanError, Planner};

/// Request body for `POST /plan`
#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// Error body for every non-200 answer
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

struct ApiError {
    status: StatusCode,
    detail: String,
}

impl From<PlanError> for ApiError {
    fn from(e: PlanError) -> Self {
        let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            warn!(%status, error = %e, "plan request failed");
        } else {
            debug!(%status, error = %e, "plan request rejected");
        }
        Self {
            status,
            detail: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorDetail { detail: self.detail })).into_response()
    }
}

/// Build the router with all routes installed
pub fn build_router(planner: Arc<Planner>) -> Router {
    Router::new()
        .route("/plan", post(post_plan))
        .route("/health", get(get_health))
        .with_state(planner)
}

/// Bind and serve until the process is stopped
pub async fn serve(planner: Arc<Planner>, bind: &str) -> Result<()> {
    let addr: SocketAddr = bind.parse().context(format!("Invalid bind address: {}", bind))?;
    let listener = TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind {}", addr))?;
    info!(%addr, model = planner.model(), "Planning service listening");

    axum::serve(listener, build_router(planner))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Planning service failed")?;

    info!("Planning service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

async fn post_plan(
    State(planner): State<Arc<Planner>>,
    body: Result<Json<PlanRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = body.map_err(|rejection| {
        debug!(error = %rejection, "post_plan: bad request body");
        ApiError {
            status: StatusCode::BAD_REQUEST,
            detail: rejection.body_text(),
        }
    })?;

    let text = request.text.unwrap_or_default();
    let command = planner.plan(&text).await?;
    Ok(Json(command.to_json()))
}

async fn get_health(State(planner): State<Arc<Planner>>) -> Json<Value> {
    Json(serde_json::json!({ "status": "ok", "model": planner.model() }))
}
