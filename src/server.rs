//! HTTP surface: submit/poll verification tasks, metrics snapshot, and the
//! review-outcome hook used by the human-review consumer.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::metrics::{MetricsRegistry, MetricsSnapshot};
use crate::tasks::TaskManager;
use crate::types::{MediaItem, PayloadContent, PipelinePayload, PipelineResult, TaskStatus};

#[derive(Clone)]
pub struct AppState {
    pub tasks: TaskManager,
    pub metrics: Arc<MetricsRegistry>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub platform: String,
    pub text: String,
    #[serde(default)]
    pub media: Vec<MediaItem>,
}

#[derive(Debug, Serialize)]
pub struct VerifyTaskCreated {
    pub task_id: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyStatus {
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<PipelineResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewOutcomeRequest {
    pub outcome: String,
}

pub async fn create_verification(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<VerifyTaskCreated>, StatusCode> {
    if req.text.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let payload = PipelinePayload {
        platform: req.platform,
        content: PayloadContent { raw_text: req.text, media: req.media },
        language_analysis: None,
    };
    let task_id = state.tasks.submit(payload).await;
    Ok(Json(VerifyTaskCreated { task_id }))
}

pub async fn get_verification(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<VerifyStatus>, StatusCode> {
    let record = state.tasks.poll(&task_id).await.ok_or(StatusCode::NOT_FOUND)?;
    let status = match record.status {
        TaskStatus::Failure => VerifyStatus {
            status: TaskStatus::Failure,
            result: None,
            error: record.error.or_else(|| Some("unknown failure".to_string())),
        },
        TaskStatus::Success => VerifyStatus {
            status: TaskStatus::Success,
            result: record.result,
            error: None,
        },
        pending => VerifyStatus { status: pending, result: None, error: None },
    };
    Ok(Json(status))
}

pub async fn metrics_snapshot(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

/// Human-review override outcome, recorded into the metrics sink only;
/// verdict persistence lives outside this service.
pub async fn record_review_outcome(
    State(state): State<AppState>,
    Path(claim_id): Path<String>,
    Json(req): Json<ReviewOutcomeRequest>,
) -> Result<StatusCode, StatusCode> {
    if req.outcome.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    info!(%claim_id, outcome = %req.outcome, "review outcome recorded");
    state.metrics.record_review_outcome(&req.outcome);
    Ok(StatusCode::NO_CONTENT)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/verify", post(create_verification))
        .route("/verify/{task_id}", get(get_verification))
        .route("/metrics", get(metrics_snapshot))
        .route("/review/{claim_id}/outcome", post(record_review_outcome))
        .with_state(state)
}

pub async fn run_server(state: AppState, addr: &str) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "verification server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
