//! Handlers for `/combinations` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/combinations/regenerate` | Full recompute; returns the run report |
//! | `GET`  | `/combinations/summary` | Optional `?samples=N` (default 3) |
//! | `POST` | `/combinations/:id/courses` | Body: `{"course_id": 12}` |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use pathfinder_core::{
  regenerate::{GenerationReport, regenerate},
  store::CombinationStore,
  summary::StreamSummary,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

// ─── Regenerate ──────────────────────────────────────────────────────────────

/// `POST /combinations/regenerate`
pub async fn regenerate_all<S: CombinationStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<GenerationReport>, ApiError> {
  let report = regenerate(state.store.as_ref(), &state.options).await?;
  Ok(Json(report))
}

// ─── Summary ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SummaryParams {
  pub samples: Option<usize>,
}

/// `GET /combinations/summary[?samples=<n>]`
pub async fn summary<S: CombinationStore>(
  State(state): State<ApiState<S>>,
  Query(params): Query<SummaryParams>,
) -> Result<Json<Vec<StreamSummary>>, ApiError> {
  let summary = state
    .store
    .summarize(params.samples.unwrap_or(3))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(summary))
}

// ─── Courses ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AttachCourseBody {
  pub course_id: i64,
}

/// `POST /combinations/:id/courses`, body: `{"course_id": 12}`
pub async fn attach_course<S: CombinationStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<AttachCourseBody>,
) -> Result<StatusCode, ApiError> {
  let found = state
    .store
    .attach_course(id, body.course_id)
    .await
    .map_err(ApiError::store)?;

  if found {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("combination {id} not found")))
  }
}
