//! `POST /eligibility`: which streams accept a student's A/L subjects.
//!
//! Body: `{"subjects": [3, 1, 2]}`. The ids may come in any order; they are
//! canonicalised before lookup.

use axum::{Json, extract::State};
use pathfinder_core::{combination::SubjectTriple, store::CombinationStore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct EligibilityBody {
  pub subjects: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EligibleStream {
  pub stream_id:      i64,
  pub stream_name:    String,
  pub combination_id: Uuid,
  pub course_ids:     Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EligibilityResponse {
  pub subjects: SubjectTriple,
  pub streams:  Vec<EligibleStream>,
}

/// `POST /eligibility`
pub async fn check<S: CombinationStore>(
  State(state): State<ApiState<S>>,
  Json(body): Json<EligibilityBody>,
) -> Result<Json<EligibilityResponse>, ApiError> {
  let subjects = SubjectTriple::try_from(body.subjects)
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let matches = state
    .store
    .find_by_triple(subjects)
    .await
    .map_err(ApiError::store)?;
  let stream_list = state.store.list_streams().await.map_err(ApiError::store)?;

  let streams = matches
    .into_iter()
    .map(|c| EligibleStream {
      stream_id:      c.stream_id,
      stream_name:    stream_list
        .iter()
        .find(|s| s.id == c.stream_id)
        .map(|s| s.name.clone())
        .unwrap_or_default(),
      combination_id: c.id,
      course_ids:     c.course_ids,
    })
    .collect();

  Ok(Json(EligibilityResponse { subjects, streams }))
}
