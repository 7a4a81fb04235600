//! Handlers for reference data.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/subjects` | Ordered by id |
//! | `GET`  | `/streams` | Ordered by id |
//! | `GET`  | `/streams/:id/combinations` | 404 if the stream does not exist |

use axum::{
  Json,
  extract::{Path, State},
};
use pathfinder_core::{
  catalogue::Subject, combination::ValidCombination, store::CombinationStore, stream::Stream,
};

use crate::{ApiState, error::ApiError};

/// `GET /subjects`
pub async fn list_subjects<S: CombinationStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Subject>>, ApiError> {
  let subjects = state.store.list_subjects().await.map_err(ApiError::store)?;
  Ok(Json(subjects))
}

/// `GET /streams`
pub async fn list<S: CombinationStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Stream>>, ApiError> {
  let streams = state.store.list_streams().await.map_err(ApiError::store)?;
  Ok(Json(streams))
}

/// `GET /streams/:id/combinations`
pub async fn combinations<S: CombinationStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Vec<ValidCombination>>, ApiError> {
  state
    .store
    .get_stream(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("stream {id} not found")))?;

  let rows = state
    .store
    .list_combinations(Some(id))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(rows))
}
