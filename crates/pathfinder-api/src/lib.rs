//! Admin JSON REST API for PathFinder.
//!
//! Exposes an axum [`Router`] backed by any
//! [`pathfinder_core::store::CombinationStore`]. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/admin", pathfinder_api::api_router(state))
//! ```

pub mod combinations;
pub mod eligibility;
pub mod error;
pub mod streams;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use pathfinder_core::{regenerate::GenerationOptions, store::CombinationStore};

pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store:   Arc<S>,
  pub options: Arc<GenerationOptions>,
}

// Manual impl: cloning the state must not require `S: Clone`.
impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:   Arc::clone(&self.store),
      options: Arc::clone(&self.options),
    }
  }
}

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: CombinationStore + 'static,
{
  Router::new()
    // Reference data
    .route("/subjects", get(streams::list_subjects::<S>))
    .route("/streams", get(streams::list::<S>))
    .route("/streams/{id}/combinations", get(streams::combinations::<S>))
    // Valid combinations
    .route("/combinations/regenerate", post(combinations::regenerate_all::<S>))
    .route("/combinations/summary", get(combinations::summary::<S>))
    .route("/combinations/{id}/courses", post(combinations::attach_course::<S>))
    // Eligibility
    .route("/eligibility", post(eligibility::check::<S>))
    .with_state(state)
}
