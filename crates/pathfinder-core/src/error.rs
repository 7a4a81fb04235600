//! Error types for `pathfinder-core`.

use thiserror::Error;

use crate::rule::RuleError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("subject {0:?} is not in the catalogue")]
  UnknownSubject(String),

  #[error("subject id {0} is not in the catalogue")]
  UnknownSubjectId(i64),

  #[error("a combination needs three distinct subjects, got {0:?}")]
  InvalidTriple([i64; 3]),

  #[error("stream {stream_id} has an invalid rule: {source}")]
  Rule {
    stream_id: i64,
    #[source]
    source:    RuleError,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
