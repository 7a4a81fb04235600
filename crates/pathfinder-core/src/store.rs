//! The `CombinationStore` trait.
//!
//! Implemented by storage backends (e.g. `pathfinder-store-sqlite`). The
//! regeneration run, the admin API and the CLI depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  catalogue::Subject,
  combination::{AuditInfo, NewCombination, SubjectTriple, ValidCombination},
  stream::Stream,
  summary::StreamSummary,
};

/// Abstraction over a PathFinder combination store backend.
///
/// Subjects and streams are inputs the generator only reads; the `put_*`
/// methods exist for seeding. Valid combinations are only ever written in
/// bulk by [`CombinationStore::replace_combinations`].
pub trait CombinationStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Reference data ────────────────────────────────────────────────────

  /// Insert a subject, or rename the subject with the same id.
  fn put_subject(
    &self,
    subject: Subject,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn list_subjects(&self) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  /// Insert a stream, or overwrite the stream with the same id.
  fn put_stream(
    &self,
    stream: Stream,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_stream(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Stream>, Self::Error>> + Send + '_;

  /// All streams, ordered by id.
  fn list_streams(&self) -> impl Future<Output = Result<Vec<Stream>, Self::Error>> + Send + '_;

  // ── Valid combinations ────────────────────────────────────────────────

  /// Delete every stored combination and insert `rows`, atomically.
  ///
  /// Exact duplicates (same stream and triple) are skipped. Returns the number
  /// of rows inserted. On error the previous contents are left untouched.
  fn replace_combinations(
    &self,
    rows: Vec<NewCombination>,
    audit: AuditInfo,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Stored combinations, optionally for one stream, ordered by stream then
  /// subjects.
  fn list_combinations(
    &self,
    stream_id: Option<i64>,
  ) -> impl Future<Output = Result<Vec<ValidCombination>, Self::Error>> + Send + '_;

  /// Every stored combination equal to `triple`, across all streams.
  fn find_by_triple(
    &self,
    triple: SubjectTriple,
  ) -> impl Future<Output = Result<Vec<ValidCombination>, Self::Error>> + Send + '_;

  /// Record that `course_id` uses a combination as an eligibility rule.
  ///
  /// Attaching the same course twice is a no-op. Returns `false` if no
  /// combination has `combination_id`.
  fn attach_course(
    &self,
    combination_id: Uuid,
    course_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Per-stream counts with up to `samples` rows resolved to subject names.
  fn summarize(
    &self,
    samples: usize,
  ) -> impl Future<Output = Result<Vec<StreamSummary>, Self::Error>> + Send + '_;
}
