//! A full regeneration run: rules in, replaced combination table out.
//!
//! Streams are processed one at a time, in id order. A stream whose rule is
//! missing or malformed is skipped with a warning and the run carries on; a
//! store failure aborts the whole run and leaves the table as it was.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  catalogue::SubjectCatalogue,
  combination::AuditInfo,
  generate::{RejectedCandidate, generate_for_stream},
  store::CombinationStore,
  stream::{COMMON_STREAM, COMMON_STREAM_ID},
};

/// Knobs for [`regenerate`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOptions {
  /// Stream names that never produce combinations (case-insensitive).
  pub excluded_streams:    Vec<String>,
  /// Stream ids that never produce combinations, whatever they are named.
  pub excluded_stream_ids: Vec<i64>,
  /// Recorded as `created_by` on every row of the run.
  pub created_by:          String,
}

impl Default for GenerationOptions {
  fn default() -> Self {
    Self {
      excluded_streams:    vec![COMMON_STREAM.to_owned()],
      excluded_stream_ids: vec![COMMON_STREAM_ID],
      created_by:          "pathfinder".to_owned(),
    }
  }
}

// ─── Report ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StreamStatus {
  Generated { count: usize },
  Skipped { reason: String },
}

/// What happened to one stream during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamOutcome {
  pub stream_id:   i64,
  pub stream_name: String,
  #[serde(flatten)]
  pub status:      StreamStatus,
  pub rejected:    Vec<RejectedCandidate>,
}

/// The typed result of a successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
  pub streams:  Vec<StreamOutcome>,
  /// Rows written to the store.
  pub inserted: usize,
  pub audit:    AuditInfo,
}

impl GenerationReport {
  pub fn skipped(&self) -> impl Iterator<Item = &StreamOutcome> {
    self
      .streams
      .iter()
      .filter(|s| matches!(s.status, StreamStatus::Skipped { .. }))
  }

  pub fn rejected_total(&self) -> usize {
    self.streams.iter().map(|s| s.rejected.len()).sum()
  }
}

// ─── Run ─────────────────────────────────────────────────────────────────────

/// Regenerate every stream's valid combinations and replace the stored set.
pub async fn regenerate<S: CombinationStore>(
  store:   &S,
  options: &GenerationOptions,
) -> Result<GenerationReport> {
  let catalogue = SubjectCatalogue::new(store.list_subjects().await.map_err(store_err)?);
  let streams = store.list_streams().await.map_err(store_err)?;
  let audit = AuditInfo::now(&options.created_by);

  tracing::info!(
    subjects = catalogue.len(),
    streams = streams.len(),
    "generating valid combinations"
  );

  let mut rows = Vec::new();
  let mut outcomes = Vec::with_capacity(streams.len());

  for stream in streams {
    let skip = if options.excluded_stream_ids.contains(&stream.id) {
      Some("excluded by id".to_owned())
    } else if stream.is_named(&options.excluded_streams) {
      Some("excluded by name".to_owned())
    } else if !stream.active {
      Some("stream is inactive".to_owned())
    } else {
      None
    };

    let rule = match skip {
      Some(reason) => Err(reason),
      None => stream
        .parse_rule()
        .map_err(|source| Error::Rule { stream_id: stream.id, source }.to_string()),
    };

    let outcome = match rule {
      Err(reason) => {
        tracing::warn!(stream_id = stream.id, stream = %stream.name, %reason, "skipping stream");
        StreamOutcome {
          stream_id:   stream.id,
          stream_name: stream.name,
          status:      StreamStatus::Skipped { reason },
          rejected:    Vec::new(),
        }
      }
      Ok(rule) => {
        let generated = generate_for_stream(stream.id, &rule, &catalogue);
        let count = generated.combinations.len();
        tracing::info!(
          stream_id = stream.id,
          stream = %stream.name,
          kind = %rule.kind(),
          count,
          rejected = generated.rejected.len(),
          "generated combinations"
        );
        rows.extend(generated.combinations);
        StreamOutcome {
          stream_id:   stream.id,
          stream_name: stream.name,
          status:      StreamStatus::Generated { count },
          rejected:    generated.rejected,
        }
      }
    };
    outcomes.push(outcome);
  }

  let inserted = store
    .replace_combinations(rows, audit.clone())
    .await
    .map_err(store_err)?;
  tracing::info!(inserted, "replaced valid combinations");

  Ok(GenerationReport { streams: outcomes, inserted, audit })
}

fn store_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> Error {
  Error::Store(Box::new(e))
}
