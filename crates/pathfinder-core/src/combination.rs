//! Valid combinations, the derived artifact of a generation run.
//!
//! A combination is three distinct subject ids held in ascending order, so
//! `{A,B,C}` and `{B,A,C}` are the same value and collapse to one stored row.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Triple ──────────────────────────────────────────────────────────────────

/// Three distinct subject ids, always sorted ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTriple", into = "RawTriple")]
pub struct SubjectTriple([i64; 3]);

impl SubjectTriple {
  /// Canonicalise `ids`; fails if any id repeats.
  pub fn new(mut ids: [i64; 3]) -> Result<Self> {
    ids.sort_unstable();
    if ids[0] == ids[1] || ids[1] == ids[2] {
      return Err(Error::InvalidTriple(ids));
    }
    Ok(Self(ids))
  }

  pub fn ids(&self) -> [i64; 3] { self.0 }

  pub fn contains(&self, id: i64) -> bool { self.0.contains(&id) }
}

impl TryFrom<Vec<i64>> for SubjectTriple {
  type Error = Error;

  fn try_from(ids: Vec<i64>) -> Result<Self> {
    let ids: [i64; 3] = ids.try_into().map_err(|ids: Vec<i64>| {
      let mut padded = [0; 3];
      for (slot, id) in padded.iter_mut().zip(ids) {
        *slot = id;
      }
      Error::InvalidTriple(padded)
    })?;
    Self::new(ids)
  }
}

impl fmt::Display for SubjectTriple {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let [a, b, c] = self.0;
    write!(f, "({a}, {b}, {c})")
  }
}

/// Wire shape of a triple: `{"subject1": _, "subject2": _, "subject3": _}`.
#[derive(Serialize, Deserialize)]
struct RawTriple {
  subject1: i64,
  subject2: i64,
  subject3: i64,
}

impl TryFrom<RawTriple> for SubjectTriple {
  type Error = Error;

  fn try_from(raw: RawTriple) -> Result<Self> {
    Self::new([raw.subject1, raw.subject2, raw.subject3])
  }
}

impl From<SubjectTriple> for RawTriple {
  fn from(triple: SubjectTriple) -> Self {
    let [subject1, subject2, subject3] = triple.0;
    Self { subject1, subject2, subject3 }
  }
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// Created/updated attribution, stamped once per generation run.
///
/// Both halves carry the run's stamp and are never mutated afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditInfo {
  pub created_by: String,
  pub created_at: DateTime<Utc>,
  pub updated_by: String,
  pub updated_at: DateTime<Utc>,
}

impl AuditInfo {
  pub fn now(created_by: impl Into<String>) -> Self {
    let by = created_by.into();
    let at = Utc::now();
    Self { created_by: by.clone(), created_at: at, updated_by: by, updated_at: at }
  }
}

/// A generated combination not yet persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NewCombination {
  pub stream_id: i64,
  #[serde(flatten)]
  pub subjects:  SubjectTriple,
}

/// A persisted combination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidCombination {
  pub id:         Uuid,
  pub stream_id:  i64,
  #[serde(flatten)]
  pub subjects:   SubjectTriple,
  /// Courses that list this combination as an eligibility rule.
  pub course_ids: Vec<i64>,
  pub audit:      AuditInfo,
}
