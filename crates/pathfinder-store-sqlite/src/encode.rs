//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs hyphenated lowercase strings, and
//! structured fields (stream rules, course id lists) compact JSON.

use chrono::{DateTime, Utc};
use pathfinder_core::{
  combination::{AuditInfo, SubjectTriple, ValidCombination},
  stream::Stream,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// Column values of a `streams` row.
pub struct RawStream {
  pub stream_id: i64,
  pub name:      String,
  pub active:    bool,
  pub rule_json: String,
}

impl RawStream {
  pub const COLUMNS: &'static str = "stream_id, name, active, rule_json";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      stream_id: row.get(0)?,
      name:      row.get(1)?,
      active:    row.get(2)?,
      rule_json: row.get(3)?,
    })
  }

  pub fn into_stream(self) -> Result<Stream> {
    Ok(Stream {
      id:     self.stream_id,
      name:   self.name,
      active: self.active,
      rule:   serde_json::from_str(&self.rule_json)?,
    })
  }
}

/// Column values of a `valid_combinations` row.
pub struct RawCombination {
  pub combination_id: String,
  pub stream_id:      i64,
  pub subjects:       [i64; 3],
  pub course_ids:     String,
  pub created_by:     String,
  pub created_at:     String,
  pub updated_by:     String,
  pub updated_at:     String,
}

impl RawCombination {
  pub const COLUMNS: &'static str = "combination_id, stream_id, subject1, subject2, subject3, \
                                     course_ids, created_by, created_at, updated_by, updated_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      combination_id: row.get(0)?,
      stream_id:      row.get(1)?,
      subjects:       [row.get(2)?, row.get(3)?, row.get(4)?],
      course_ids:     row.get(5)?,
      created_by:     row.get(6)?,
      created_at:     row.get(7)?,
      updated_by:     row.get(8)?,
      updated_at:     row.get(9)?,
    })
  }

  pub fn into_combination(self) -> Result<ValidCombination> {
    Ok(ValidCombination {
      id:         decode_uuid(&self.combination_id)?,
      stream_id:  self.stream_id,
      subjects:   SubjectTriple::new(self.subjects)?,
      course_ids: serde_json::from_str(&self.course_ids)?,
      audit:      AuditInfo {
        created_by: self.created_by,
        created_at: decode_dt(&self.created_at)?,
        updated_by: self.updated_by,
        updated_at: decode_dt(&self.updated_at)?,
      },
    })
  }
}
