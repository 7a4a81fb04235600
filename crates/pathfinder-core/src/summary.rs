//! Post-generation accounting: per-stream counts and sample rows.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Persisted combinations for one stream, with a few rows spelled out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSummary {
  pub stream_id:   i64,
  pub stream_name: String,
  pub count:       usize,
  /// Subject names of the first few rows, in stored order.
  pub samples:     Vec<[String; 3]>,
}

impl fmt::Display for StreamSummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(
      f,
      "{} (id {}): {} combinations",
      self.stream_name, self.stream_id, self.count
    )?;
    for [a, b, c] in &self.samples {
      writeln!(f, "  - {a} + {b} + {c}")?;
    }
    Ok(())
  }
}
