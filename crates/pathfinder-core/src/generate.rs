//! Combination generators and the rule interpreter.
//!
//! Each generator is a pure function from a rule's subject pools to candidate
//! id arrays, emitted in a deterministic order. [`generate_for_stream`] then
//! applies the shared post-processing to every candidate: canonical sort,
//! per-stream de-duplication and a catalogue check.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
  catalogue::SubjectCatalogue,
  combination::{NewCombination, SubjectTriple},
  rule::{ArtsBaskets, ArtsLimits, StreamRule},
};

/// A candidate that failed post-processing and was not emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedCandidate {
  pub ids:    [i64; 3],
  pub reason: String,
}

/// Output of one stream's generation.
#[derive(Debug, Clone, Default)]
pub struct StreamGeneration {
  pub combinations: Vec<NewCombination>,
  pub rejected:     Vec<RejectedCandidate>,
}

// ─── Interpreter ─────────────────────────────────────────────────────────────

/// Generate, canonicalise and validate every combination `rule` allows.
pub fn generate_for_stream(
  stream_id: i64,
  rule:      &StreamRule,
  catalogue: &SubjectCatalogue,
) -> StreamGeneration {
  let mut out = StreamGeneration::default();
  let mut seen = BTreeSet::new();

  for ids in candidates(rule) {
    let checked = SubjectTriple::new(ids)
      .and_then(|triple| catalogue.validate(&triple).map(|()| triple));

    match checked {
      Ok(triple) => {
        if seen.insert(triple) {
          out
            .combinations
            .push(NewCombination { stream_id, subjects: triple });
        }
      }
      Err(e) => {
        tracing::warn!(stream_id, ?ids, reason = %e, "dropping invalid combination");
        out.rejected.push(RejectedCandidate { ids, reason: e.to_string() });
      }
    }
  }

  out
}

/// Dispatch `rule` to its generator. Candidates are raw and unsorted.
pub fn candidates(rule: &StreamRule) -> Vec<[i64; 3]> {
  match rule {
    StreamRule::PhysicalScience { allowed_subjects } => any_three(allowed_subjects),
    StreamRule::BiologicalScience { required, optional }
    | StreamRule::EngineeringTechnology { required, optional }
    | StreamRule::BiosystemsTechnology { required, optional } => {
      required_plus(required, optional)
    }
    StreamRule::Commerce { core, supporting } => commerce(core, supporting),
    StreamRule::Arts { baskets, limits } => arts(baskets, limits),
  }
}

// ─── Generators ──────────────────────────────────────────────────────────────

/// Every 3-subset of `pool`.
pub fn any_three(pool: &[i64]) -> Vec<[i64; 3]> {
  choose(pool, 3).map(to_triple).collect()
}

/// All required subjects, with the remaining slots filled from `optional`.
pub fn required_plus(required: &[i64], optional: &[i64]) -> Vec<[i64; 3]> {
  let Some(open) = 3usize.checked_sub(required.len()) else {
    return Vec::new();
  };
  choose(optional, open)
    .map(|fill| {
      let mut ids = required.to_vec();
      ids.extend(fill);
      to_triple(ids)
    })
    .collect()
}

/// The core-only combination, then every core pair with every supporting
/// subject.
pub fn commerce(core: &[i64], supporting: &[i64]) -> Vec<[i64; 3]> {
  let mut out: Vec<[i64; 3]> = choose(core, 3).map(to_triple).collect();
  for pair in choose(core, 2) {
    for extra in supporting {
      out.push([pair[0], pair[1], *extra]);
    }
  }
  out
}

/// The three Arts rules, in order:
///
/// 1. any three of the leading social sciences, capped;
/// 2. any two leading social sciences with one religion;
/// 3. the three languages together.
pub fn arts(baskets: &ArtsBaskets, limits: &ArtsLimits) -> Vec<[i64; 3]> {
  let social = &baskets.social_sciences;

  let mut out: Vec<[i64; 3]> = choose(leading(social, limits.social_sciences_slice), 3)
    .take(limits.max_social_triples)
    .map(to_triple)
    .collect();

  for pair in choose(leading(social, limits.social_religion_slice), 2) {
    for religion in &baskets.religions {
      out.push([pair[0], pair[1], *religion]);
    }
  }

  if let [a, b, c] = baskets.languages[..] {
    out.push([a, b, c]);
  }

  out
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn leading(pool: &[i64], n: usize) -> &[i64] { &pool[..pool.len().min(n)] }

fn to_triple(ids: Vec<i64>) -> [i64; 3] { [ids[0], ids[1], ids[2]] }

/// All `k`-subsets of `pool`, in lexicographic order of position.
///
/// Subsets are produced on demand, so `.take(n)` costs only `n` steps.
pub fn choose(pool: &[i64], k: usize) -> Choose<'_> {
  Choose { pool, idx: (0..k).collect(), done: k > pool.len() }
}

/// Iterator returned by [`choose`].
#[derive(Debug, Clone)]
pub struct Choose<'a> {
  pool: &'a [i64],
  idx:  Vec<usize>,
  done: bool,
}

impl Iterator for Choose<'_> {
  type Item = Vec<i64>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.done {
      return None;
    }
    let item = self.idx.iter().map(|&i| self.pool[i]).collect();

    // Advance the rightmost index that still has room.
    let (n, k) = (self.pool.len(), self.idx.len());
    match (0..k).rev().find(|&i| self.idx[i] < n - k + i) {
      Some(pos) => {
        self.idx[pos] += 1;
        for i in pos + 1..k {
          self.idx[i] = self.idx[i - 1] + 1;
        }
      }
      None => self.done = true,
    }
    Some(item)
  }
}
