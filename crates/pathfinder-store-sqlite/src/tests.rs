//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::BTreeSet;

use pathfinder_core::{
  catalogue::{Subject, SubjectCatalogue, SubjectKey},
  combination::{AuditInfo, NewCombination, SubjectTriple},
  regenerate::{GenerationOptions, StreamStatus, regenerate},
  store::CombinationStore,
  stream::{Stream, default_streams},
};
use serde_json::json;
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// A store seeded with the stock catalogue and streams.
async fn seeded() -> SqliteStore {
  let s = store().await;
  let subjects = SubjectKey::default_catalogue();
  let catalogue = SubjectCatalogue::new(subjects.clone());
  for subject in subjects {
    s.put_subject(subject).await.unwrap();
  }
  for stream in default_streams(&catalogue).unwrap() {
    s.put_stream(stream).await.unwrap();
  }
  s
}

fn row(stream_id: i64, ids: [i64; 3]) -> NewCombination {
  NewCombination { stream_id, subjects: SubjectTriple::new(ids).unwrap() }
}

async fn tuples(s: &SqliteStore) -> BTreeSet<(i64, [i64; 3])> {
  s.list_combinations(None)
    .await
    .unwrap()
    .into_iter()
    .map(|c| (c.stream_id, c.subjects.ids()))
    .collect()
}

// ─── Reference data ──────────────────────────────────────────────────────────

#[tokio::test]
async fn put_subject_upserts_by_id() {
  let s = store().await;
  s.put_subject(Subject { id: 1, name: "Physic".into() }).await.unwrap();
  s.put_subject(Subject { id: 1, name: "Physics".into() }).await.unwrap();
  s.put_subject(Subject { id: 2, name: "Chemistry".into() }).await.unwrap();

  let subjects = s.list_subjects().await.unwrap();
  assert_eq!(subjects, vec![
    Subject { id: 1, name: "Physics".into() },
    Subject { id: 2, name: "Chemistry".into() },
  ]);
}

#[tokio::test]
async fn stream_rule_roundtrips_as_json() {
  let s = store().await;
  let stream = Stream {
    id:     9,
    name:   "Experimental".into(),
    active: false,
    rule:   json!({ "type": "physical_science", "allowedSubjects": [1, 2, 3] }),
  };
  s.put_stream(stream.clone()).await.unwrap();

  assert_eq!(s.get_stream(9).await.unwrap(), Some(stream));
  assert!(s.get_stream(10).await.unwrap().is_none());
}

// ─── replace_combinations ────────────────────────────────────────────────────

#[tokio::test]
async fn replace_skips_exact_duplicates() {
  let s = seeded().await;
  let inserted = s
    .replace_combinations(
      vec![row(1, [1, 2, 3]), row(1, [3, 2, 1]), row(2, [1, 2, 3])],
      AuditInfo::now("test"),
    )
    .await
    .unwrap();

  assert_eq!(inserted, 2);
  assert_eq!(
    tuples(&s).await,
    BTreeSet::from([(1, [1, 2, 3]), (2, [1, 2, 3])])
  );
}

#[tokio::test]
async fn replace_clears_previous_rows() {
  let s = seeded().await;
  s.replace_combinations(vec![row(1, [1, 2, 3]), row(2, [1, 5, 6])], AuditInfo::now("a"))
    .await
    .unwrap();
  s.replace_combinations(vec![row(3, [8, 9, 10])], AuditInfo::now("b"))
    .await
    .unwrap();

  let rows = s.list_combinations(None).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].stream_id, 3);
  assert_eq!(rows[0].audit.created_by, "b");
  assert!(rows[0].course_ids.is_empty());
}

#[tokio::test]
async fn failed_replace_leaves_table_untouched() {
  let s = seeded().await;
  s.replace_combinations(vec![row(1, [1, 2, 3])], AuditInfo::now("first"))
    .await
    .unwrap();
  let before = tuples(&s).await;

  // Stream 999 does not exist, so the foreign key rejects the second row.
  let result = s
    .replace_combinations(vec![row(2, [1, 5, 6]), row(999, [1, 2, 3])], AuditInfo::now("second"))
    .await;

  assert!(result.is_err());
  assert_eq!(tuples(&s).await, before);
}

#[tokio::test]
async fn list_combinations_filters_by_stream() {
  let s = seeded().await;
  s.replace_combinations(
    vec![row(2, [1, 5, 6]), row(1, [2, 3, 4]), row(1, [1, 2, 3])],
    AuditInfo::now("test"),
  )
  .await
  .unwrap();

  let physical = s.list_combinations(Some(1)).await.unwrap();
  let ids: Vec<_> = physical.iter().map(|c| c.subjects.ids()).collect();
  assert_eq!(ids, vec![[1, 2, 3], [2, 3, 4]]);
  assert!(s.list_combinations(Some(6)).await.unwrap().is_empty());
}

// ─── Courses & eligibility ───────────────────────────────────────────────────

#[tokio::test]
async fn attach_course_appends_once() {
  let s = seeded().await;
  s.replace_combinations(vec![row(1, [1, 2, 3])], AuditInfo::now("test"))
    .await
    .unwrap();
  let id = s.list_combinations(None).await.unwrap()[0].id;

  assert!(s.attach_course(id, 40).await.unwrap());
  assert!(s.attach_course(id, 41).await.unwrap());
  assert!(s.attach_course(id, 40).await.unwrap());
  assert!(!s.attach_course(Uuid::new_v4(), 40).await.unwrap());

  let rows = s.list_combinations(None).await.unwrap();
  assert_eq!(rows[0].course_ids, vec![40, 41]);
}

#[tokio::test]
async fn audit_is_stamped_by_run_and_kept() {
  let s = seeded().await;
  let audit = AuditInfo::now("run");
  s.replace_combinations(vec![row(1, [1, 2, 3])], audit.clone())
    .await
    .unwrap();
  let before = s.list_combinations(None).await.unwrap().remove(0);
  assert_eq!(before.audit, audit);

  assert!(s.attach_course(before.id, 40).await.unwrap());
  let after = s.list_combinations(None).await.unwrap().remove(0);
  assert_eq!(after.audit, audit);
}

#[tokio::test]
async fn find_by_triple_spans_streams() {
  let s = seeded().await;
  s.replace_combinations(
    vec![row(1, [1, 2, 3]), row(4, [1, 2, 3]), row(2, [1, 2, 5])],
    AuditInfo::now("test"),
  )
  .await
  .unwrap();

  let found = s
    .find_by_triple(SubjectTriple::new([3, 1, 2]).unwrap())
    .await
    .unwrap();
  let streams: Vec<i64> = found.iter().map(|c| c.stream_id).collect();
  assert_eq!(streams, vec![1, 4]);
}

// ─── Full regeneration ───────────────────────────────────────────────────────

#[tokio::test]
async fn regenerate_stock_streams() {
  let s = seeded().await;
  let report = regenerate(&s, &GenerationOptions::default()).await.unwrap();

  let counts: Vec<(i64, StreamStatus)> = report
    .streams
    .iter()
    .map(|o| (o.stream_id, o.status.clone()))
    .collect();
  assert_eq!(counts[..6], [
    (1, StreamStatus::Generated { count: 4 }),
    (2, StreamStatus::Generated { count: 6 }),
    (3, StreamStatus::Generated { count: 31 }),
    (4, StreamStatus::Generated { count: 11 }),
    (5, StreamStatus::Generated { count: 11 }),
    (6, StreamStatus::Generated { count: 163 }),
  ]);
  assert!(matches!(counts[6], (7, StreamStatus::Skipped { .. })));
  assert_eq!(report.inserted, 4 + 6 + 31 + 11 + 11 + 163);
  assert_eq!(report.rejected_total(), 0);

  let rows = s.list_combinations(None).await.unwrap();
  assert_eq!(rows.len(), report.inserted);
  for c in &rows {
    let [a, b, c3] = c.subjects.ids();
    assert!(a < b && b < c3);
    assert_ne!(c.stream_id, 7);
  }
}

#[tokio::test]
async fn regenerate_is_idempotent() {
  let s = seeded().await;
  regenerate(&s, &GenerationOptions::default()).await.unwrap();
  let first = tuples(&s).await;
  regenerate(&s, &GenerationOptions::default()).await.unwrap();
  assert_eq!(tuples(&s).await, first);
}

#[tokio::test]
async fn common_stream_never_generates() {
  let s = seeded().await;
  // Even with a perfectly valid rule, Common is excluded by name.
  s.put_stream(Stream {
    id:     7,
    name:   "Common".into(),
    active: true,
    rule:   json!({ "type": "physical_science", "allowed_subjects": [1, 2, 3, 4] }),
  })
  .await
  .unwrap();

  regenerate(&s, &GenerationOptions::default()).await.unwrap();
  assert!(s.list_combinations(Some(7)).await.unwrap().is_empty());
}

#[tokio::test]
async fn common_stream_id_excluded_after_rename() {
  let s = seeded().await;
  s.put_stream(Stream {
    id:     7,
    name:   "General".into(),
    active: true,
    rule:   json!({ "type": "physical_science", "allowed_subjects": [1, 2, 3, 4] }),
  })
  .await
  .unwrap();

  let report = regenerate(&s, &GenerationOptions::default()).await.unwrap();
  let general = report.streams.iter().find(|o| o.stream_id == 7).unwrap();
  assert!(matches!(general.status, StreamStatus::Skipped { ref reason } if reason.contains("id")));
  assert!(s.list_combinations(Some(7)).await.unwrap().is_empty());
}

#[tokio::test]
async fn bad_rule_skips_only_that_stream() {
  let s = seeded().await;
  s.put_stream(Stream {
    id:     2,
    name:   "Biological Science".into(),
    active: true,
    rule:   json!({ "required": [5] }),
  })
  .await
  .unwrap();

  let report = regenerate(&s, &GenerationOptions::default()).await.unwrap();
  let bio = report.streams.iter().find(|o| o.stream_id == 2).unwrap();
  assert!(matches!(bio.status, StreamStatus::Skipped { ref reason } if reason.contains("type")));
  assert!(s.list_combinations(Some(2)).await.unwrap().is_empty());
  assert_eq!(s.list_combinations(Some(1)).await.unwrap().len(), 4);
}

#[tokio::test]
async fn stale_rows_do_not_survive() {
  let s = seeded().await;
  regenerate(&s, &GenerationOptions::default()).await.unwrap();
  assert_eq!(s.list_combinations(Some(5)).await.unwrap().len(), 11);

  // Stream 5 drops out of the next run.
  let mut biosystems = s.get_stream(5).await.unwrap().unwrap();
  biosystems.active = false;
  s.put_stream(biosystems).await.unwrap();

  regenerate(&s, &GenerationOptions::default()).await.unwrap();
  assert!(s.list_combinations(Some(5)).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_subject_ids_are_dropped() {
  let s = seeded().await;
  s.put_stream(Stream {
    id:     1,
    name:   "Physical Science".into(),
    active: true,
    rule:   json!({ "type": "physical_science", "allowed_subjects": [1, 2, 3, 500] }),
  })
  .await
  .unwrap();

  let report = regenerate(&s, &GenerationOptions::default()).await.unwrap();
  let physical = &report.streams[0];
  assert_eq!(physical.status, StreamStatus::Generated { count: 1 });
  assert_eq!(physical.rejected.len(), 3);
  let rows = s.list_combinations(Some(1)).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].subjects.ids(), [1, 2, 3]);
}

#[tokio::test]
async fn summarize_counts_and_names_samples() {
  let s = seeded().await;
  regenerate(&s, &GenerationOptions::default()).await.unwrap();

  let summary = s.summarize(2).await.unwrap();
  assert_eq!(summary.len(), 6);
  assert!(summary.iter().all(|row| row.stream_id != 7));

  let physical = &summary[0];
  assert_eq!(physical.stream_name, "Physical Science");
  assert_eq!(physical.count, 4);
  assert_eq!(physical.samples.len(), 2);
  // Physics = 1, Chemistry = 2, Combined Mathematics = 3, Higher Mathematics = 4.
  assert_eq!(physical.samples[0], [
    "Physics".to_string(),
    "Chemistry".to_string(),
    "Combined Mathematics".to_string(),
  ]);

  let arts = summary.iter().find(|row| row.stream_id == 6).unwrap();
  assert_eq!(arts.count, 163);
}

#[tokio::test]
async fn summarize_huge_sample_request_returns_everything() {
  let s = seeded().await;
  regenerate(&s, &GenerationOptions::default()).await.unwrap();

  let summary = s.summarize(usize::MAX).await.unwrap();
  assert_eq!(summary[0].samples.len(), 4);
  assert!(summary.iter().all(|row| row.samples.len() == row.count));
}
