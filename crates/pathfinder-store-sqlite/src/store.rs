//! [`SqliteStore`], the SQLite implementation of [`CombinationStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use pathfinder_core::{
  catalogue::Subject,
  combination::{AuditInfo, NewCombination, SubjectTriple, ValidCombination},
  store::CombinationStore,
  stream::Stream,
  summary::StreamSummary,
};

use crate::{
  Result,
  encode::{RawCombination, RawStream, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A PathFinder store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn query_combinations(
    &self,
    filter: &'static str,
    params: Vec<i64>,
  ) -> Result<Vec<ValidCombination>> {
    let raws: Vec<RawCombination> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM valid_combinations
           {filter}
           ORDER BY stream_id, subject1, subject2, subject3",
          RawCombination::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawCombination::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCombination::into_combination).collect()
  }
}

// ─── CombinationStore impl ───────────────────────────────────────────────────

impl CombinationStore for SqliteStore {
  type Error = crate::Error;

  // ── Reference data ────────────────────────────────────────────────────────

  async fn put_subject(&self, subject: Subject) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subjects (subject_id, name) VALUES (?1, ?2)
           ON CONFLICT (subject_id) DO UPDATE SET name = excluded.name",
          rusqlite::params![subject.id, subject.name],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list_subjects(&self) -> Result<Vec<Subject>> {
    let subjects = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT subject_id, name FROM subjects ORDER BY subject_id")?;
        let rows = stmt
          .query_map([], |row| Ok(Subject { id: row.get(0)?, name: row.get(1)? }))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(subjects)
  }

  async fn put_stream(&self, stream: Stream) -> Result<()> {
    let rule_json = serde_json::to_string(&stream.rule)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO streams (stream_id, name, active, rule_json) VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (stream_id) DO UPDATE SET
             name = excluded.name,
             active = excluded.active,
             rule_json = excluded.rule_json",
          rusqlite::params![stream.id, stream.name, stream.active, rule_json],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_stream(&self, id: i64) -> Result<Option<Stream>> {
    let raw: Option<RawStream> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM streams WHERE stream_id = ?1", RawStream::COLUMNS),
              rusqlite::params![id],
              RawStream::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawStream::into_stream).transpose()
  }

  async fn list_streams(&self) -> Result<Vec<Stream>> {
    let raws: Vec<RawStream> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM streams ORDER BY stream_id",
          RawStream::COLUMNS
        ))?;
        let rows = stmt
          .query_map([], RawStream::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawStream::into_stream).collect()
  }

  // ── Valid combinations ────────────────────────────────────────────────────

  async fn replace_combinations(
    &self,
    rows:  Vec<NewCombination>,
    audit: AuditInfo,
  ) -> Result<usize> {
    let created_at = encode_dt(audit.created_at);
    let created_by = audit.created_by;
    let updated_at = encode_dt(audit.updated_at);
    let updated_by = audit.updated_by;
    let rows: Vec<(String, i64, [i64; 3])> = rows
      .into_iter()
      .map(|row| (encode_uuid(Uuid::new_v4()), row.stream_id, row.subjects.ids()))
      .collect();

    let (cleared, inserted) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let cleared = tx.execute("DELETE FROM valid_combinations", [])?;

        let mut inserted = 0;
        {
          let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO valid_combinations (
               combination_id, stream_id, subject1, subject2, subject3,
               course_ids, created_by, created_at, updated_by, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, '[]', ?6, ?7, ?8, ?9)",
          )?;
          for (id, stream_id, [s1, s2, s3]) in &rows {
            inserted += stmt.execute(rusqlite::params![
              id, stream_id, s1, s2, s3, created_by, created_at, updated_by, updated_at,
            ])?;
          }
        }

        tx.commit()?;
        Ok((cleared, inserted))
      })
      .await?;

    tracing::debug!(cleared, inserted, "valid_combinations replaced");
    Ok(inserted)
  }

  async fn list_combinations(&self, stream_id: Option<i64>) -> Result<Vec<ValidCombination>> {
    match stream_id {
      Some(id) => self.query_combinations("WHERE stream_id = ?1", vec![id]).await,
      None => self.query_combinations("", Vec::new()).await,
    }
  }

  async fn find_by_triple(&self, triple: SubjectTriple) -> Result<Vec<ValidCombination>> {
    self
      .query_combinations(
        "WHERE subject1 = ?1 AND subject2 = ?2 AND subject3 = ?3",
        triple.ids().to_vec(),
      )
      .await
  }

  async fn attach_course(&self, combination_id: Uuid, course_id: i64) -> Result<bool> {
    let id_str = encode_uuid(combination_id);

    let found = self
      .conn
      .call(move |conn| {
        let exists = conn
          .query_row(
            "SELECT 1 FROM valid_combinations WHERE combination_id = ?1",
            rusqlite::params![id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if exists {
          conn.execute(
            "UPDATE valid_combinations
             SET course_ids = json_insert(course_ids, '$[#]', ?2)
             WHERE combination_id = ?1
               AND NOT EXISTS (SELECT 1 FROM json_each(course_ids) WHERE value = ?2)",
            rusqlite::params![id_str, course_id],
          )?;
        }
        Ok(exists)
      })
      .await?;
    Ok(found)
  }

  async fn summarize(&self, samples: usize) -> Result<Vec<StreamSummary>> {
    let limit = i64::try_from(samples).unwrap_or(i64::MAX);

    let (counts, sample_rows) = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT s.stream_id, s.name, COUNT(*)
           FROM valid_combinations c
           JOIN streams s ON s.stream_id = c.stream_id
           GROUP BY s.stream_id, s.name
           ORDER BY s.stream_id",
        )?;
        let counts = stmt
          .query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, i64>(2)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
          "SELECT stream_id, n1, n2, n3 FROM (
             SELECT c.stream_id, a.name AS n1, b.name AS n2, d.name AS n3,
                    ROW_NUMBER() OVER (
                      PARTITION BY c.stream_id
                      ORDER BY c.subject1, c.subject2, c.subject3
                    ) AS rn
             FROM valid_combinations c
             JOIN subjects a ON a.subject_id = c.subject1
             JOIN subjects b ON b.subject_id = c.subject2
             JOIN subjects d ON d.subject_id = c.subject3
           )
           WHERE rn <= ?1
           ORDER BY stream_id, rn",
        )?;
        let sample_rows = stmt
          .query_map(rusqlite::params![limit], |row| {
            Ok((
              row.get::<_, i64>(0)?,
              [row.get::<_, String>(1)?, row.get(2)?, row.get(3)?],
            ))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((counts, sample_rows))
      })
      .await?;

    Ok(
      counts
        .into_iter()
        .map(|(stream_id, stream_name, count)| StreamSummary {
          stream_id,
          stream_name,
          count: count as usize,
          samples: sample_rows
            .iter()
            .filter(|(id, _)| *id == stream_id)
            .map(|(_, names)| names.clone())
            .collect(),
        })
        .collect(),
    )
  }
}
