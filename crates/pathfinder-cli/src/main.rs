//! `pathfinder`, the maintenance tool for the PathFinder combination store.
//!
//! # Usage
//!
//! ```
//! pathfinder seed --defaults
//! pathfinder generate
//! pathfinder summary --samples 5
//! pathfinder check Physics Chemistry "Combined Mathematics"
//! pathfinder serve
//! ```

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};
use pathfinder_api::{ApiState, api_router};
use pathfinder_core::{
  catalogue::{Subject, SubjectCatalogue, SubjectKey},
  combination::SubjectTriple,
  regenerate::{StreamStatus, regenerate},
  store::CombinationStore,
  stream::{Stream, default_streams},
};
use pathfinder_store_sqlite::SqliteStore;
use serde::Deserialize;
use settings::Settings;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "PathFinder subject-combination generator")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "pathfinder.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Load subjects and streams into the store.
  Seed {
    /// Write the stock subject catalogue and streams.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    defaults: bool,

    /// JSON file of the form `{"subjects": [...], "streams": [...]}`.
    #[arg(long, value_name = "FILE")]
    file: Option<PathBuf>,
  },
  /// Regenerate every stream's valid combinations, then print the summary.
  Generate,
  /// Print per-stream counts and sample combinations.
  Summary {
    /// Sample rows per stream (defaults to `summary_samples`).
    #[arg(long)]
    samples: Option<usize>,
  },
  /// List the streams under which three subjects form a valid combination.
  Check {
    /// Subject ids or catalogue names.
    #[arg(num_args = 3, required = true)]
    subjects: Vec<String>,
  },
  /// Serve the admin API over HTTP.
  Serve,
}

/// Shape of a `seed --file` document.
#[derive(Deserialize)]
struct SeedFile {
  #[serde(default)]
  subjects: Vec<Subject>,
  #[serde(default)]
  streams:  Vec<Stream>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;

  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))?;

  match cli.command {
    Command::Seed { defaults, file } => seed(&store, defaults, file).await,
    Command::Generate => generate(&store, &settings).await,
    Command::Summary { samples } => {
      print_summary(&store, samples.unwrap_or(settings.summary_samples)).await
    }
    Command::Check { subjects } => check(&store, &subjects).await,
    Command::Serve => serve(store, &settings).await,
  }
}

// ─── Commands ─────────────────────────────────────────────────────────────────

async fn seed(store: &SqliteStore, defaults: bool, file: Option<PathBuf>) -> anyhow::Result<()> {
  let (subjects, streams) = if defaults {
    let subjects = SubjectKey::default_catalogue();
    let streams = default_streams(&SubjectCatalogue::new(subjects.clone()))?;
    (subjects, streams)
  } else if let Some(path) = file {
    let raw = std::fs::read_to_string(&path)
      .with_context(|| format!("reading seed file {}", path.display()))?;
    let seed: SeedFile = serde_json::from_str(&raw).context("parsing seed file")?;
    (seed.subjects, seed.streams)
  } else {
    bail!("either --defaults or --file is required");
  };

  let (subject_count, stream_count) = (subjects.len(), streams.len());
  for subject in subjects {
    store.put_subject(subject).await?;
  }
  for stream in streams {
    store.put_stream(stream).await?;
  }
  tracing::info!(subjects = subject_count, streams = stream_count, "seeded store");
  Ok(())
}

async fn generate(store: &SqliteStore, settings: &Settings) -> anyhow::Result<()> {
  let report = regenerate(store, &settings.generation_options())
    .await
    .context("generation failed")?;

  for outcome in &report.streams {
    match &outcome.status {
      StreamStatus::Generated { count } => {
        println!("{:>4}  {} ({} rejected)", count, outcome.stream_name, outcome.rejected.len())
      }
      StreamStatus::Skipped { reason } => {
        println!("   -  {} skipped: {reason}", outcome.stream_name)
      }
    }
  }
  println!("{} combinations stored\n", report.inserted);

  print_summary(store, settings.summary_samples).await
}

async fn print_summary(store: &SqliteStore, samples: usize) -> anyhow::Result<()> {
  let summary = store.summarize(samples).await?;
  if summary.is_empty() {
    println!("no valid combinations stored");
  }
  for stream in &summary {
    tracing::debug!(stream_id = stream.stream_id, count = stream.count, "summary");
    print!("{stream}");
  }
  Ok(())
}

async fn check(store: &SqliteStore, subjects: &[String]) -> anyhow::Result<()> {
  let catalogue = SubjectCatalogue::new(store.list_subjects().await?);

  let ids = subjects
    .iter()
    .map(|s| match s.parse::<i64>() {
      Ok(id) => Ok(id),
      Err(_) => catalogue
        .id_of_name(s)
        .with_context(|| format!("unknown subject {s:?}")),
    })
    .collect::<anyhow::Result<Vec<_>>>()?;
  let triple = SubjectTriple::try_from(ids)?;
  let [a, b, c] = catalogue.names(&triple);

  let matches = store.find_by_triple(triple).await?;
  if matches.is_empty() {
    println!("{a} + {b} + {c} is not a valid combination in any stream");
    return Ok(());
  }

  let streams = store.list_streams().await?;
  println!("{a} + {b} + {c} is valid in:");
  for row in matches {
    let name = streams
      .iter()
      .find(|s| s.id == row.stream_id)
      .map_or("?", |s| s.name.as_str());
    println!("  - {name} (stream {})", row.stream_id);
  }
  Ok(())
}

async fn serve(store: SqliteStore, settings: &Settings) -> anyhow::Result<()> {
  let state = ApiState {
    store:   Arc::new(store),
    options: Arc::new(settings.generation_options()),
  };
  let app = api_router(state).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", settings.host, settings.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;
  Ok(())
}
