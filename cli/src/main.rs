//! SIEM Query Lab CLI
//!
//! Command-line interface for running detection queries and working through
//! the lessons without a server.
//!
//! # Usage
//!
//! ```bash
//! siemlab --help
//! siemlab run --dialect spl "search action=failed_login | stats count by username"
//! siemlab run --dialect sql --data events.json --json "SELECT * FROM events LIMIT 5"
//! siemlab lessons --dialect kql
//! siemlab practice --dialect sigma --lesson 2
//! ```

#![deny(unsafe_code)]

mod practice;
mod table;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use shared::lab::{Curriculum, Session};
use shared::models::{dataset_from_json, DataSource, Dataset, Dialect};
use shared::query::run_query;
use shared::storage::{DatasetStore, InMemoryDatasetStore};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// SIEM Query Lab - practice SQL, SPL, KQL and Sigma against security logs
#[derive(Parser)]
#[command(name = "siemlab")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding <source>.json datasets (default: bundled samples)
    #[arg(long, global = true, env = "SIEMLAB_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one query and print its results
    Run {
        /// Query dialect: sql, spl, kql or sigma
        #[arg(short, long)]
        dialect: Dialect,

        /// Named data source to query
        #[arg(short, long, conflicts_with = "data", default_value = "auth_logs")]
        source: DataSource,

        /// JSON file holding an array of records to query instead
        #[arg(long)]
        data: Option<PathBuf>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Query text, or - to read it from stdin
        query: String,
    },

    /// List the lessons of a dialect
    Lessons {
        /// Query dialect: sql, spl, kql or sigma
        #[arg(short, long)]
        dialect: Dialect,
    },

    /// Work through lessons interactively
    Practice {
        /// Query dialect: sql, spl, kql or sigma
        #[arg(short, long)]
        dialect: Dialect,

        /// Lesson number to start at (1-based)
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
        lesson: u16,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let store = InMemoryDatasetStore::from_data_dir(cli.data_dir.as_deref());

    match cli.command {
        Commands::Run {
            dialect,
            source,
            data,
            json,
            query,
        } => {
            let query = read_query(query)?;
            let data = match data {
                Some(path) => Arc::new(load_records(&path)?),
                None => store.get(source)?,
            };
            tracing::debug!(%dialect, records = data.len(), "Running query");
            let result = run_query(&query, &data, dialect)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result.results)?);
            } else {
                print!("{}", table::render(&result.results));
                println!("({} rows)", result.returned_count());
            }
        }
        Commands::Lessons { dialect } => {
            let curriculum = Curriculum::builtin()?;
            print!("{}", lesson_list(&curriculum, dialect));
        }
        Commands::Practice { dialect, lesson } => {
            let curriculum = Curriculum::builtin()?;
            let mut session = Session::new(dialect);
            session.select_lesson(&curriculum, usize::from(lesson) - 1)?;
            let stdin = io::stdin();
            practice::Practice::new(&curriculum, &store, session, stdin.lock(), io::stdout())
                .run()?;
        }
    }

    Ok(())
}

/// Returns the query text, reading stdin when it is `-`.
fn read_query(query: String) -> Result<String> {
    if query != "-" {
        return Ok(query);
    }
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read query from stdin")?;
    if text.trim().is_empty() {
        bail!("No query on stdin");
    }
    Ok(text)
}

/// Loads a JSON array of flat objects.
fn load_records(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    dataset_from_json(value)
        .with_context(|| format!("{} must hold an array of objects", path.display()))
}

/// Formats the numbered lesson list of one dialect.
fn lesson_list(curriculum: &Curriculum, dialect: Dialect) -> String {
    let lessons = curriculum.lessons(dialect);
    let mut out = format!("{} lessons ({})\n", dialect.tag().to_uppercase(), lessons.len());
    for (index, lesson) in lessons.iter().enumerate() {
        let kind = format!("[{}]", lesson.kind);
        out.push_str(&format!("{:>3}. {kind:<12} {}", index + 1, lesson.title));
        if let Some(source) = lesson.data_source {
            out.push_str(&format!("  ({source})"));
        }
        out.push('\n');
    }
    out
}
