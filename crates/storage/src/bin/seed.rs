use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use lingo_core::model::{Term, TermDraft};
use storage::repository::Storage;
use storage::seed;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    terms: Option<PathBuf>,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("TECHLINGO_DB_URL")
            .unwrap_or_else(|_| "sqlite://techlingo.sqlite3".into());
        let mut terms = None;
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--terms" => {
                    terms = Some(PathBuf::from(require_value(&mut args, "--terms")?));
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, terms, now })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite://techlingo.sqlite3)");
    eprintln!("  --terms <file.json>       Term list to load instead of the built-in glossary");
    eprintln!("  --now <rfc3339>           Overrides created_at of every seeded term");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  TECHLINGO_DB_URL");
}

fn restamp(terms: Vec<Term>, now: DateTime<Utc>) -> Result<Vec<Term>, lingo_core::model::TermError> {
    terms
        .into_iter()
        .map(|term| {
            let id = term.id();
            let draft: TermDraft = term.to_draft();
            draft.validate(id, now)
        })
        .collect()
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let mut terms = match &args.terms {
        Some(path) => seed::load_terms(&std::fs::read_to_string(path)?)?,
        None => seed::builtin_terms()?,
    };
    if let Some(now) = args.now {
        terms = restamp(terms, now)?;
    }

    let storage = Storage::sqlite(&args.db_url).await?;
    for term in &terms {
        storage.terms.upsert_term(term).await?;
    }
    tracing::info!(count = terms.len(), db = %args.db_url, "seeded terms");

    println!(
        "Seeded {} terms into {} ({} total)",
        terms.len(),
        args.db_url,
        storage.terms.count_terms().await?
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("seed=info,storage=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
