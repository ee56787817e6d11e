use std::fmt;
use std::io::{self, Write};

use lingo_core::model::{Difficulty, QuizSettings, TermFilter};
use services::{AppServices, Clock};
use tracing_subscriber::EnvFilter;

mod play;
mod report;

const DEFAULT_DB_URL: &str = "sqlite://techlingo.sqlite3";
const DEFAULT_USER: &str = "learner";
const KNOWN_FLAGS: [&str; 8] = [
    "--db",
    "--user",
    "--questions",
    "--category",
    "--difficulty",
    "--search",
    "--limit",
    "--help",
];

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    UnsupportedFlag { flag: String, command: Command },
    InvalidDbUrl { raw: String },
    InvalidQuestions { raw: String },
    InvalidDifficulty { raw: String },
    InvalidLimit { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::UnsupportedFlag { flag, command } => {
                write!(f, "{flag} is not supported by {command}")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidQuestions { raw } => {
                write!(f, "invalid --questions value (expected a positive number): {raw}")
            }
            ArgsError::InvalidDifficulty { raw } => write!(
                f,
                "invalid --difficulty value (expected beginner, intermediate or advanced): {raw}"
            ),
            ArgsError::InvalidLimit { raw } => write!(f, "invalid --limit value: {raw}"),
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Terms,
    Categories,
    Progress,
    History,
    Leaderboard,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "terms" => Some(Self::Terms),
            "categories" => Some(Self::Categories),
            "progress" => Some(Self::Progress),
            "history" => Some(Self::History),
            "leaderboard" => Some(Self::Leaderboard),
            _ => None,
        }
    }

    fn accepts(self, flag: &str) -> bool {
        match flag {
            "--db" | "--user" | "--questions" => true,
            "--category" | "--difficulty" => matches!(self, Self::Play | Self::Terms),
            "--search" => self == Self::Terms,
            "--limit" => matches!(self, Self::History | Self::Leaderboard),
            _ => false,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Command::Play => "play",
            Command::Terms => "terms",
            Command::Categories => "categories",
            Command::Progress => "progress",
            Command::History => "history",
            Command::Leaderboard => "leaderboard",
        })
    }
}

#[derive(Debug, Clone)]
struct Args {
    command: Command,
    db_url: String,
    username: String,
    settings: QuizSettings,
    filter: TermFilter,
    search: Option<String>,
    limit: Option<u32>,
}

fn parse_questions(raw: String) -> Result<QuizSettings, ArgsError> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .and_then(|n| QuizSettings::default().with_question_count(n).ok())
        .ok_or(ArgsError::InvalidQuestions { raw })
}

impl Args {
    /// Parse command-line `args`, falling back to `env` for the common options.
    fn parse(
        mut args: impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let command = match args.next() {
            None => Command::Play,
            Some(first) => match Command::from_arg(&first) {
                Some(command) => command,
                None if first == "--help" || first == "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                None => return Err(ArgsError::UnknownCommand(first)),
            },
        };

        let mut db_url =
            env("TECHLINGO_DB_URL").map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let mut username = env("TECHLINGO_USER").unwrap_or_else(|| DEFAULT_USER.into());
        let mut settings = match env("TECHLINGO_QUESTIONS") {
            Some(raw) => parse_questions(raw)?,
            None => QuizSettings::default(),
        };
        let mut filter = TermFilter::all();
        let mut search = None;
        let mut limit = None;

        while let Some(arg) = args.next() {
            if arg == "--help" || arg == "-h" {
                print_usage();
                std::process::exit(0);
            }
            if KNOWN_FLAGS.contains(&arg.as_str()) && !command.accepts(&arg) {
                return Err(ArgsError::UnsupportedFlag { flag: arg, command });
            }
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--user" => username = require_value(&mut args, "--user")?,
                "--questions" => {
                    settings = parse_questions(require_value(&mut args, "--questions")?)?;
                }
                "--category" => {
                    filter = filter.with_category(require_value(&mut args, "--category")?);
                }
                "--difficulty" => {
                    let value = require_value(&mut args, "--difficulty")?;
                    let difficulty = value
                        .parse::<Difficulty>()
                        .map_err(|_| ArgsError::InvalidDifficulty { raw: value.clone() })?;
                    filter = filter.with_difficulty(difficulty);
                }
                "--search" => search = Some(require_value(&mut args, "--search")?),
                "--limit" => {
                    let value = require_value(&mut args, "--limit")?;
                    let parsed = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidLimit { raw: value.clone() })?;
                    limit = Some(parsed);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            command,
            db_url,
            username,
            settings,
            filter,
            search,
            limit,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  techlingo [play]       [--category <name>] [--difficulty <level>]");
    eprintln!("  techlingo terms        [--category <name>] [--difficulty <level>] [--search <text>]");
    eprintln!("  techlingo categories");
    eprintln!("  techlingo progress");
    eprintln!("  techlingo history      [--limit <n>]");
    eprintln!("  techlingo leaderboard  [--limit <n>]");
    eprintln!();
    eprintln!("Common options:");
    eprintln!("  --db <sqlite_url>      SQLite URL (default: {DEFAULT_DB_URL})");
    eprintln!("  --user <name>          Player name, 3 to 50 characters (default: {DEFAULT_USER})");
    eprintln!("  --questions <n>        Questions per quiz (default: 5)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  TECHLINGO_DB_URL, TECHLINGO_USER, TECHLINGO_QUESTIONS, RUST_LOG");
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = match Args::parse(std::env::args().skip(1), |key| std::env::var(key).ok()) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            print_usage();
            std::process::exit(2);
        }
    };

    let app = AppServices::new_sqlite(&args.db_url, Clock::system(), args.settings).await?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Play => {
            let user = app.profiles().ensure_profile(&args.username).await?;
            let stdin = io::stdin();
            let mut input = stdin.lock();
            play::run_quiz(&app.quiz_loop(), user.id(), args.filter, &mut input, &mut out)
                .await?;
        }
        Command::Terms => {
            let catalog = app.catalog();
            let terms = match &args.search {
                Some(query) => catalog.search(query, &args.filter).await?,
                None => catalog.list(&args.filter).await?,
            };
            report::print_terms(&mut out, &terms)?;
        }
        Command::Categories => {
            report::print_categories(&mut out, &app.catalog().categories().await?)?;
        }
        Command::Progress => {
            let user = app.profiles().ensure_profile(&args.username).await?;
            let overview = app.progress().overview(user.id()).await?;
            report::print_progress(&mut out, &user, &overview)?;
        }
        Command::History => {
            let user = app.profiles().ensure_profile(&args.username).await?;
            let items = app.progress().history(user.id(), args.limit).await?;
            report::print_history(&mut out, &items)?;
        }
        Command::Leaderboard => {
            let entries = app.progress().leaderboard(args.limit).await?;
            report::print_leaderboard(&mut out, &entries)?;
        }
    }

    out.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("techlingo=info,services=info,storage=info,lingo_core=info")
        }))
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
