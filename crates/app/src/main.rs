use std::fmt;
use std::sync::Arc;

use drill_core::model::{CacheVersion, Category};
use drill_core::session::DEFAULT_SESSION_SIZE;
use services::{
    AssetCacheManager, AssetManifest, CachedFetcher, Clock, DEFAULT_CACHE_VERSION,
    FetchQuestionBankLoader, Fetcher, HttpFetcher, QuizService,
};
use storage::repository::Storage;
use tracing_subscriber::EnvFilter;
use url::Url;

mod drill;

const DEFAULT_BASE_URL: &str = "http://localhost:8080/";
const DEFAULT_DB_URL: &str = "sqlite://drill.sqlite3";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidBaseUrl { raw: String },
    InvalidSize { raw: String },
    InvalidCategory { raw: String },
    InvalidCacheVersion { raw: String },
    InvalidSeed { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidBaseUrl { raw } => write!(f, "invalid --base-url value: {raw}"),
            ArgsError::InvalidSize { raw } => write!(f, "invalid --size value: {raw}"),
            ArgsError::InvalidCategory { raw } => {
                write!(f, "invalid --category value: {raw} (expected masc, fem or neut)")
            }
            ArgsError::InvalidCacheVersion { raw } => {
                write!(f, "invalid --cache-version value: {raw:?}")
            }
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- drill   [options] [--category <id>] [--size <n>] [--seed <n>]");
    eprintln!("  cargo run -p app -- install [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>          default {DEFAULT_DB_URL}");
    eprintln!("  --base-url <url>           default {DEFAULT_BASE_URL}");
    eprintln!("  --cache-version <tag>      default {DEFAULT_CACHE_VERSION}");
    eprintln!();
    eprintln!("Defaults for drill:");
    eprintln!("  --size {DEFAULT_SESSION_SIZE}");
    eprintln!("  --category <remembered choice, else masc>");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  DRILL_DB_URL, DRILL_BASE_URL, DRILL_SESSION_SIZE, DRILL_CACHE_VERSION, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Drill,
    Install,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "drill" => Some(Self::Drill),
            "install" => Some(Self::Install),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    base_url: Url,
    cache_version: CacheVersion,
    session_size: usize,
    category: Option<Category>,
    seed: Option<u64>,
}

impl Args {
    fn parse(
        cmd: Command,
        args: &mut impl Iterator<Item = String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("DRILL_DB_URL")
            .ok()
            .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url);
        let mut base_url = parse_base_url(
            std::env::var("DRILL_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into()),
        )?;
        let mut cache_version = parse_cache_version(
            std::env::var("DRILL_CACHE_VERSION").unwrap_or_else(|_| DEFAULT_CACHE_VERSION.into()),
        )?;
        let mut session_size = std::env::var("DRILL_SESSION_SIZE")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .unwrap_or(DEFAULT_SESSION_SIZE);
        let mut category = None;
        let mut seed = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--base-url" => base_url = parse_base_url(require_value(args, "--base-url")?)?,
                "--cache-version" => {
                    cache_version = parse_cache_version(require_value(args, "--cache-version")?)?;
                }
                "--size" if cmd == Command::Drill => {
                    let value = require_value(args, "--size")?;
                    session_size = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidSize { raw: value.clone() })?;
                }
                "--category" if cmd == Command::Drill => {
                    let value = require_value(args, "--category")?;
                    let parsed: Category = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidCategory { raw: value.clone() })?;
                    category = Some(parsed);
                }
                "--seed" if cmd == Command::Drill => {
                    let value = require_value(args, "--seed")?;
                    let parsed: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?;
                    seed = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            base_url,
            cache_version,
            session_size,
            category,
            seed,
        })
    }
}

/// Manifest paths and question banks resolve relative to the base, so it
/// must name a directory.
fn parse_base_url(raw: String) -> Result<Url, ArgsError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&with_slash).map_err(|_| ArgsError::InvalidBaseUrl { raw })
}

fn parse_cache_version(raw: String) -> Result<CacheVersion, ArgsError> {
    CacheVersion::new(raw.as_str()).map_err(|_| ArgsError::InvalidCacheVersion { raw })
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

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,app=info,services=info,storage=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Without a subcommand the drill starts.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Drill,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Drill,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(cmd, &mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_tracing();

    // Open + migrate SQLite in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;

    let network: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new());
    let cache = Arc::new(AssetCacheManager::new(
        parsed.cache_version.clone(),
        AssetManifest::default(),
        parsed.base_url.clone(),
        Arc::clone(&storage.asset_cache),
        network,
    ));

    match cmd {
        Command::Install => {
            let stored = cache.install().await?;
            let evicted = cache.activate().await?;
            println!(
                "offline cache {} ready: {stored} assets stored, {} old generation(s) removed",
                parsed.cache_version,
                evicted.len()
            );
            Ok(())
        }
        Command::Drill => {
            let loader = FetchQuestionBankLoader::new(
                parsed.base_url.clone(),
                Arc::new(CachedFetcher::new(cache)),
            );
            let mut quiz = QuizService::new(
                Clock::system(),
                Arc::new(loader),
                Arc::clone(&storage.preferences),
            )
            .with_session_size(parsed.session_size);
            if let Some(seed) = parsed.seed {
                quiz = quiz.with_seed(seed);
            }

            drill::open(&mut quiz, parsed.category).await;
            drill::run(&mut quiz).await?;
            Ok(())
        }
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let url = parse_base_url("https://example.org/drill".into()).unwrap();
        assert_eq!(url.as_str(), "https://example.org/drill/");
        assert_eq!(
            url.join("questions_fem.json").unwrap().as_str(),
            "https://example.org/drill/questions_fem.json"
        );
    }

    #[test]
    fn drill_flags_are_parsed() {
        let mut args = ["--category", "neut", "--size", "5", "--seed", "42"]
            .into_iter()
            .map(String::from);
        let parsed = Args::parse(Command::Drill, &mut args).unwrap();
        assert_eq!(parsed.category, Some(Category::Neut));
        assert_eq!(parsed.session_size, 5);
        assert_eq!(parsed.seed, Some(42));
    }

    #[test]
    fn install_rejects_drill_only_flags() {
        let mut args = ["--size", "5"].into_iter().map(String::from);
        let err = Args::parse(Command::Install, &mut args).unwrap_err();
        assert!(matches!(err, ArgsError::UnknownArg(ref arg) if arg == "--size"));
    }

    #[test]
    fn bad_values_are_reported() {
        let mut args = ["--category", "plural"].into_iter().map(String::from);
        assert!(matches!(
            Args::parse(Command::Drill, &mut args),
            Err(ArgsError::InvalidCategory { .. })
        ));

        let mut args = ["--cache-version", "  "].into_iter().map(String::from);
        assert!(matches!(
            Args::parse(Command::Drill, &mut args),
            Err(ArgsError::InvalidCacheVersion { .. })
        ));

        let mut args = ["--db"].into_iter().map(String::from);
        assert!(matches!(
            Args::parse(Command::Drill, &mut args),
            Err(ArgsError::MissingValue { flag: "--db" })
        ));
    }
}
