use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use kard_core::model::FlashcardDraft;
use kard_core::study::ResumePolicy;
use services::{AppServices, AuthError, Clock};
use storage::local::FileLocalStore;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt as log_fmt};
use ui::{App, UiApp, build_app_context};

const DEFAULT_DB_URL: &str = "sqlite://kard.sqlite3";
const DEFAULT_STORE_PATH: &str = "kard-local.json";

const DEMO_EMAIL: &str = "demo@kard.app";
const DEMO_PASSWORD: &str = "Flashcards1!";
const DEMO_CARDS: &[(&str, &str)] = &[
    ("hola", "hello"),
    ("adiós", "goodbye"),
    ("gracias", "thank you"),
    ("por favor", "please"),
    ("tener", "to have"),
];

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidPort { raw: String },
    InvalidDbUrl { raw: String },
    InvalidResume { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidPort { raw } => write!(f, "invalid --port value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidResume { raw } => {
                write!(f, "invalid --resume value (expected persisted|deck): {raw}")
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  kard ui    [--db <sqlite_url>] [--store <path>] [--resume persisted|deck]");
    eprintln!("  kard serve [--db <sqlite_url>] [--port <port>]");
    eprintln!("  kard seed  [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --store {DEFAULT_STORE_PATH}");
    eprintln!("  --port {}", server::config::DEFAULT_PORT);
    eprintln!("  --resume persisted");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  KARD_DB_URL, KARD_STORE_PATH, KARD_PORT, KARD_RESUME_POLICY, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    Serve,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "serve" => Some(Self::Serve),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    db_url: String,
    store_path: String,
    port: u16,
    resume: ResumePolicy,
}

impl Args {
    fn from_env() -> Self {
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self {
            db_url: env("KARD_DB_URL").map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url),
            store_path: env("KARD_STORE_PATH").unwrap_or_else(|| DEFAULT_STORE_PATH.into()),
            port: env("KARD_PORT")
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(server::config::DEFAULT_PORT),
            resume: env("KARD_RESUME_POLICY")
                .and_then(|raw| raw.parse().ok())
                .unwrap_or_default(),
        }
    }

    fn parse(mut self, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    self.db_url = normalize_sqlite_url(value);
                }
                "--store" => self.store_path = require_value(args, "--store")?,
                "--port" => {
                    let value = require_value(args, "--port")?;
                    self.port = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidPort { raw: value.clone() })?;
                }
                "--resume" => {
                    let value = require_value(args, "--resume")?;
                    self.resume = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidResume { raw: value.clone() })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }
        Ok(self)
    }
}

fn is_memory_url(db_url: &str) -> bool {
    db_url == "sqlite::memory:" || db_url.contains("mode=memory")
}

fn normalize_sqlite_url(raw: String) -> String {
    if is_memory_url(&raw) || raw.starts_with("sqlite://") {
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

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if is_memory_url(db_url) {
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

async fn open_services(args: &Args) -> Result<AppServices, Box<dyn std::error::Error>> {
    prepare_sqlite_file(&args.db_url)?;
    let local = FileLocalStore::open(&args.store_path)?;
    let services = AppServices::new_sqlite(
        &args.db_url,
        Arc::new(local),
        Clock::default_clock(),
        args.resume,
    )
    .await?;
    Ok(services)
}

async fn launch_ui(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let services = open_services(args).await?;
    if let Some(session) = services.auth_service().restore().await? {
        info!(user_id = %session.user_id, "restored session");
    }

    let app: Arc<dyn UiApp> = Arc::new(services);
    let context = build_app_context(&app);

    // Some dev setups default the window to always-on-top.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Kard")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

async fn seed(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let services = open_services(args).await?;
    let auth = services.auth_service();

    match auth.sign_up(DEMO_EMAIL, DEMO_PASSWORD, DEMO_PASSWORD).await {
        Ok(user) => info!(user_id = %user.id, "demo account created"),
        Err(AuthError::EmailTaken) => info!("demo account already exists"),
        Err(e) => return Err(e.into()),
    }
    let session = auth.authenticate(DEMO_EMAIL, DEMO_PASSWORD).await?;
    auth.revoke(&session.token).await?;

    let decks = services.deck_service();
    let existing = decks.search_decks(session.user_id, "Spanish").await?;
    if existing.iter().any(|deck| deck.name() == "Spanish") {
        info!("demo deck already present");
    } else {
        let deck = decks
            .create_deck(session.user_id, "Spanish", Some("Everyday words"))
            .await?;
        let drafts: Vec<_> = DEMO_CARDS
            .iter()
            .map(|(front, back)| FlashcardDraft::new(*front, *back))
            .collect();
        decks
            .create_flashcards(session.user_id, deck.id(), &drafts)
            .await?;
    }

    eprintln!("seeded {} into {}", DEMO_EMAIL, args.db_url);
    eprintln!("sign in with password {DEMO_PASSWORD}");
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Ui,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Ui,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if argv.first().is_some_and(|first| !first.starts_with("--")) {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let args = Args::from_env().parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    match cmd {
        Command::Ui => launch_ui(&args).await,
        Command::Serve => {
            prepare_sqlite_file(&args.db_url)?;
            server::serve(server::Config {
                port: args.port,
                db_url: args.db_url,
            })
            .await?;
            Ok(())
        }
        Command::Seed => seed(&args).await,
    }
}

#[tokio::main]
async fn main() {
    log_fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
