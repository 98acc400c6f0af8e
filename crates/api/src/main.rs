use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use taskboard_api::{build_state, router};
use taskboard_db::{DEFAULT_DB_PATH, Database, UserId};

/// Environment variable name for the database path
const TBD_DB_PATH_ENV: &str = "TBD_DB_PATH";

/// Taskboard - a multi-user TODO-list API server
#[derive(Parser)]
#[command(name = "tbd")]
#[command(version = "0.1.0")]
#[command(about = "A multi-user TODO-list API server", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8000", env = "TBD_LISTEN")]
    listen: SocketAddr,

    /// Path to the database directory (can also be set via TBD_DB_PATH env var)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Accepted bearer credentials as USER_ID:TOKEN pairs
    #[arg(
        long = "token",
        value_name = "USER_ID:TOKEN",
        env = "TBD_AUTH_TOKENS",
        value_delimiter = ','
    )]
    tokens: Vec<String>,
}

/// Get the database path from command line, environment variable, or default.
///
/// Priority:
/// 1. Command line --db argument
/// 2. TBD_DB_PATH environment variable (if non-empty)
/// 3. Default path (.tbd/data relative to the working directory)
fn resolve_db_path(cli_db: Option<PathBuf>) -> PathBuf {
    if let Some(path) = cli_db {
        return path;
    }

    if let Ok(env_path) = std::env::var(TBD_DB_PATH_ENV)
        && !env_path.is_empty()
    {
        return PathBuf::from(env_path);
    }

    PathBuf::from(DEFAULT_DB_PATH)
}

/// Parse USER_ID:TOKEN pairs into the token table.
///
/// Token issuance lives outside this system; the server only needs the
/// finished table.
fn parse_token_table(pairs: &[String]) -> Result<HashMap<String, UserId>, String> {
    let mut tokens = HashMap::new();
    for pair in pairs {
        let Some((user_id, token)) = pair.split_once(':') else {
            return Err(format!("Invalid token pair '{}', expected USER_ID:TOKEN", pair));
        };
        let user_id: i64 = user_id
            .trim()
            .parse()
            .map_err(|_| format!("Invalid user id in token pair '{}'", pair))?;
        let token = token.trim();
        if token.is_empty() {
            return Err(format!("Empty token in pair '{}'", pair));
        }
        tokens.insert(token.to_string(), UserId(user_id));
    }
    Ok(tokens)
}

/// Initialize logging based on the RUST_LOG environment variable.
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = run_app().await {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

/// Main application logic - separated for testability
async fn run_app() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let db_path = resolve_db_path(args.db.clone());
    let db = Database::connect(&db_path).await?;
    db.init().await?;
    info!("Database ready at {}", db_path.display());

    let tokens = parse_token_table(&args.tokens)?;
    if tokens.is_empty() {
        return Err("No auth tokens configured; pass --token USER_ID:TOKEN".into());
    }

    // Filter misconfiguration is fatal here, before the listener opens
    let state = build_state(db, tokens)?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(args.listen).await?;
    info!("Listening on {}", args.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
