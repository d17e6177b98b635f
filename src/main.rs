//! AdminHub session runner
//!
//! Wires the session core to the backend API and drives it from the
//! terminal: each stdin line is an activity event name, `refresh`, or
//! `logout`.

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{EnvFilter, fmt};

use adminhub_auth::{ActivityKind, MemoryTokenStorage, SessionManager, TokenStore};
use adminhub_client::HttpSessionApi;
use adminhub_core::config::AppConfig;
use adminhub_core::error::AppError;
use adminhub_core::events::SessionEvent;
use adminhub_core::traits::{SystemClock, TokenRefresher, TokenStorage, UserDirectory};
use adminhub_core::types::Destination;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "adminhub-session", version, about = "Run an AdminHub dashboard session")]
struct Cli {
    /// Extra configuration file merged over config/default.toml.
    #[arg(short, long)]
    config: Option<String>,

    /// Bearer token issued by the login endpoint.
    #[arg(short, long, env = "ADMINHUB_TOKEN")]
    token: Option<String>,

    /// Print the gate decision for each destination and exit.
    #[arg(short, long = "dest")]
    dest: Vec<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(cli, config).await {
        tracing::error!("Session error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

async fn run(cli: Cli, config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting AdminHub session v{}", env!("CARGO_PKG_VERSION"));

    let storage: Arc<dyn TokenStorage> = Arc::new(MemoryTokenStorage::new());
    let store = Arc::new(TokenStore::new(Arc::clone(&storage)));
    let api = Arc::new(HttpSessionApi::new(&config.api, storage)?);

    let manager = SessionManager::new(
        store,
        Arc::clone(&api) as Arc<dyn TokenRefresher>,
        api as Arc<dyn UserDirectory>,
        Arc::new(SystemClock),
        config.session.clone(),
        &config.gate,
    )?;

    if let Some(token) = &cli.token {
        manager.begin(token).await?;
    }

    if !cli.dest.is_empty() {
        for raw in &cli.dest {
            let destination = Destination::new(raw);
            let decision = manager.authorize(&destination).await;
            match decision.redirect() {
                None => println!("{destination} -> allow"),
                Some(target) => println!("{destination} -> redirect {target}"),
            }
        }
        manager.logout().await;
        return Ok(());
    }

    if cli.token.is_none() {
        return Err(AppError::authentication(
            "A token is required to run a session (use --token or ADMINHUB_TOKEN)",
        ));
    }

    drive(&manager).await
}

/// Feeds stdin into the session until it ends.
async fn drive(manager: &SessionManager) -> Result<(), AppError> {
    let mut events = manager.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            notice = events.recv() => {
                match notice {
                    Ok(notice) => {
                        match &notice.event {
                            SessionEvent::IdleWarning { remaining_ms } => {
                                println!("idle warning: session ends in {}s", remaining_ms / 1000);
                            }
                            SessionEvent::RefreshFailed { message } => {
                                println!("refresh failed: {message}");
                            }
                            _ => {}
                        }
                        if let Some(target) = notice.event.redirect() {
                            println!("redirect {target}");
                            return Ok(());
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Session event consumer lagged");
                    }
                    Err(RecvError::Closed) => return Ok(()),
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    let target = manager.logout().await;
                    println!("redirect {target}");
                    return Ok(());
                };
                match line.trim() {
                    "" => {}
                    "logout" => {
                        manager.logout().await;
                    }
                    "refresh" => {
                        let outcome = manager.refresh_now().await?;
                        println!("refresh: {outcome:?}");
                    }
                    "whoami" => match manager.current_user().await {
                        Ok(user) => println!("{} ({})", user.display_name(), user.id),
                        Err(e) => println!("lookup failed: {e}"),
                    },
                    other => match ActivityKind::from_event_name(other) {
                        Some(kind) => manager.record_activity(kind),
                        None => println!("unknown input: {other}"),
                    },
                }
            }
        }
    }
}
