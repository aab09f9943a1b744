use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use nftstake_client::config::{ClientConfig, ConfigError, parse_phase_lookup};
use nftstake_client::hooks::catalog::{Memberships, Missions, News, Nfts};
use nftstake_client::hooks::chain::{ChainStats, TransactionHistory};
use nftstake_client::hooks::staking::{PhaseById, Phases, phase_countdown, start_phase_countdown};
use nftstake_client::net::api::{ApiError, HttpApi, PlatformApi};
use nftstake_client::state::auth::{self, AuthSession, AuthStore, FileStorage, StorageError, is_token_expired};
use nftstake_client::state::countdown::{Countdown, CountdownTimer};
use nftstake_client::state::resource::AsyncResource;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("{0}")]
    Fetch(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("not signed in; run `nftstake session login --token <TOKEN>`")]
    NotSignedIn,
}

#[derive(Parser, Debug)]
#[command(name = "nftstake", about = "Staking platform API client")]
struct Cli {
    /// API base URL; overrides `NFTSTAKE_API_URL`.
    #[arg(long)]
    base_url: Option<String>,

    /// Session file; overrides `NFTSTAKE_AUTH_FILE`.
    #[arg(long)]
    auth_file: Option<PathBuf>,

    /// Phase lookup strategy (`direct` or `scan`); overrides `NFTSTAKE_PHASE_LOOKUP`.
    #[arg(long)]
    lookup: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List staking phases.
    Phases,
    /// Show one phase and its remaining time.
    Phase {
        id: String,
        /// Keep ticking the phase countdown after printing the phase.
        #[arg(long, default_value_t = false)]
        watch: bool,
    },
    /// Network statistics.
    Stats,
    /// Transaction history of the signed-in wallet.
    History,
    Memberships,
    Nfts {
        /// Only NFTs currently listed for sale.
        #[arg(long, default_value_t = false)]
        listed: bool,
    },
    Missions,
    News,
    /// Run a countdown locally.
    Countdown(CountdownArgs),
    Session(SessionCommand),
}

#[derive(Args, Debug)]
struct CountdownArgs {
    days: u32,
    hours: u32,
    minutes: u32,

    #[arg(long, help = "Stop after this many ticks")]
    ticks: Option<u32>,

    #[arg(
        long,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Tick period in seconds; defaults to NFTSTAKE_COUNTDOWN_TICK_SECS"
    )]
    period_secs: Option<u64>,
}

#[derive(Args, Debug)]
struct SessionCommand {
    #[command(subcommand)]
    command: SessionSubcommand,
}

#[derive(Subcommand, Debug)]
enum SessionSubcommand {
    Show,
    Login {
        #[arg(long, env = "NFTSTAKE_TOKEN")]
        token: String,
        #[arg(long)]
        wallet: Option<String>,
    },
    Logout,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let api: Arc<dyn PlatformApi> = Arc::new(HttpApi::from_config(&config)?);
    let store = auth::init_global(FileStorage::new(&config.auth_file));
    info!(api_url = %config.api_url, "client configured");

    match cli.command {
        Command::Phases => {
            let unit = Phases::new(api);
            unit.mount().await;
            emit(unit.state())
        }
        Command::Phase { id, watch } => {
            let unit = PhaseById::new(api, config.phase_lookup);
            unit.select(&id).await;
            let state = unit.state();
            let Some(phase) = state.data() else {
                return emit(state);
            };
            print_json(phase)?;
            if watch {
                follow_countdown(start_phase_countdown(phase, config.countdown_tick), None).await;
            } else {
                println!("{}", phase_countdown(phase, OffsetDateTime::now_utc()));
            }
            Ok(())
        }
        Command::Stats => {
            let unit = ChainStats::new(api);
            unit.mount().await;
            emit(unit.state())
        }
        Command::History => {
            let session = require_session(store)?;
            let unit = TransactionHistory::new(api);
            unit.sync(Some(&session)).await;
            emit(unit.state())
        }
        Command::Memberships => {
            let unit = Memberships::new(api);
            unit.mount().await;
            emit(unit.state())
        }
        Command::Nfts { listed } => {
            let unit = Nfts::new(api);
            unit.mount().await;
            if listed {
                let state = unit.state();
                if let AsyncResource::Error(msg) = state {
                    return Err(CliError::Fetch(msg));
                }
                return print_json(&unit.listed());
            }
            emit(unit.state())
        }
        Command::Missions => {
            let unit = Missions::new(api);
            unit.sync(store.session().as_ref()).await;
            emit(unit.state())
        }
        Command::News => {
            let unit = News::new(api);
            unit.mount().await;
            emit(unit.state())
        }
        Command::Countdown(args) => {
            let period = args.period_secs.map_or(config.countdown_tick, Duration::from_secs);
            let initial = Countdown::new(args.days, args.hours, args.minutes);
            println!("{initial}");
            if !initial.is_zero() {
                follow_countdown(CountdownTimer::start(initial, period), args.ticks).await;
            }
            Ok(())
        }
        Command::Session(cmd) => run_session(store, cmd.command),
    }
}

fn resolve_config(cli: &Cli) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.base_url {
        config.api_url = url.trim_end_matches('/').to_owned();
    }
    if let Some(path) = &cli.auth_file {
        config.auth_file.clone_from(path);
    }
    if let Some(lookup) = cli.lookup.as_deref() {
        config.phase_lookup = parse_phase_lookup(Some(lookup))?;
    }
    Ok(config)
}

fn require_session(store: &AuthStore) -> Result<AuthSession, CliError> {
    store.session().ok_or(CliError::NotSignedIn)
}

fn emit<T: Serialize>(state: AsyncResource<T>) -> Result<(), CliError> {
    match state {
        AsyncResource::Success(data) => print_json(&data),
        AsyncResource::Error(msg) => Err(CliError::Fetch(msg)),
        AsyncResource::Idle | AsyncResource::Loading => Err(CliError::Fetch("request did not settle".into())),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print each tick until zero or `ticks` ticks have passed.
async fn follow_countdown(timer: CountdownTimer, ticks: Option<u32>) {
    if timer.current().is_zero() || ticks == Some(0) {
        return;
    }
    let mut rx = timer.subscribe();
    let mut seen = 0u32;
    while rx.changed().await.is_ok() {
        let current = *rx.borrow_and_update();
        println!("{current}");
        seen += 1;
        if current.is_zero() || ticks.is_some_and(|max| seen >= max) {
            break;
        }
    }
}

fn run_session(store: &AuthStore, command: SessionSubcommand) -> Result<(), CliError> {
    match command {
        SessionSubcommand::Show => match store.session() {
            Some(session) => print_json(&session),
            None => Err(CliError::NotSignedIn),
        },
        SessionSubcommand::Login { token, wallet } => {
            if is_token_expired(&token, OffsetDateTime::now_utc()) {
                warn!("token is expired or unreadable; it will be discarded on next start");
            }
            store.set_session(AuthSession { token, wallet_address: wallet, user: None })?;
            println!("signed in");
            Ok(())
        }
        SessionSubcommand::Logout => {
            store.clear_auth_data()?;
            println!("signed out");
            Ok(())
        }
    }
}
