//! Campus Console CLI - drive the login flow from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Log in (password from CAMPUS_PASSWORD)
//! campus-cli login --username asha
//!
//! # Inspect the persisted session
//! campus-cli status
//! campus-cli whoami
//! campus-cli mirror hideCharts
//! campus-cli redirect
//!
//! # Log out
//! campus-cli logout
//! ```
//!
//! # Commands
//!
//! - `login` - Authenticate, or reuse a still-valid session
//! - `logout` - Destroy the persisted session
//! - `status` - Report whether the persisted session is valid
//! - `whoami` - Print the persisted session
//! - `mirror` - Print one scalar mirror
//! - `redirect` - Print the current post-login destination

#![cfg_attr(not(test), forbid(unsafe_code))]

use campus_console::ConsoleConfig;
use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "campus-cli")]
#[command(author, version, about = "Campus Console login tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to the console
    Login {
        /// Account username
        #[arg(short, long)]
        username: String,

        /// Read the password from the first line of stdin
        #[arg(long)]
        password_stdin: bool,
    },
    /// Log out and destroy the persisted session
    Logout,
    /// Report whether a valid session is persisted
    Status,
    /// Print the persisted session
    Whoami,
    /// Print a scalar mirror (`hideCharts`, `groupMode`, ...)
    Mirror {
        /// Mirror key
        key: String,
    },
    /// Print where the console would navigate now
    Redirect,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ConsoleConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "campus_console=info,campus_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Configuration is needed before Sentry, so report its errors after
    // tracing is up.
    let config = ConsoleConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);
    init_tracing();

    let result = match config {
        Ok(config) => run(cli, &config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &ConsoleConfig) -> Result<(), CliError> {
    match cli.command {
        Commands::Login {
            username,
            password_stdin,
        } => commands::session::login(config, &username, password_stdin).await?,
        Commands::Logout => commands::session::logout(config)?,
        Commands::Status => commands::inspect::status(config),
        Commands::Whoami => commands::inspect::whoami(config)?,
        Commands::Mirror { key } => commands::inspect::mirror(config, &key)?,
        Commands::Redirect => commands::inspect::redirect(config),
    }
    Ok(())
}
