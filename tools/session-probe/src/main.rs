//! Session probe: drives the session store against the account service and prints
//! the resulting session and guard decision as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Sign in and check whether the session may stay on the admin overview
//! session-probe --api-url http://localhost:3112 sign-in --email ana@example.com \
//!     --password secret1 --screen admin_overview
//!
//! # Same flow against an in-process backend seeded with a location admin
//! session-probe --offline sign-in --email lee@example.com --password secret1 \
//!     --role location_admin --screen mailbox
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use parcelbox_domain::capability::Screen;
use parcelbox_domain::profile::Role;
use parcelbox_session::SessionManager;
use parcelbox_session::config::BackendConfig;
use parcelbox_session::infra::http::HttpBackend;
use parcelbox_session::infra::memory::MemoryBackend;

mod probe;

use probe::{Command, GuardTarget};

#[derive(Parser)]
#[command(about = "Exercise the Parcelbox session store and route guard")]
struct Args {
    /// Base URL of the account service (e.g. http://localhost:3112). Falls back to
    /// PARCELBOX_API_URL and PARCELBOX_API_TIMEOUT_SECS.
    #[arg(long)]
    api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Access token of an earlier sign-in, used to restore the session
    #[arg(long, env = "PARCELBOX_TOKEN")]
    token: Option<String>,

    /// Use an in-process backend instead of the account service
    #[arg(long)]
    offline: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Create an account
    SignUp {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        /// Requested role (snake_case, e.g. location_staff)
        #[arg(long)]
        role: Option<Role>,
    },
    /// Sign in and evaluate the guard for a page
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Restricted screen to check (snake_case, e.g. admin_overview)
        #[arg(long, conflicts_with = "page")]
        screen: Option<Screen>,
        /// Page that only needs a signed-in session
        #[arg(long)]
        page: Option<String>,
        /// Offline only: role of the account seeded before signing in
        #[arg(long)]
        role: Option<Role>,
    },
    /// Print the restored session
    Whoami {
        #[arg(long)]
        screen: Option<Screen>,
    },
}

impl Cmd {
    fn into_command(self) -> Command {
        match self {
            Cmd::SignUp {
                email,
                password,
                first_name,
                last_name,
                role,
            } => Command::SignUp {
                email,
                password,
                first_name,
                last_name,
                role,
            },
            Cmd::SignIn {
                email,
                password,
                screen,
                page,
                role,
            } => Command::SignIn {
                email,
                password,
                target: GuardTarget::from_args(screen, page),
                seed_role: role,
            },
            Cmd::Whoami { screen } => Command::Whoami {
                target: GuardTarget::from_args(screen, None),
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    parcelbox_core::tracing::init_cli_tracing();

    let args = Args::parse();
    let command = args.command.into_command();

    let report = if args.offline {
        let backend = MemoryBackend::new();
        let manager = SessionManager::new(backend.clone(), backend);
        probe::execute(&manager, command, true).await?
    } else {
        let mut config = match args.api_url {
            Some(api_url) => BackendConfig::new(api_url),
            None => BackendConfig::from_env()
                .context("--api-url (or PARCELBOX_API_URL) is required unless --offline is set")?,
        };
        if let Some(secs) = args.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        let mut backend = HttpBackend::new(&config).context("build HTTP backend")?;
        if let Some(token) = args.token {
            backend = backend.with_token(token);
        }
        let manager = SessionManager::new(backend.clone(), backend.clone());
        let mut report = probe::execute(&manager, command, false).await?;
        if let Some(token) = backend.token() {
            report["access_token"] = serde_json::Value::String(token);
        }
        report
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
