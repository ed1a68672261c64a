//! LayerNEXUS command-line client
//!
//! Wires the storage, pipeline and license crates together so a session and
//! the license state can be driven from a terminal:
//! 1. Sign in once; the credential lives in a local SQLite state file
//! 2. Check the license; the result keeps working offline for the grace window
//!
//! Usage:
//!   layernexus --server https://nexus.example.com login alice
//!   layernexus license check

mod output;

use std::{path::PathBuf, sync::Arc};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use layernexus_auth::{AuthClient, AuthConfig, SessionEvent};
use layernexus_license::{
    CheckKind, Feature, FeatureGate, LicenseManager, LicensePolicy, LicenseSetup,
    RemoteLicenseAuthority, SystemClock, LICENSE_TTL_SECS, OFFLINE_GRACE_SECS,
};
use layernexus_storage::{KeyValueStore, SqliteStore};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "layernexus")]
#[command(about = "LayerNEXUS session and license client")]
struct Args {
    /// Server base URL
    #[arg(short, long, env = "LAYERNEXUS_SERVER", default_value = "http://localhost:8000")]
    server: String,

    /// Path to the local state database
    #[arg(long, env = "LAYERNEXUS_STATE", default_value = "layernexus-state.db")]
    state: PathBuf,

    /// Seconds a verified license is trusted without asking the server
    #[arg(long, default_value_t = LICENSE_TTL_SECS)]
    ttl_secs: i64,

    /// Seconds the license stays usable while the server is unreachable
    #[arg(long, default_value_t = OFFLINE_GRACE_SECS)]
    grace_secs: i64,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session credential
    Login {
        username: String,

        #[arg(long, env = "LAYERNEXUS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored credential
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Inspect or activate the license
    #[command(subcommand)]
    License(LicenseCommand),
    /// Show whether AI cleanup is available
    Gate,
}

#[derive(Subcommand, Debug)]
enum LicenseCommand {
    /// Show the cached license state without contacting the server
    Status,
    /// Re-verify the license if the cached state is stale
    Check,
    /// Ask the server whether a license key is configured
    Ready,
    /// Submit a license key to the server
    Setup { key: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let store: Arc<dyn KeyValueStore> = Arc::new(
        SqliteStore::open(&args.state)
            .with_context(|| format!("Failed to open state file {}", args.state.display()))?,
    );
    debug!(server = %args.server, state = %args.state.display(), "Client starting");

    let client = Arc::new(
        AuthClient::new(AuthConfig::with_base_url(&args.server), Arc::clone(&store))
            .context("Failed to build HTTP client")?
            .with_session_handler(Arc::new(|event: &SessionEvent| {
                if let SessionEvent::Expired { .. } = event {
                    eprintln!(
                        "Session expired. Run `layernexus login <username>` to sign in again."
                    );
                }
            })),
    );
    let policy = LicensePolicy::new(args.ttl_secs, args.grace_secs)?;

    match args.command {
        Command::Login { username, password } => {
            let user = client.login(&username, &password).await?;
            output::print_user(&user);
        }
        Command::Logout => {
            client.logout()?;
            println!("Signed out.");
        }
        Command::Whoami => {
            if !client.has_credential()? {
                println!("Not signed in.");
            } else {
                let user = client.current_user().await.context("Failed to load current user")?;
                output::print_user(&user);
            }
        }
        Command::License(LicenseCommand::Status) => {
            let manager = license_manager(&store, &client, policy)?;
            output::print_record(&manager.record());
        }
        Command::License(LicenseCommand::Check) => {
            let manager = license_manager(&store, &client, policy)?;
            let outcome = manager.ensure_fresh().await?;
            match &outcome.kind {
                CheckKind::NoCredential => println!("Not signed in; nothing to verify."),
                CheckKind::Fresh => println!("License verified recently; no check needed."),
                CheckKind::Verified => println!("License verified with the server."),
                CheckKind::Degraded { cause } => {
                    println!("Could not reach the license server: {cause}")
                }
            }
            output::print_record(&outcome.record);
        }
        Command::License(LicenseCommand::Ready) => {
            let readiness = LicenseSetup::new(Arc::clone(&client)).readiness().await?;
            output::print_readiness(&readiness);
        }
        Command::License(LicenseCommand::Setup { key }) => {
            let message = LicenseSetup::new(Arc::clone(&client)).submit(&key).await?;
            println!("{message}");
        }
        Command::Gate => {
            let manager = license_manager(&store, &client, policy)?;
            manager.ensure_fresh().await?;
            let gate = FeatureGate::new(manager, Arc::clone(&client));
            gate.refresh_assistant_key().await;
            output::print_decision(Feature::AiCleanup, &gate.decision(Feature::AiCleanup));
        }
    }

    Ok(())
}

fn license_manager(
    store: &Arc<dyn KeyValueStore>,
    client: &Arc<AuthClient>,
    policy: LicensePolicy,
) -> Result<Arc<LicenseManager>> {
    let authority = Arc::new(RemoteLicenseAuthority::new(Arc::clone(client)));
    let manager = LicenseManager::new(Arc::clone(store), authority, Arc::new(SystemClock), policy)
        .context("Failed to load license state")?;
    Ok(Arc::new(manager))
}
