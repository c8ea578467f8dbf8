//! CLI entry point for the Dev Auth harness.

pub mod auth;

use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::auth::AuthSession;
use crate::backend::{PlatformBackend, SimulatedBackend};
use crate::config::HarnessConfig;
use crate::error::HarnessError;

/// Dev Auth login harness
#[derive(Parser, Debug)]
#[command(
    name = "eos-auth-tool",
    version,
    about = "Dev Auth login harness",
    arg_required_else_help = true,
    after_help = "Example:\n  eos-auth-tool login localhost:6547 testuser1"
)]
pub struct Cli {
    #[command(flatten)]
    pub platform: PlatformArgs,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in through the Dev Auth tool
    Login(LoginArgs),
    /// Log out the current account
    Logout,
    /// Show login state and token validity
    Status(StatusArgs),
    /// Refresh the token snapshot
    Refresh,
}

/// Arguments for `eos-auth-tool login`.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Dev Auth tool address (host:port)
    pub host: String,
    /// Credential name registered in the Dev Auth tool
    pub credential_name: String,
}

/// Arguments for `eos-auth-tool status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print the status as JSON
    #[arg(long)]
    pub json: bool,
}

/// Platform and polling overrides shared by every command.
#[derive(Args, Debug, Default)]
pub struct PlatformArgs {
    /// Config file (default: ~/.eos-auth/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub product_id: Option<String>,

    #[arg(long, global = true)]
    pub sandbox_id: Option<String>,

    #[arg(long, global = true)]
    pub deployment_id: Option<String>,

    /// Completion checks before giving up
    #[arg(long, global = true)]
    pub poll_attempts: Option<u32>,

    /// Sleep between completion checks
    #[arg(long, global = true)]
    pub poll_interval_ms: Option<u64>,
}

impl PlatformArgs {
    /// Apply flag overrides on top of a loaded config.
    pub fn apply(&self, config: &mut HarnessConfig) {
        if let Some(id) = &self.product_id {
            config.product_id = id.clone();
        }
        if let Some(id) = &self.sandbox_id {
            config.sandbox_id = id.clone();
        }
        if let Some(id) = &self.deployment_id {
            config.deployment_id = id.clone();
        }
        if let Some(attempts) = self.poll_attempts {
            config.poll.max_attempts = attempts;
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll.interval = Duration::from_millis(ms);
        }
    }
}

/// Resolve config, initialize the platform and run one command.
pub async fn run(cli: Cli) -> Result<(), HarnessError> {
    run_with_backend(cli, Rc::new(SimulatedBackend::new())).await
}

/// Same as [`run`] against a caller-supplied backend.
pub async fn run_with_backend(
    cli: Cli,
    backend: Rc<dyn PlatformBackend>,
) -> Result<(), HarnessError> {
    let config = HarnessConfig::load(cli.platform.config.as_deref())?;
    execute(cli, config, backend).await
}

/// Same as [`run_with_backend`], taking environment overrides from `env`
/// instead of the process environment.
pub async fn run_with_env(
    cli: Cli,
    backend: Rc<dyn PlatformBackend>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<(), HarnessError> {
    let config = HarnessConfig::load_with_env(cli.platform.config.as_deref(), env)?;
    execute(cli, config, backend).await
}

async fn execute(
    cli: Cli,
    mut config: HarnessConfig,
    backend: Rc<dyn PlatformBackend>,
) -> Result<(), HarnessError> {
    cli.platform.apply(&mut config);
    config.validate()?;

    let mut session = AuthSession::new(backend)
        .with_initialize_options(config.initialize_options())
        .with_client_credentials(config.client_credentials());
    session.initialize(&config.product_id, &config.sandbox_id, &config.deployment_id)?;

    let result = match cli.command {
        Commands::Login(args) => auth::handle_login(&session, &args, config.poll).await,
        Commands::Logout => auth::handle_logout(&session, config.poll).await,
        Commands::Status(args) => auth::handle_status(&session, &args),
        Commands::Refresh => auth::handle_refresh(&session),
    };

    session.shutdown();
    result
}
