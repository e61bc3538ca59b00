//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use focus_core::auth::{Credentials, RegistrationRequest};
use focus_core::{config, logging};

mod commands;

pub use commands::auth::FlowFailed;

#[derive(Parser)]
#[command(name = "focus")]
#[command(version)]
#[command(about = "Sign in to or register with a Focus backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend origin, e.g. http://192.168.1.10:8080 (overrides FOCUS_BASE_URL and config)
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Sign in with email and password
    Signin {
        /// Account email
        #[arg(long)]
        email: Option<String>,

        /// Account password
        #[arg(long, env = "FOCUS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create a new account
    Register {
        /// Display name for the new account
        #[arg(long)]
        username: Option<String>,

        /// Account email
        #[arg(long)]
        email: Option<String>,

        /// Account password
        #[arg(long, env = "FOCUS_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Password again; checked locally and never sent
        #[arg(long, env = "FOCUS_CONFIRM_PASSWORD", hide_env_values = true)]
        confirm_password: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config { command } => match command {
            ConfigCommands::Path => commands::config::path(),
            ConfigCommands::Init => commands::config::init(),
        },
        Commands::Signin { email, password } => {
            let credentials = Credentials::new(email.unwrap_or_default(), password.unwrap_or_default());
            run_flow(cli.base_url.as_deref(), |base_url| {
                commands::auth::sign_in(base_url, credentials)
            })
        }
        Commands::Register {
            username,
            email,
            password,
            confirm_password,
        } => {
            let request = RegistrationRequest {
                username: username.unwrap_or_default(),
                email: email.unwrap_or_default(),
                password: password.unwrap_or_default(),
                confirm_password: confirm_password.unwrap_or_default(),
            };
            run_flow(cli.base_url.as_deref(), |base_url| {
                commands::auth::register(base_url, request)
            })
        }
    }
}

/// Loads config, installs logging and drives one flow on a fresh runtime.
fn run_flow<F, Fut>(base_url_override: Option<&str>, flow: F) -> Result<()>
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let config = config::Config::load()?;
    let _log_guard = logging::init(&config.log)?;
    let base_url = config.effective_base_url(base_url_override)?;

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    let result = rt.block_on(flow(base_url));
    // An abandoned stdin read keeps its blocking thread parked until input arrives.
    rt.shutdown_background();
    result
}
