//! `relay-config`: administrative host for the relay's configuration.
//!
//! Runs the same startup and request path the CI server runs, from the
//! command line: initialise the config file (create, migrate or load), then
//! optionally apply one request built from `KEY=VALUE` arguments.
//!
//! # Usage
//!
//! ```text
//! relay-config [OPTIONS] [KEY=VALUE]...
//!
//! Options:
//!   --config-dir   <DIR>   Directory holding hipchat.toml [default: .]
//!   --timeout-secs <SECS>  Connectivity check timeout [default: 10]
//!   --show                 Print the settled configuration
//! ```
//!
//! # Examples
//!
//! ```text
//! relay-config edit= apiUrl=https://api.hipchat.com/v2/ apiToken=abc defaultRoomId=42 notify=true
//! relay-config test= apiUrl=https://api.hipchat.com/v2/ apiToken=abc
//! relay-config action=disable --show
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                       | Default | Description                 |
//! |--------------------------------|---------|-----------------------------|
//! | `HIPCHAT_CONFIG_DIR`           | `.`     | Config directory            |
//! | `HIPCHAT_CONNECTIVITY_TIMEOUT` | `10`    | Check timeout (secs)        |
//! | `RUST_LOG`                     | `info`  | `tracing` filter            |

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hipchat_config::application::request::{ConfigRequest, RequestOutcome};
use hipchat_config::application::shared_configuration::SharedConfiguration;
use hipchat_config::infrastructure::connectivity::HipChatConnectivityChecker;
use hipchat_config::infrastructure::controller::ConfigurationController;
use hipchat_core::{ConfigurationModel, ControllerSettings, HostPaths};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Inspect and edit the HipChat relay configuration.
#[derive(Debug, Parser)]
#[command(
    name = "relay-config",
    about = "Load, migrate and edit the HipChat relay configuration file",
    version
)]
struct Cli {
    /// Directory containing `hipchat.toml`.
    #[arg(long, default_value = ".", env = "HIPCHAT_CONFIG_DIR")]
    config_dir: PathBuf,

    /// Upper bound for the connectivity check, in seconds.
    #[arg(long, default_value_t = 10, env = "HIPCHAT_CONNECTIVITY_TIMEOUT")]
    timeout_secs: u64,

    /// Print the configuration after initialisation and the request.
    #[arg(long)]
    show: bool,

    /// Request parameters, e.g. `edit=` `apiUrl=https://api.hipchat.com/v2/`.
    #[arg(value_name = "KEY=VALUE")]
    params: Vec<String>,
}

impl Cli {
    /// Builds the request bag from the positional parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if a parameter has no `=` or an empty key.
    fn request(&self) -> anyhow::Result<ConfigRequest> {
        let mut request = ConfigRequest::new();
        for param in &self.params {
            let Some((key, value)) = param.split_once('=') else {
                bail!("parameter {param:?} is not KEY=VALUE");
            };
            if key.is_empty() {
                bail!("parameter {param:?} has an empty key");
            }
            request.insert(key, value);
        }
        Ok(request)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let request = cli.request()?;

    let checker = HipChatConnectivityChecker::new().context("failed to build HTTP client")?;
    let configuration = SharedConfiguration::default();
    let controller = ConfigurationController::new(
        &HostPaths::new(&cli.config_dir),
        configuration.clone(),
        Arc::new(checker),
        ControllerSettings {
            connectivity_timeout: Duration::from_secs(cli.timeout_secs),
        },
    );

    let outcome = controller.initialise();
    info!(path = %controller.store().path().display(), ?outcome, "configuration ready");

    if !request.is_empty() {
        let mut response = RequestOutcome::new();
        controller.handle_request(&request, &mut response).await;
        if let Some(status) = response.status {
            println!("status: {status}");
        }
        for (key, text) in &response.messages {
            println!("{key}: {text}");
        }
    }

    if cli.show {
        print_configuration(&configuration.snapshot());
    }
    Ok(())
}

fn print_configuration(model: &ConfigurationModel) {
    println!("apiUrl        = {}", model.api_url());
    println!(
        "apiToken      = {}",
        if model.api_token().is_some() { "<set>" } else { "<none>" }
    );
    println!("defaultRoomId = {}", model.default_room_id().unwrap_or("<none>"));
    println!("notify        = {}", model.notify_status());
    println!("disabled      = {}", model.disabled_status());
    for project in model.project_configurations() {
        println!(
            "project {:<12} room = {}, notify = {}",
            project.project_id(),
            project.room_id(),
            project.notify_status()
        );
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
