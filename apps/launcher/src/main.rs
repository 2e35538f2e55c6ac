//! Launch screen for grantflow.
//!
//! Plays a scenario file against a scripted device: waits the launch delay,
//! asks for the scenario's capabilities, and either continues to the main
//! screen or exits.
//!
//! # Environment Variables
//!
//! - `GRANTFLOW_LOG`: tracing filter directives (default `info`)

mod scenario;
mod screen;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use grantflow::{load_or_create_config, Orchestrator};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scenario::Scenario;
use screen::Destination;

#[derive(Parser, Debug)]
#[command(name = "launcher")]
#[command(version, about, long_about = None)]
struct Args {
    /// Scenario file (JSON)
    scenario: PathBuf,

    /// Directory holding grantflow.json and persisted session state
    #[arg(long, default_value = ".grantflow")]
    config_dir: PathBuf,

    /// Override the scenario's launch delay
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.debug);

    let config = load_or_create_config(&args.config_dir)?;
    let scenario = Scenario::load(&args.scenario)?;
    let env = Arc::new(scenario.environment()?);
    let orchestrator = Orchestrator::from_config(&config, &args.config_dir, env);
    let session = scenario.session_config(&config)?;

    let delay = Duration::from_millis(args.delay_ms.unwrap_or(scenario.launch_delay_ms));
    tracing::info!(app_name = %scenario.app_name, ?delay, "launch screen shown");

    match screen::run(&orchestrator, session, delay).await? {
        Destination::MainScreen => {
            println!("continue to main screen");
            Ok(ExitCode::SUCCESS)
        }
        Destination::Exit => {
            println!("exit");
            Ok(ExitCode::from(1))
        }
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("GRANTFLOW_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
