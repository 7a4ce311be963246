use std::{io, path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use dispatch::{pump_input, Engine, EngineHandle};
use gateway::HttpActuatorGateway;
use server::PresentationServer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod terminal;

use config::load_settings;
use terminal::{crlf_stderr, RawModeGuard};

const BANNER: &str = "Electric Imp Interface: Enter /web or /cli to choose an interface module.";

#[derive(Parser, Debug)]
#[command(about = "Drive a remote LED from raw keystrokes or a small web page")]
struct Args {
    /// TOML settings file; `bridge.toml` is used when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_filter: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(crlf_stderr)
        .init();

    let code = match run(args).await {
        Ok(()) => 0,
        Err(error) => {
            error!("{error:#}");
            1
        }
    };
    // the blocking stdin reader never finishes on its own, so don't wait for runtime shutdown
    std::process::exit(code);
}

async fn run(args: Args) -> Result<()> {
    let settings = load_settings(args.config.as_deref())?;
    let gateway = HttpActuatorGateway::new(settings.gateway_config()?)?;
    info!(endpoint = %gateway.endpoint(), "actuator gateway ready");

    let (handle, events) = EngineHandle::channel();
    let web = PresentationServer::new(settings.server_config()?, handle.clone());
    let engine = Engine::new(
        Arc::new(gateway),
        Arc::new(web),
        Box::new(io::stdout()),
        settings.debounce_timings(),
    );

    let _raw_mode = match RawModeGuard::enable() {
        Ok(guard) => Some(guard),
        Err(error) => {
            warn!(%error, "raw terminal mode unavailable; input is line buffered");
            None
        }
    };
    print!("{BANNER}\r\n");

    let pump = tokio::spawn(pump_input(tokio::io::stdin(), handle));
    let outcome = engine.run(events).await;
    pump.abort();
    outcome?;
    Ok(())
}
