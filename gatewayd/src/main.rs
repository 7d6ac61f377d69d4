mod cli;
mod handler;
mod logging;

use std::process::exit;
use std::sync::Arc;

use clap::Parser;
use mudgate_core::config::DaemonConfig;
use mudgate_core::telnet::handler::Registry;
use mudgate_core::{Listener, Manager};
use tracing::{error, info, instrument};

use handler::LoggingHandler;

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();
    logging::init(&args);

    if let Err(err) = run(&args).await {
        error!("{err}");
        exit(1);
    }
}

#[instrument(skip(args))]
async fn run(args: &cli::Args) -> Result<(), Box<dyn std::error::Error>> {
    info!(config = %args.config, "starting mudgated");

    let config: DaemonConfig = config::Config::builder()
        .add_source(config::File::with_name(&args.config).required(false))
        .build()?
        .try_deserialize()?;

    let manager = Manager::new();
    let gateway_handler: Arc<dyn mudgate_core::GatewayHandler> = Arc::new(LoggingHandler);

    let mut existing_names = Vec::new();
    let mut listeners = Vec::new();
    for listener_config in config.listeners {
        mudgate_core::config::validate_listener(&listener_config, &existing_names, &[])?;
        existing_names.push(listener_config.name.clone());

        let listener = Listener::bind(
            listener_config,
            manager.clone(),
            gateway_handler.clone(),
            default_registry,
        )
        .await?;
        listeners.push(listener);
    }

    if listeners.is_empty() {
        info!("no listeners configured, idling");
    }

    tokio::signal::ctrl_c().await?;
    info!("received ctrl-c, shutting down");
    Ok(())
}

/// Every accepted telnet session gets the full opt-in handler set; the
/// reference daemon doesn't expose per-listener handler selection.
fn default_registry() -> Registry {
    Registry::default().with_mccp3().with_mnes().with_gmcp().with_msdp()
}
