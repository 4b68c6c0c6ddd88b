use std::path::PathBuf;

use ::tracing::{error, info_span};
use clap::Parser;
use service::Service;

mod config;
mod facade;
mod http_objects;
mod routes;
mod service;
mod tracing;
use tracing::setup_tracing;

#[cfg(test)]
mod testing;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(short, long, value_name = "config file", help = "Path to config file")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match cli.config {
        Some(path) => config::ServerConfig::from_path(&path)?,
        None => config::ServerConfig::from_env()?,
    };

    setup_tracing(&config);

    let root_span = info_span!("storage-service", listen_addr = %config.listen_addr);
    let _guard = root_span.enter();

    let service = match Service::new(config).await {
        Ok(service) => service,
        Err(err) => {
            error!("Error creating service: {:?}", err);
            return Err(err);
        }
    };
    if let Err(err) = service.start().await {
        error!("Error starting service: {:?}", err);
        return Err(err);
    }
    Ok(())
}
