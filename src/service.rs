use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum_server::Handle;
use caching::build_cache;
use storage_provider::build_providers;
use tokio::signal;
use tracing::{error, info};

use crate::{
    config::ServerConfig,
    facade::StorageFacade,
    routes::{create_routes, RouteState},
};

pub struct Service {
    pub config: ServerConfig,
    pub facade: Arc<StorageFacade>,
}

impl Service {
    pub async fn new(config: ServerConfig) -> Result<Self> {
        let providers = build_providers(&config.storage)
            .await
            .context("error initializing storage backends")?;
        let cache = build_cache(&config.cache).context("error initializing cache")?;
        let facade = Arc::new(StorageFacade::new(
            providers,
            cache,
            config.cache.ttl(),
            config.storage.ignore_delete_errors,
        ));
        Ok(Self { config, facade })
    }

    pub async fn start(&self) -> Result<()> {
        let handle = Handle::new();
        let handle_sh = handle.clone();
        tokio::spawn(async move {
            shutdown_signal(handle_sh).await;
            info!("graceful shutdown signal received, shutting down server gracefully");
        });

        let addr: SocketAddr = self.config.listen_addr.parse()?;
        info!("server api listening on {}", self.config.listen_addr);
        let routes = create_routes(RouteState {
            facade: self.facade.clone(),
        });
        axum_server::bind(addr)
            .handle(handle)
            .serve(routes.into_make_service())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {:?}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to install signal handler: {:?}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
        },
        _ = terminate => {
        },
    }
    handle.shutdown();
    info!("signal received, shutting down server gracefully");
}
