//! Gateway server

use std::sync::Arc;

use crate::common::{GatewayConfig, Result};
use crate::gateway::http::{create_router, GatewayState};
use crate::gateway::logic::{AddLogic, CheckLogic};
use crate::rpc::{AddClient, CheckClient};

pub struct Gateway {
    config: GatewayConfig,
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self { config }
    }

    pub async fn serve(self) -> Result<()> {
        tracing::info!("Starting bookstore gateway");
        tracing::info!("  HTTP API: {}", self.config.bind_addr);
        tracing::info!("  Add backend: {}", self.config.add_backend);
        tracing::info!("  Check backend: {}", self.config.check_backend);

        let timeout = self.config.request_timeout();
        let add_client = AddClient::connect(&self.config.add_backend, timeout)?;
        let check_client = CheckClient::connect(&self.config.check_backend, timeout)?;

        let state = GatewayState {
            add: Arc::new(AddLogic::new(Arc::new(add_client))),
            check: Arc::new(CheckLogic::new(Arc::new(check_client))),
        };
        let router = create_router(state)
            .into_make_service_with_connect_info::<std::net::SocketAddr>();

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!("✓ Gateway ready");

        axum::serve(listener, router)
            .await
            .map_err(crate::common::Error::Io)?;
        Ok(())
    }
}
