//! Module wiring: repositories, realtime publisher, service, client and routes

use crate::api::native::NativeClient;
use crate::config::Config;
use crate::contract::PosApi;
use crate::domain::realtime::{ChannelManager, RealtimePublisher};
use crate::domain::{Repositories, Service};
use anyhow::Result;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// POS service module
pub struct PosServiceModule {
    service: Arc<Service>,
    channels: ChannelManager,
}

impl PosServiceModule {
    /// Build the module over a database connection
    pub fn init(config: Config, db: Arc<DatabaseConnection>) -> Self {
        let repos = crate::infra::storage::repositories(db);
        let module = Self::with_repositories(config, repos);
        tracing::info!("POS service initialized");
        module
    }

    /// Build the module over caller-supplied storage
    pub fn with_repositories(config: Config, repos: Repositories) -> Self {
        let channels = ChannelManager::new(config.realtime.clone());
        let publisher = Arc::new(RealtimePublisher::new(channels.clone()));
        let service = Arc::new(Service::new(repos, publisher, config));
        Self { service, channels }
    }

    /// Apply pending schema migrations
    pub async fn migrate(db: &DatabaseConnection) -> Result<()> {
        use crate::infra::storage::migrations::Migrator;
        use sea_orm_migration::MigratorTrait;

        Migrator::up(db, None).await?;
        tracing::info!("POS service migrations completed");
        Ok(())
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    pub fn channels(&self) -> ChannelManager {
        self.channels.clone()
    }

    /// In-process client sharing this module's service and channels
    pub fn client(&self) -> Arc<dyn PosApi> {
        Arc::new(NativeClient::new(self.service.clone(), self.channels.clone()))
    }

    /// End realtime streams so open connections can drain
    pub fn shutdown(&self) {
        self.channels.close();
        tracing::info!("POS service stopped");
    }

    /// REST routes, mounted at the root
    pub fn router(&self) -> axum::Router {
        tracing::info!("Registering POS service REST routes");
        crate::api::rest::routes::register_routes(
            axum::Router::new(),
            self.service.clone(),
            self.channels.clone(),
        )
    }
}
