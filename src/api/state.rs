// src/api/state.rs
use crate::chart::ChartLoader;
use crate::client::{JobServiceClient, JobSource};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::poller::{Poller, SharedTable, ViewerPresence};
use crate::table::JobTable;
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub source: Arc<dyn JobSource>,
    pub table: SharedTable,
    pub presence: Arc<ViewerPresence>,
    pub charts: Arc<ChartLoader>,
}

impl AppState {
    /// Builds the state around an HTTP client for the configured job service.
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = JobServiceClient::new(Client::new(), &config.upstream, config.csrf_signer())?;
        Ok(Self::with_source(config, Arc::new(client)))
    }

    pub fn with_source(config: AppConfig, source: Arc<dyn JobSource>) -> Self {
        let table = JobTable::new(config.table_options());
        Self {
            presence: Arc::new(ViewerPresence::new(config.always_visible)),
            table: Arc::new(RwLock::new(table)),
            charts: Arc::new(ChartLoader::new(source.clone())),
            config: Arc::new(config),
            source,
        }
    }

    pub fn poller(&self) -> Poller {
        Poller::new(
            self.source.clone(),
            self.table.clone(),
            self.presence.clone(),
            self.config.poll_interval(),
        )
    }
}
