//! Preview server: reports what would be served and waits to be stopped.

use std::sync::{Arc, OnceLock};

use tokio::sync::Notify;
use tracing::info;

use super::DevServer;
use crate::config::Config;
use crate::types::{AliveError, Result};

/// Prints the effective configuration as JSON on start
#[derive(Debug, Default)]
pub struct PreviewServer {
    config: OnceLock<Arc<Config>>,
    stopped: Notify,
}

impl PreviewServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective configuration as pretty JSON
    pub fn render(config: &Config) -> Result<String> {
        Ok(serde_json::to_string_pretty(config)?)
    }

    /// Configuration received by `start`, if any
    pub fn config(&self) -> Option<&Arc<Config>> {
        self.config.get()
    }

    /// Resolves once `shutdown` has been called
    pub async fn stopped(&self) {
        self.stopped.notified().await;
    }
}

impl DevServer for PreviewServer {
    fn start(&self, config: Arc<Config>) -> Result<()> {
        let rendered = Self::render(&config)?;
        let root = config.root.display().to_string();
        self.config
            .set(config)
            .map_err(|_| AliveError::Config("server already started".to_string()))?;

        println!("{}", rendered);
        info!(root = %root, "Preview server started");
        Ok(())
    }

    fn shutdown(&self) {
        info!("Preview server stopped");
        self.stopped.notify_one();
    }
}
