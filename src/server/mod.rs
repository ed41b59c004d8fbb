//! Server Boundary
//!
//! The HTTP server, file watching and browser launch live behind
//! [`DevServer`]. Resolution hands it the final configuration exactly once.
//!
//! ## Modules
//!
//! - `preview`: prints the effective configuration instead of serving

mod preview;

pub use preview::PreviewServer;

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::Config;
use crate::types::Result;

/// External development server
pub trait DevServer: Send + Sync {
    /// Start serving with the resolved, immutable configuration
    fn start(&self, config: Arc<Config>) -> Result<()>;

    /// Stop serving; called at most once
    fn shutdown(&self);
}

/// Call `shutdown()` after `delay` without blocking the caller
pub fn schedule_shutdown(server: Arc<dyn DevServer>, delay: Duration) -> JoinHandle<()> {
    debug!("Scheduling shutdown in {:?}", delay);
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        server.shutdown();
    })
}
