//! alive-server - Development Server Launcher
//!
//! Resolves the options of a live-reloading development server from up to
//! four sources and hands the result to the server exactly once.
//!
//! ## Resolution Order
//!
//! - **Defaults**: built-in values, host/port from `IP`/`PORT`
//! - **User file**: `~/.alive-server.json`
//! - **Project file**: `./.alive-server.json`
//! - **Flags**: `--name=value` tokens after the optional root directory
//!
//! ## Quick Start
//!
//! ```ignore
//! use alive_server::{PreviewServer, Resolution, Resolver};
//!
//! let resolver = Resolver::from_env()?;
//! if let Resolution::Start(launch) = resolver.resolve(&args)? {
//!     server.start(Arc::new(launch.config))?;
//! }
//! ```
//!
//! ## Modules
//!
//! - [`config`]: layers, flags, coercion and path normalization
//! - [`server`]: the `DevServer` boundary
//! - [`cli`]: help and version output

pub mod cli;
pub mod config;
pub mod constants;
pub mod server;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{
    Config, ConfigLoader, Launch, Mount, OpenTarget, Proxy, Resolution, Resolver, TerminalAction,
};

// Error Types
pub use types::error::{AliveError, CoerceError, ErrorPolicy, Result};

// Server
pub use server::{DevServer, PreviewServer, schedule_shutdown};
