//! Configuration Management
//!
//! Layered configuration with resolution in this order:
//! 1. Built-in defaults (host/port from `IP`/`PORT`)
//! 2. User config (~/.alive-server.json)
//! 3. Project config (./.alive-server.json)
//! 4. Command-line flags (highest priority for scalars)
//! 5. `watch`/`ignore` paths joined onto the served root

pub mod coerce;
pub mod flags;
pub mod layer;
mod loader;
pub mod paths;
mod resolver;
mod types;

pub use flags::{Flag, FlagSet, Invocation, TerminalAction};
pub use layer::{ConfigLayer, EnvDefaults};
pub use loader::ConfigLoader;
pub use resolver::{Launch, Resolution, Resolver};
pub use types::*;
