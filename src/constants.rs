//! Global Constants
//!
//! Centralized constants for configuration resolution and the server hand-off.

/// Configuration file constants
pub mod config {
    /// File name looked up in both the home directory and the working directory
    pub const FILE_NAME: &str = ".alive-server.json";

    /// Default index file served for directory requests
    pub const DEFAULT_INDEX: &str = "index.html";
}

/// Server log verbosity levels
pub mod log_level {
    /// `--quiet` / `-q`
    pub const QUIET: u8 = 0;

    /// Built-in default
    pub const DEFAULT: u8 = 2;

    /// `--verbose` / `-V`
    pub const VERBOSE: u8 = 3;
}

/// Environment variables consulted for the built-in defaults
pub mod env {
    /// Default bind host
    pub const HOST: &str = "IP";

    /// Default listen port
    pub const PORT: &str = "PORT";
}

/// Diagnostic hooks
pub mod test_hook {
    /// Delay between `start()` and the scheduled `shutdown()` for `--test`
    pub const SHUTDOWN_DELAY_MS: u64 = 500;
}

/// Middleware names injected by flags
pub mod middleware {
    /// Single-page-application fallback, added by `--spa`
    pub const SPA: &str = "spa";
}
