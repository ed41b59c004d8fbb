//! Resolution Pipeline
//!
//! defaults → user file → project file → CLI flags → path normalization

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use super::flags::{Invocation, TerminalAction};
use super::layer::EnvDefaults;
use super::loader::ConfigLoader;
use super::paths;
use super::types::Config;
use crate::constants::test_hook;
use crate::types::Result;

/// Outcome of resolving one invocation
#[derive(Debug)]
pub enum Resolution {
    /// Hand the configuration to the server
    Start(Launch),
    /// Print help or version and exit
    Terminal(TerminalAction),
}

/// Everything the server boundary needs
#[derive(Debug)]
pub struct Launch {
    pub config: Config,
    /// Set by `--test`: call `shutdown()` this long after `start()`
    pub shutdown_after: Option<Duration>,
}

/// Resolves command-line arguments into a [`Resolution`]
#[derive(Debug, Clone)]
pub struct Resolver {
    loader: ConfigLoader,
    cwd: PathBuf,
    env: EnvDefaults,
}

impl Resolver {
    pub fn new(cwd: impl Into<PathBuf>, home: Option<PathBuf>, env: EnvDefaults) -> Self {
        let cwd = cwd.into();
        Self {
            loader: ConfigLoader::new(home, cwd.clone()),
            cwd,
            env,
        }
    }

    /// Resolver for the running process
    pub fn from_env() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Ok(Self::new(
            cwd,
            ConfigLoader::home_dir(),
            EnvDefaults::from_process(),
        ))
    }

    /// Resolve the arguments that follow the program name
    ///
    /// Terminal flags short-circuit before any config file is read.
    pub fn resolve<S: AsRef<str>>(&self, args: &[S]) -> Result<Resolution> {
        let invocation = Invocation::parse(args);
        if let Some(action) = invocation.flags.terminal() {
            return Ok(Resolution::Terminal(action));
        }

        let mut config = self.loader.load(&self.env)?.into_config()?;
        invocation.flags.apply(&mut config, &self.cwd)?;

        config.root = invocation.root_path();
        paths::normalize_watch_paths(&mut config);
        debug!("Resolved configuration for root '{}'", config.root.display());

        let shutdown_after = invocation
            .flags
            .shutdown_requested()
            .then(|| Duration::from_millis(test_hook::SHUTDOWN_DELAY_MS));

        Ok(Resolution::Start(Launch {
            config,
            shutdown_after,
        }))
    }
}
