//! Configuration Types
//!
//! The effective configuration handed to the server, plus the composite
//! value types it carries.

use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::constants::{config as config_constants, log_level};

/// MIME type to file extensions, e.g. `{"application/wasm": [".wasm"]}`
pub type MimeTypes = BTreeMap<String, Vec<String>>;

// =============================================================================
// Open Target
// =============================================================================

/// What the browser opens at startup
///
/// Each `--open=PATH` escalates the value one step:
/// `Enabled` → `Path` → `Paths` → `Paths` (appended).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OpenTarget {
    /// Open the root (`true`) or nothing (`false`)
    Enabled(bool),
    /// Open a single path
    Path(String),
    /// Open several paths, one tab each
    Paths(Vec<String>),
}

impl Default for OpenTarget {
    fn default() -> Self {
        Self::Enabled(true)
    }
}

impl OpenTarget {
    /// Accumulate one more path; never shrinks a `Paths` list
    pub fn push(self, path: impl Into<String>) -> Self {
        let path = path.into();
        match self {
            Self::Enabled(_) => Self::Path(path),
            Self::Path(first) => Self::Paths(vec![first, path]),
            Self::Paths(mut paths) => {
                paths.push(path);
                Self::Paths(paths)
            }
        }
    }

    /// True when the browser is not launched at all
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Enabled(false))
    }
}

// =============================================================================
// Route Pairs
// =============================================================================

/// Static directory served under a route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, PathBuf)", into = "(String, PathBuf)")]
pub struct Mount {
    pub route: String,
    pub path: PathBuf,
}

impl From<(String, PathBuf)> for Mount {
    fn from((route, path): (String, PathBuf)) -> Self {
        Self { route, path }
    }
}

impl From<Mount> for (String, PathBuf) {
    fn from(mount: Mount) -> Self {
        (mount.route, mount.path)
    }
}

/// Requests under `prefix` forwarded to `target`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Proxy {
    pub prefix: String,
    /// Opaque, usually a URL
    pub target: String,
}

impl From<(String, String)> for Proxy {
    fn from((prefix, target): (String, String)) -> Self {
        Self { prefix, target }
    }
}

impl From<Proxy> for (String, String) {
    fn from(proxy: Proxy) -> Self {
        (proxy.prefix, proxy.target)
    }
}

// =============================================================================
// Effective Configuration
// =============================================================================

/// Fully resolved server options
///
/// Built once per invocation by [`super::Resolver`] and shared immutably
/// (behind an `Arc`) with the server from then on.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory to serve (the positional argument, `""` when absent)
    pub root: PathBuf,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,

    pub open: OpenTarget,

    /// Browser executables to launch, in preference order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<Vec<String>>,

    /// Paths to watch; joined onto `root` once it is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch: Option<Vec<PathBuf>>,

    /// Paths excluded from watching; joined onto `root` once it is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore: Option<Vec<PathBuf>>,

    #[serde(
        serialize_with = "serialize_pattern",
        skip_serializing_if = "Option::is_none"
    )]
    pub ignore_pattern: Option<Regex>,

    pub no_css_inject: bool,

    /// Served instead of 404 responses
    #[serde(rename = "file", skip_serializing_if = "Option::is_none")]
    pub entry_file: Option<String>,

    pub mount: Vec<Mount>,

    pub proxy: Vec<Proxy>,

    pub middleware: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mimetypes: Option<MimeTypes>,

    pub index: String,

    /// 0 = errors only, 2 = default, 3 = verbose
    pub log_level: u8,

    /// Milliseconds to wait before reloading after a change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub htpasswd: Option<String>,

    pub cors: bool,

    /// Path to an HTTPS configuration module
    #[serde(skip_serializing_if = "Option::is_none")]
    pub https: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub https_module: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            host: None,
            port: None,
            open: OpenTarget::default(),
            browser: None,
            watch: None,
            ignore: None,
            ignore_pattern: None,
            no_css_inject: false,
            entry_file: None,
            mount: Vec::new(),
            proxy: Vec::new(),
            middleware: Vec::new(),
            mimetypes: None,
            index: config_constants::DEFAULT_INDEX.to_string(),
            log_level: log_level::DEFAULT,
            wait: None,
            htpasswd: None,
            cors: false,
            https: None,
            https_module: None,
        }
    }
}

fn serialize_pattern<S: Serializer>(
    pattern: &Option<Regex>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match pattern {
        Some(regex) => serializer.serialize_str(regex.as_str()),
        None => serializer.serialize_none(),
    }
}
