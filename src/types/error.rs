//! Unified Error Type System
//!
//! Centralized error types for configuration resolution.
//!
//! ## Error Policies
//!
//! - **Recoverable**: the offending value is dropped and the field keeps its
//!   previous value (malformed `--port=` / `--wait=`)
//! - **Fatal**: startup aborts with a diagnostic (malformed JSON, regex,
//!   mimetypes, `ROUTE:PATH` pairs)

use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

// =============================================================================
// Error Policies
// =============================================================================

/// What resolution does when a value cannot be coerced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Leave the field unchanged and carry on
    Recoverable,
    /// Abort startup
    Fatal,
}

impl std::fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Recoverable => write!(f, "RECOVERABLE"),
            Self::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Kind of coercion that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoerceKind {
    /// Strict base-10 integer
    Integer,
    /// Regular expression source
    Pattern,
    /// Mimetypes JSON object
    MimeTypes,
    /// `ROUTE:TARGET` pair for mount and proxy
    RoutePair,
}

impl CoerceKind {
    /// Policy applied to failures of this kind
    pub fn policy(&self) -> ErrorPolicy {
        match self {
            Self::Integer => ErrorPolicy::Recoverable,
            Self::Pattern | Self::MimeTypes | Self::RoutePair => ErrorPolicy::Fatal,
        }
    }
}

// =============================================================================
// Coercion Error
// =============================================================================

/// A raw value that could not be converted for a named field
#[derive(Debug, Clone, Error)]
#[error("Invalid {field} value '{value}': {reason}")]
pub struct CoerceError {
    /// Option name the value was destined for
    pub field: &'static str,
    /// Which coercer rejected it
    pub kind: CoerceKind,
    /// Raw input
    pub value: String,
    /// Human-readable cause
    pub reason: String,
}

impl CoerceError {
    pub fn new(
        field: &'static str,
        kind: CoerceKind,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            field,
            kind,
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.kind.policy()
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum AliveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Coerce(#[from] CoerceError),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AliveError>;

/// Applies the [`ErrorPolicy`] of a coercion result
pub trait CoerceResultExt<T> {
    /// `Ok(Some)` on success, `Ok(None)` for recoverable failures,
    /// `Err` for fatal ones.
    fn or_recover(self) -> Result<Option<T>>;
}

impl<T> CoerceResultExt<T> for std::result::Result<T, CoerceError> {
    fn or_recover(self) -> Result<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.policy() == ErrorPolicy::Recoverable => {
                debug!(field = err.field, value = %err.value, "Ignoring {}", err.reason);
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
