//! Unified error type for the seedcache library.
//!
//! The cache core itself never fails: misses, gated updates, and empty
//! inputs are all expressed as data, not errors. What remains fallible is
//! construction (parameter validation) and the diagnostics surface
//! (writing a stats dump). Library code uses `CacheError`; the probe
//! binary and config-file loading use `anyhow::Result` for convenience.

use std::fmt;
use std::path::PathBuf;

/// Unified error type for the seedcache library.
#[derive(Debug)]
pub enum CacheError {
    /// Validation error (invalid construction parameters).
    Validation(String),

    /// I/O error with path context, from the diagnostics surface.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: std::io::Error,
    },
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Validation(msg) => write!(f, "Validation error: {}", msg),
            CacheError::Io {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "I/O error during {} on '{}': {}",
                    operation,
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::Io {
            path: PathBuf::new(),
            operation: "unknown",
            source: err,
        }
    }
}

/// Convenience type alias for Results using CacheError.
pub type Result<T> = std::result::Result<T, CacheError>;

// ============================================================================
// Helper constructors
// ============================================================================

impl CacheError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        CacheError::Validation(msg.into())
    }

    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, operation: &'static str, source: std::io::Error) -> Self {
        CacheError::Io {
            path: path.into(),
            operation,
            source,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
