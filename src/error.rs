//! Global error handling for txtdump
//!
//! One error type for the orchestration layer. The Godot compactor has no
//! failure surface of its own and never produces these.

use std::io;
use thiserror::Error;

/// Global error type for txtdump operations
#[derive(Error, Debug)]
pub enum TxtDumpError {
    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON processing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Directory walking errors
    #[error("Scanner error: {0}")]
    Scanner(String),

    /// Per-file conversion errors
    #[error("Converter error: {0}")]
    Converter(String),

    /// Path not found
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Run stopped by the user
    #[error("Interrupted")]
    Interrupted,
}

/// Specialized Result type for txtdump operations
pub type Result<T> = std::result::Result<T, TxtDumpError>;

impl From<walkdir::Error> for TxtDumpError {
    fn from(err: walkdir::Error) -> Self {
        TxtDumpError::Scanner(err.to_string())
    }
}

impl From<ignore::Error> for TxtDumpError {
    fn from(err: ignore::Error) -> Self {
        TxtDumpError::Scanner(err.to_string())
    }
}

/// Creates a TxtDumpError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::TxtDumpError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

/// Extension trait for adding context to errors
pub trait ResultExt<T, E> {
    /// Add additional context to an error
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display;
}

impl<T, E: std::error::Error + 'static> ResultExt<T, E> for std::result::Result<T, E> {
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display,
    {
        self.map_err(|e| {
            let context = f();
            TxtDumpError::Converter(format!("{}: {}", context, e))
        })
    }
}

impl From<TxtDumpError> for io::Error {
    fn from(err: TxtDumpError) -> Self {
        io::Error::new(io::ErrorKind::Other, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(value: usize) -> Result<usize> {
        crate::ensure!(value < 10, InvalidArgument, "value {} too large", value);
        Ok(value)
    }

    #[test]
    fn test_ensure_macro() {
        assert_eq!(check(3).unwrap(), 3);
        let err = check(12).unwrap_err();
        assert_eq!(err.to_string(), "Invalid argument: value 12 too large");
    }

    #[test]
    fn test_with_context() {
        let failed: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let err = failed.with_context(|| "reading a.txt").unwrap_err();
        assert_eq!(err.to_string(), "Converter error: reading a.txt: gone");
    }
}
