//! Error types for Farscan.
//!
//! This module provides a unified error handling approach using `thiserror`.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for Farscan operations.
pub type Result<T> = std::result::Result<T, FarError>;

/// Errors that can occur while decoding FAR3D output.
#[derive(Debug, Error)]
pub enum FarError {
    /// A required input file does not exist.
    #[error("Missing file: {path}")]
    MissingFile { path: PathBuf },

    /// Failed to open a file that exists.
    #[error("Failed to open file: {path}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stream ended before a record was complete.
    #[error("Unexpected end of input after line {line} while reading {context}")]
    UnexpectedEof { context: String, line: usize },

    /// A token could not be parsed as the expected type.
    #[error("Line {line}: cannot parse '{token}' as {expected} ({context})")]
    Parse {
        context: String,
        line: usize,
        token: String,
        expected: &'static str,
    },

    /// Column count disagrees with the mode header.
    #[error("Column mismatch in {context}: expected {expected} columns, found {found}")]
    ColumnMismatch {
        context: String,
        expected: usize,
        found: usize,
    },

    /// Two arrays that must agree in shape do not.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A namelist field has no value at encode time.
    #[error("Namelist field '{name}' has no value")]
    MissingField { name: String },

    /// A namelist field holds a value of the wrong kind.
    #[error("Namelist field '{name}' expects {expected}")]
    FieldType { name: String, expected: String },

    /// A positional decode consumed the wrong number of values.
    #[error("Line {line}: {message}")]
    Desynchronized { line: usize, message: String },

    /// Scan directory layout is not usable.
    #[error("Invalid scan: {0}")]
    InvalidScan(String),

    /// Failed to write or read back a NetCDF file.
    #[error("NetCDF error: {0}")]
    NetCdf(String),

    /// A code path that is deliberately not available.
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ndarray shape error.
    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

impl From<netcdf::Error> for FarError {
    fn from(err: netcdf::Error) -> Self {
        Self::NetCdf(err.to_string())
    }
}

impl FarError {
    /// Map an open failure to `MissingFile` or `FileOpen`.
    pub fn file_open(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::MissingFile {
                path: path.to_path_buf(),
            }
        } else {
            Self::FileOpen {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Create an UnexpectedEof error.
    pub fn eof(context: impl Into<String>, line: usize) -> Self {
        Self::UnexpectedEof {
            context: context.into(),
            line,
        }
    }

    /// Create a Parse error.
    pub fn parse(
        context: impl Into<String>,
        line: usize,
        token: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Self::Parse {
            context: context.into(),
            line,
            token: token.into(),
            expected,
        }
    }

    /// Create an InvalidScan error.
    pub fn invalid_scan(message: impl Into<String>) -> Self {
        Self::InvalidScan(message.into())
    }

    /// True when the error is a missing input file, the only kind a scan may skip.
    pub fn is_missing_file(&self) -> bool {
        matches!(self, Self::MissingFile { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::FarError;
    use std::path::Path;

    #[test]
    fn not_found_maps_to_missing_file() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = FarError::file_open(Path::new("case/farprt"), io);
        assert!(err.is_missing_file());
        assert_eq!(err.to_string(), "Missing file: case/farprt");
    }

    #[test]
    fn permission_error_is_not_skippable() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no");
        let err = FarError::file_open(Path::new("x"), io);
        assert!(!err.is_missing_file());
    }
}
