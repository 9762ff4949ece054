//! @ai:module:intent Define error types for the asti extraction pipeline
//! @ai:module:layer domain
//! @ai:module:public_api Error, Result
//! @ai:module:stateless true

use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Unified error type for all extraction and resolution operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("package path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Recoverable: the module stage degrades to the absolute package path.
    #[error("module declaration not found walking up from {0}")]
    ModuleNotFound(PathBuf),

    #[error("failed to parse {file}:{line}: {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },

    #[error("validation failed for interface {interface}: method {method} at {file}:{line}: {message}")]
    Validation {
        interface: String,
        method: String,
        file: String,
        line: usize,
        message: String,
    },

    #[error("package path is required")]
    EmptyPackagePath,

    #[error("interface {0} has an empty ID")]
    EmptyInterfaceId(String),

    #[error("duplicate interface ID: {0}")]
    DuplicateInterfaceId(String),

    #[error("method {method} in interface {interface} has an empty ID")]
    EmptyMethodId { interface: String, method: String },

    #[error("duplicate method ID {method} in interface {interface}")]
    DuplicateMethodId { interface: String, method: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;
