//! Error types for RendezKV
//!
//! Two families of errors live here:
//! - [`KvError`]: failures that end a connection, the engine, or the process
//! - [`ParseError`]: bad request lines, answered in-band and never fatal

use thiserror::Error;

/// Result type alias using KvError
pub type Result<T> = std::result::Result<T, KvError>;

/// Unified error type for RendezKV operations
#[derive(Debug, Error)]
pub enum KvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Storage Engine Errors
    // -------------------------------------------------------------------------
    #[error("storage engine is not running")]
    EngineUnavailable,

    #[error("storage engine thread panicked")]
    EnginePanicked,

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to accept connection: {0}")]
    Accept(#[source] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A request line that could not be turned into a command.
///
/// The `Display` output is sent back to the client verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("parse error: command '{0}' requires an argument")]
    MissingArgument(String),

    #[error("parse error: missing value for key '{0}'")]
    MissingValue(String),

    #[error("value is too long, max allowed length is {} bytes", u32::MAX)]
    ValueTooLong(usize),
}
