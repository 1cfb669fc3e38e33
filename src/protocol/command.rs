//! Command definitions
//!
//! Represents commands parsed from request lines.

use bytes::Bytes;

/// Command tokens as they appear on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Set,
    Get,
    Del,
}

impl CommandType {
    /// Match a command token (case-sensitive)
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "set" => Some(CommandType::Set),
            "get" => Some(CommandType::Get),
            "del" => Some(CommandType::Del),
            _ => None,
        }
    }

    /// The token written on the wire
    pub fn token(&self) -> &'static str {
        match self {
            CommandType::Set => "set",
            CommandType::Get => "get",
            CommandType::Del => "del",
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Insert or overwrite a key
    Set { key: String, value: Bytes },

    /// Look up a key
    Get { key: String },

    /// Remove a key if present
    Del { key: String },
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Set { .. } => CommandType::Set,
            Command::Get { .. } => CommandType::Get,
            Command::Del { .. } => CommandType::Del,
        }
    }

    /// The key this command addresses
    pub fn key(&self) -> &str {
        match self {
            Command::Set { key, .. } | Command::Get { key } | Command::Del { key } => key,
        }
    }
}
