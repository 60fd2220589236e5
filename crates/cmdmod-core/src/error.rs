//! Error types for cmdmod-core

use thiserror::Error;

/// Core error type for command dispatch
#[derive(Debug, Error)]
pub enum Error {
    /// No registration matched the input
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// A required argument was not supplied
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    /// A token was rejected by the argument's parser
    #[error("Invalid value '{input}' for argument '{name}': {reason}")]
    InvalidArgument {
        name: String,
        input: String,
        reason: String,
    },

    /// Input had tokens left over after every argument was bound
    #[error("Too many arguments: {0}")]
    TooManyArguments(String),

    /// The caller lacks the registration's permission
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// A bound argument was read back as the wrong type
    #[error("Argument '{name}' is not a {expected}")]
    ArgumentType {
        name: String,
        expected: &'static str,
    },

    /// Raw input could not be split into tokens
    #[error("Failed to tokenize input: {0}")]
    Tokenize(String),

    /// The matched handler returned an error
    #[error("Command failed: {0:#}")]
    Executor(anyhow::Error),
}

/// Result type alias for cmdmod-core operations
pub type Result<T> = std::result::Result<T, Error>;
