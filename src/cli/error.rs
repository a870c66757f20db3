//! CLI error types and conversions

use crate::client::ClientError;
use crate::output::OutputError;
use crate::statistics::ValidationError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// API call failed
    #[error("client error: {0}")]
    ClientError(#[from] ClientError),

    /// Query rejected locally
    #[error("invalid query: {0}")]
    ValidationError(#[from] ValidationError),

    /// Output error
    #[error("output error: {0}")]
    OutputError(#[from] OutputError),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigurationError(String),
}
