//! CLI error types and conversions

use crate::category::CategoryError;
use crate::fetcher::FetcherError;
use crate::output::OutputError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Category error
    #[error("category error: {0}")]
    CategoryError(#[from] CategoryError),

    /// Fetcher error
    #[error("fetcher error: {0}")]
    FetcherError(#[from] FetcherError),

    /// Output error
    #[error("output error: {0}")]
    OutputError(#[from] OutputError),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// HTTP server error
    #[error("server error: {0}")]
    ServerError(String),
}
