//! CLI command implementations

pub mod error;
pub mod extract;
pub mod serve;

pub use error::CliError;
pub use extract::{Cli, Commands, ExtractArgs, ExtractionSummary, RunConfig};
pub use serve::ServeArgs;
