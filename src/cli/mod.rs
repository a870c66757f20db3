//! CLI command implementations

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::net::SocketAddr;
use std::time::Duration;

use crate::client::Client;
use crate::context::RequestContext;

pub mod error;
pub mod resources;
pub mod stats;

pub use error::CliError;
pub use resources::{CampaignsCommand, FilesArgs, PageArgs};
pub use stats::StatsArgs;

/// ExoClick API command-line client
#[derive(Parser, Debug)]
#[command(name = "exoclick")]
#[command(about = "Query the ExoClick advertising API", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// API token exchanged for a session token on first use
    #[arg(long, global = true, env = "EXOCLICK_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// API root, with a trailing slash
    #[arg(long, global = true, env = "EXOCLICK_BASE_URL")]
    pub base_url: Option<String>,

    /// Overall deadline in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Serve Prometheus metrics on this address
    #[arg(long, global = true)]
    pub metrics_addr: Option<SocketAddr>,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export statistics as CSV
    Stats(StatsArgs),

    /// Campaign operations
    Campaigns(CampaignsCommand),

    /// List content categories
    Categories(PageArgs),

    /// List marketplace zones
    Marketplace(PageArgs),

    /// List uploaded creatives
    Files(FilesArgs),
}

impl Cli {
    /// Build an API client from the global options
    pub fn client(&self) -> Result<Client, CliError> {
        let api_token = self.api_token.clone().ok_or_else(|| {
            CliError::ConfigurationError(
                "API token missing: pass --api-token or set EXOCLICK_API_TOKEN".to_string(),
            )
        })?;

        let mut builder = Client::builder(api_token);
        if let Some(base_url) = &self.base_url {
            builder = builder.base_url(base_url)?;
        }
        Ok(builder.build()?)
    }

    /// Context carrying the `--timeout` deadline
    pub fn context(&self) -> RequestContext {
        match self.timeout {
            Some(secs) => RequestContext::with_timeout(Duration::from_secs(secs)),
            None => RequestContext::new(),
        }
    }

    /// Run the selected command
    pub async fn execute(&self, ctx: &RequestContext) -> Result<(), CliError> {
        match &self.command {
            Commands::Stats(args) => args.execute(self, ctx).await,
            Commands::Campaigns(cmd) => cmd.execute(self, ctx).await,
            Commands::Categories(args) => resources::list_categories(self, ctx, args).await,
            Commands::Marketplace(args) => resources::list_marketplace(self, ctx, args).await,
            Commands::Files(args) => args.execute(self, ctx).await,
        }
    }
}

/// Pretty-print `value` as JSON on stdout
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::InvalidArgument(format!("failed to serialize output: {e}")))?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}")
        .map_err(|e| CliError::OutputError(crate::output::OutputError::IoError(e.to_string())))
}
