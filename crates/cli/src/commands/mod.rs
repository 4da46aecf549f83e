//! CLI command definitions and execution
//!
//! Every command resolves its settings the same way: the config file
//! first, then global flags and their environment variables on top.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use s3ops_core::{Config, ConfigManager, Error, ResourceClient, Result};
use s3ops_s3::S3Client;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod completions;
mod config;
mod exists;
mod get;
mod lifecycle;
mod ls;
mod mb;
mod objects;
mod put;
mod rb;
mod rm;
mod uri;

/// s3ops - bucket, lifecycle and object operations for S3-compatible storage
///
/// Credentials are read from the standard AWS provider chain
/// (environment, shared profile, instance metadata).
#[derive(Parser, Debug)]
#[command(name = "s3ops")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Region to operate in (overrides the config file)
    #[arg(long, global = true, env = "S3OPS_REGION")]
    pub region: Option<String>,

    /// Custom endpoint URL for S3-compatible services
    #[arg(long, global = true, env = "S3OPS_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Use path-style bucket addressing
    #[arg(long, global = true, default_value = "false")]
    pub path_style: bool,

    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a bucket under a generated unique name
    Mb(mb::MbArgs),

    /// List buckets
    Ls(ls::LsArgs),

    /// Remove a bucket
    Rb(rb::RbArgs),

    /// Replace a bucket's lifecycle configuration with one rule
    Lifecycle(lifecycle::LifecycleArgs),

    /// Upload a local file
    Put(put::PutArgs),

    /// Download an object
    Get(get::GetArgs),

    /// Remove an object
    Rm(rm::RmArgs),

    /// List objects in a bucket
    Objects(objects::ObjectsArgs),

    /// Check whether a bucket or object exists
    Exists(exists::ExistsArgs),

    /// Print the s3:// URI of a bucket and prefix
    Uri(uri::UriArgs),

    /// Show or change the configuration file
    #[command(subcommand)]
    Config(config::ConfigCommands),

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

impl Commands {
    /// Whether the command talks to the service
    ///
    /// Local commands still run when the stored settings are unusable, so
    /// `config set` can repair them.
    fn needs_client(&self) -> bool {
        !matches!(
            self,
            Commands::Uri(_) | Commands::Config(_) | Commands::Completions(_)
        )
    }
}

/// Settings and output shared by every command
pub struct Context {
    pub config: Config,
    pub formatter: Formatter,
}

impl Context {
    /// Build a resource client for the configured region and endpoint
    pub async fn resource(&self) -> Result<ResourceClient> {
        let client = S3Client::new(&self.config).await?;
        Ok(ResourceClient::new(
            Arc::new(client),
            self.config.region.clone(),
        ))
    }

    /// Report `err` and return the exit code for its kind
    pub fn fail(&self, context: &str, err: &Error) -> ExitCode {
        fail(&self.formatter, context, err)
    }
}

fn fail(formatter: &Formatter, context: &str, err: &Error) -> ExitCode {
    let code = ExitCode::from(err);
    formatter.error(&format!("{context}: {err}"), code);
    code
}

/// Layer command-line settings over the file configuration
fn apply_overrides(
    mut config: Config,
    region: Option<String>,
    endpoint: Option<String>,
    path_style: bool,
) -> Result<Config> {
    if let Some(region) = region {
        config.region = region;
    }
    if let Some(endpoint) = endpoint {
        config.endpoint = Some(endpoint);
    }
    if path_style {
        config.force_path_style = true;
    }

    config.validate()?;
    Ok(config)
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        quiet: cli.quiet,
    };
    let needs_client = cli.command.needs_client();

    let stored = match ConfigManager::new().and_then(|manager| manager.load_unvalidated()) {
        Ok(config) => config,
        Err(e) if needs_client => {
            return fail(
                &Formatter::new(output_config),
                "Failed to load configuration",
                &e,
            );
        }
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring unreadable configuration");
            Config::default()
        }
    };

    let formatter = Formatter::new(output_config.with_defaults(&stored.defaults));
    let config = if needs_client {
        match apply_overrides(stored, cli.region, cli.endpoint, cli.path_style) {
            Ok(config) => config,
            Err(e) => return fail(&formatter, "Invalid settings", &e),
        }
    } else {
        stored
    };

    tracing::debug!(region = %config.region, command = ?cli.command, "Executing command");
    let ctx = Context { config, formatter };

    match cli.command {
        Commands::Mb(args) => mb::execute(args, &ctx).await,
        Commands::Ls(args) => ls::execute(args, &ctx).await,
        Commands::Rb(args) => rb::execute(args, &ctx).await,
        Commands::Lifecycle(args) => lifecycle::execute(args, &ctx).await,
        Commands::Put(args) => put::execute(args, &ctx).await,
        Commands::Get(args) => get::execute(args, &ctx).await,
        Commands::Rm(args) => rm::execute(args, &ctx).await,
        Commands::Objects(args) => objects::execute(args, &ctx).await,
        Commands::Exists(args) => exists::execute(args, &ctx).await,
        Commands::Uri(args) => uri::execute(args, &ctx),
        Commands::Config(cmd) => config::execute(cmd, &ctx),
        Commands::Completions(args) => completions::execute(args),
    }
}
