//! config command - Show or change the configuration file
//!
//! Operates on the file itself, so global `--region`/`--endpoint` flags are
//! not applied here.

use clap::{Subcommand, ValueEnum};
use s3ops_core::{CannedAcl, Config, ConfigManager, Error, Result};
use serde::Serialize;

use super::Context;
use crate::exit_code::ExitCode;

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the stored configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Change one stored setting
    Set {
        /// Setting to change
        #[arg(value_enum)]
        key: ConfigKey,

        /// New value; an empty endpoint removes it
        value: String,
    },
}

/// Settings `config set` can change
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Region,
    Endpoint,
    ForcePathStyle,
    DefaultAcl,
    Output,
    Color,
}

#[derive(Debug, Serialize)]
struct ShowOutput<'a> {
    path: String,
    config: &'a Config,
}

/// Execute a config subcommand
pub fn execute(cmd: ConfigCommands, ctx: &Context) -> ExitCode {
    match ConfigManager::new() {
        Ok(manager) => run(cmd, &manager, ctx),
        Err(e) => ctx.fail("Failed to locate configuration", &e),
    }
}

fn run(cmd: ConfigCommands, manager: &ConfigManager, ctx: &Context) -> ExitCode {
    match cmd {
        ConfigCommands::Path => {
            ctx.formatter
                .println(&manager.config_path().display().to_string());
            ExitCode::Success
        }
        ConfigCommands::Show => match manager.load_unvalidated() {
            Ok(config) => {
                show(manager, &config, ctx);
                ExitCode::Success
            }
            Err(e) => ctx.fail("Failed to load configuration", &e),
        },
        ConfigCommands::Set { key, value } => match update(manager, key, &value) {
            Ok(config) => {
                if ctx.formatter.is_json() {
                    show(manager, &config, ctx);
                } else {
                    ctx.formatter.success(&format!(
                        "Configuration saved to {}.",
                        manager.config_path().display()
                    ));
                }
                ExitCode::Success
            }
            Err(e) => ctx.fail("Failed to save configuration", &e),
        },
    }
}

fn show(manager: &ConfigManager, config: &Config, ctx: &Context) {
    if ctx.formatter.is_json() {
        ctx.formatter.json(&ShowOutput {
            path: manager.config_path().display().to_string(),
            config,
        });
        return;
    }

    match toml::to_string_pretty(config) {
        Ok(text) => ctx.formatter.println(text.trim_end()),
        Err(e) => ctx
            .formatter
            .warning(&format!("Cannot render configuration: {e}")),
    }
}

/// Load, change and save the configuration file
///
/// Only the result is validated, so one bad stored value can be replaced.
fn update(manager: &ConfigManager, key: ConfigKey, value: &str) -> Result<Config> {
    let config = apply_set(manager.load_unvalidated()?, key, value)?;
    manager.save(&config)?;
    Ok(config)
}

fn apply_set(mut config: Config, key: ConfigKey, value: &str) -> Result<Config> {
    match key {
        ConfigKey::Region => config.region = value.to_string(),
        ConfigKey::Endpoint => {
            config.endpoint = (!value.is_empty()).then(|| value.to_string());
        }
        ConfigKey::ForcePathStyle => {
            config.force_path_style = value.parse().map_err(|_| {
                Error::InvalidArgument(format!("expected true or false, got '{value}'"))
            })?;
        }
        ConfigKey::DefaultAcl => config.default_acl = value.parse::<CannedAcl>()?,
        ConfigKey::Output => config.defaults.output = one_of(value, &["human", "json"])?,
        ConfigKey::Color => {
            config.defaults.color = one_of(value, &["auto", "always", "never"])?;
        }
    }
    Ok(config)
}

fn one_of(value: &str, allowed: &[&str]) -> Result<String> {
    if allowed.contains(&value) {
        Ok(value.to_string())
    } else {
        Err(Error::InvalidArgument(format!(
            "expected one of {}, got '{value}'",
            allowed.join(", ")
        )))
    }
}
