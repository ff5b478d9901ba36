//! Config command - manage configuration.

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use purctally_core::{Config, DataDir};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Create the data directory with a default configuration
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "regex.invno")
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// New value
        value: String,
    },

    /// Replace top-level sections with those of a JSON object
    Merge {
        /// JSON object, e.g. '{"tally": {"base_url": "http://localhost:9000", "token": ""}}'
        patch: String,
    },

    /// Show configuration file path
    Path,
}

pub async fn run(args: ConfigArgs, data: &DataDir) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(data),
        ConfigCommand::Init { force } => init_config(data, force),
        ConfigCommand::Get { key } => get_config(data, &key),
        ConfigCommand::Set { key, value } => set_config(data, &key, &value),
        ConfigCommand::Merge { patch } => merge_config(data, &patch),
        ConfigCommand::Path => show_path(data),
    }
}

fn show_config(data: &DataDir) -> anyhow::Result<()> {
    if !data.config_path().exists() {
        println!(
            "{} No config file found, showing defaults.",
            style("ℹ").blue()
        );
    }

    let config = data.config_store().load()?;
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn init_config(data: &DataDir, force: bool) -> anyhow::Result<()> {
    let config_path = data.config_path();

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    if force {
        data.config_store().save(&Config::default())?;
    }
    data.ensure()?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        config_path.display()
    );

    Ok(())
}

fn get_config(data: &DataDir, key: &str) -> anyhow::Result<()> {
    let config = data.config_store().load()?;

    // Convert config to JSON for key lookup
    let json = serde_json::to_value(&config)?;

    let mut current = &json;
    for part in key.split('.') {
        current = current
            .get(part)
            .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
    }

    match current {
        Value::String(s) => println!("{}", s),
        other => println!("{}", serde_json::to_string_pretty(other)?),
    }

    Ok(())
}

fn set_config(data: &DataDir, key: &str, value: &str) -> anyhow::Result<()> {
    let store = data.config_store();
    let config = store.load()?;

    // Every leaf is a string, so keep the raw value unless it parses as one
    let parsed_value = match serde_json::from_str::<Value>(value) {
        Ok(v @ Value::String(_)) => v,
        _ => Value::String(value.to_string()),
    };

    let mut json = serde_json::to_value(&config)?;

    let parts: Vec<&str> = key.split('.').collect();
    let mut current = &mut json;

    for (i, part) in parts.iter().enumerate() {
        if i == parts.len() - 1 {
            match current.as_object_mut() {
                Some(obj) if obj.contains_key(*part) => {
                    obj.insert((*part).to_string(), parsed_value.clone());
                }
                Some(_) => anyhow::bail!("Configuration key not found: {}", key),
                None => anyhow::bail!("Cannot set value at non-object path"),
            }
        } else {
            current = current
                .get_mut(*part)
                .ok_or_else(|| anyhow::anyhow!("Configuration path not found: {}", key))?;
        }
    }

    let config: Config = serde_json::from_value(json)?;
    store.save(&config)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&parsed_value)?
    );

    Ok(())
}

fn merge_config(data: &DataDir, patch: &str) -> anyhow::Result<()> {
    let patch: Value = serde_json::from_str(patch)?;
    let config = data.config_store().merge(&patch)?;

    println!("{} Configuration updated", style("✓").green());
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn show_path(data: &DataDir) -> anyhow::Result<()> {
    let config_path = data.config_path();

    println!("Configuration file: {}", config_path.display());

    if config_path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'purctally config init' to create a configuration file.");
    }

    Ok(())
}
