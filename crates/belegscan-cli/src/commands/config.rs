//! Config command - manage configuration.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use belegscan_core::BelegConfig;

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

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Set a configuration value (key like "scan.strict_numbers")
    Set {
        /// Section-qualified configuration key
        key: String,
        /// New value (JSON literal or bare string)
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(),
        ConfigCommand::Init(init_args) => init_config(init_args),
        ConfigCommand::Set { key, value } => set_config(&key, &value),
        ConfigCommand::Path => show_path(),
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("belegscan")
        .join("config.json")
}

fn load_or_default(path: &PathBuf) -> anyhow::Result<BelegConfig> {
    if path.exists() {
        Ok(BelegConfig::from_file(path)?)
    } else {
        Ok(BelegConfig::default())
    }
}

fn show_config() -> anyhow::Result<()> {
    let config_path = default_config_path();

    if !config_path.exists() {
        println!(
            "{} No config file found, showing defaults.",
            style("ℹ").blue()
        );
    }

    let config = load_or_default(&config_path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn init_config(args: InitArgs) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or_else(default_config_path);

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    BelegConfig::default().save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

/// Keys are section-qualified with exactly one dot; the config schema is
/// two levels deep.
fn set_config(key: &str, value: &str) -> anyhow::Result<()> {
    let Some((section, field)) = key.split_once('.') else {
        anyhow::bail!("Expected a section-qualified key like scan.strict_numbers, got: {key}");
    };

    let config_path = default_config_path();
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let config = load_or_default(&config_path)?;

    // Bare strings are accepted as a convenience for e.g. ai.model names.
    let parsed_value: serde_json::Value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));

    let mut json = serde_json::to_value(&config)?;
    let field_slot = json
        .get_mut(section)
        .and_then(|s| s.as_object_mut())
        .ok_or_else(|| anyhow::anyhow!("Unknown configuration section: {section}"))?;

    if !field_slot.contains_key(field) {
        anyhow::bail!("Unknown configuration key: {key}");
    }
    field_slot.insert(field.to_string(), parsed_value.clone());

    let config: BelegConfig = serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Invalid value for {key}: {e}"))?;
    config.save(&config_path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&parsed_value)?
    );

    Ok(())
}

fn show_path() -> anyhow::Result<()> {
    let config_path = default_config_path();

    println!("Configuration file: {}", config_path.display());

    if config_path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'belegscan config init' to create a configuration file.");
    }

    Ok(())
}
