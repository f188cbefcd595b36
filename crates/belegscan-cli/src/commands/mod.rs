//! CLI subcommands.

pub mod config;
pub mod parse;
pub mod scan;

use std::path::Path;

use belegscan_core::BelegConfig;

/// Load configuration from an explicit path, or fall back to defaults.
pub(crate) fn load_config(config_path: Option<&str>) -> anyhow::Result<BelegConfig> {
    match config_path {
        Some(path) => Ok(BelegConfig::from_file(Path::new(path))?),
        None => Ok(BelegConfig::default()),
    }
}
