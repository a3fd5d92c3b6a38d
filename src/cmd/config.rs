//! Persistent settings commands

use admx2oma::config::ConfigManager;
use admx2oma::error::{Admx2OmaError, Result};
use clap::Args;
use colored::Colorize;

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Setting name: language, output_dir, format, log_level
    pub key: String,

    /// New value (empty string clears output_dir and log_level)
    pub value: String,
}

pub fn show(manager: &ConfigManager) -> Result<()> {
    let config = manager.load_config()?;
    let contents = toml::to_string_pretty(&config)
        .map_err(|e| Admx2OmaError::ConfigError(format!("Failed to serialize config: {}", e)))?;

    println!("→ Config file: {}", manager.config_file().display().to_string().cyan());
    println!();
    print!("{}", contents);
    Ok(())
}

pub fn set(manager: &ConfigManager, args: SetArgs) -> Result<()> {
    let mut config = manager.load_config_or_default();
    config.set(&args.key, &args.value)?;
    manager.save_config(&config)?;

    println!(
        "{} {} = {}",
        "✓".green(),
        args.key.bold(),
        if args.value.is_empty() { "(cleared)" } else { args.value.as_str() }
    );
    Ok(())
}

pub fn path(manager: &ConfigManager) {
    println!("{}", manager.config_file().display());
}
