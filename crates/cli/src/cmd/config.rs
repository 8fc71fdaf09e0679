//! Configuration management command
//!
//! Provides CLI interface to view and edit the stackview configuration.

use crate::system_config::{self, SystemConfig, KEYS};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

/// List all configuration values
pub async fn run_list() -> Result<()> {
    let config = system_config::load()?;
    let config_path = system_config::config_file_path()
        .context("Could not determine config file path")?;

    println!("{}", "Stackview Configuration".bold());
    println!("{}: {}\n", "Location".dimmed(), config_path.display().dimmed());

    let mut section = "";
    for key in KEYS {
        let (prefix, name) = key.split_once('.').unwrap_or(("", key));
        if prefix != section {
            if !section.is_empty() {
                println!();
            }
            println!("{}", format!("[{}]", prefix).yellow());
            section = prefix;
        }
        println!("  {} = {}{}", name.cyan(), config.get(key)?, hint(&config, key));
    }

    println!("\n{}", "Valid Ranges:".bold());
    println!("  enter_ms, exit_ms, flash_ms: 0-10,000");
    println!("  stagger_ms: 0-1,000");
    println!("  frame_ms: 5-1,000");
    println!("  commit_chunk: 1-1,000");
    println!("  debounce_ms: 0-10,000");
    println!("  poll_interval_secs: 0-3600 (0 = polling disabled)");

    Ok(())
}

fn hint(config: &SystemConfig, key: &str) -> String {
    match key {
        "animation.frame_ms" => format!(
            " {}",
            format!("(~{} fps)", 1000 / config.animation.frame_ms.max(1)).dimmed()
        ),
        "watch.poll_interval_secs" if config.watch.poll_interval_secs == 0 => {
            format!(" {}", "(disabled)".dimmed())
        }
        _ => String::new(),
    }
}

/// Get a single configuration value
pub async fn run_get(key: &str) -> Result<()> {
    let config = system_config::load()?;
    println!("{}", config.get(key)?);
    Ok(())
}

/// Set a configuration value
pub async fn run_set(key: &str, value: &str) -> Result<()> {
    let mut config = system_config::load()?;
    config.set(key, value)?;
    system_config::save(&config)?;

    println!("{} {} = {}", "✓".green(), key.cyan(), value);
    println!(
        "{}",
        "Note: Restart 'stackview watch' for changes to take effect".yellow()
    );

    Ok(())
}

/// Show the config file path and optionally create it
pub async fn run_path(create: bool) -> Result<()> {
    let config_path = system_config::config_file_path()
        .context("Could not determine config file path")?;

    if create && !config_path.exists() {
        system_config::init_if_missing()?;
        println!("{} Created config file at: {}", "✓".green(), config_path.display());
    } else if config_path.exists() {
        println!("{}", config_path.display());
    } else {
        println!("{}", config_path.display());
        println!("{}", "File does not exist. Use --create to create it.".yellow());
    }

    Ok(())
}

/// Show example configuration
pub async fn run_example() -> Result<()> {
    println!("{}", system_config::example_config());
    Ok(())
}
