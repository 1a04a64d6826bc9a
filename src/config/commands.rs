//! Config command handlers

use anyhow::{Context, Result};
use colored::Colorize;

use super::Config;
use crate::cli::{ConfigAction, ConfigArgs};
use crate::languages;

pub fn run(args: ConfigArgs) -> Result<()> {
    match args.action {
        ConfigAction::Show => show_config(),
        ConfigAction::Init { force } => init_config(force),
        ConfigAction::Set { key, value } => set_config(&key, &value),
        ConfigAction::Get { key } => get_config(&key),
        ConfigAction::Path => show_path(),
        ConfigAction::Edit => edit_config(),
    }
}

fn show_config() -> Result<()> {
    let config = Config::load()?;
    let content = toml::to_string_pretty(&config)?;

    println!("{}", "[Config]".green());
    println!("{}", content);

    Ok(())
}

fn init_config(force: bool) -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    if path.exists() && !force {
        println!(
            "{}",
            format!("Config file already exists: {}", path.display()).yellow()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let config = Config::default();
    let saved_path = config.save()?;

    println!("{}", "[Config] Initialized".green());
    println!("  Created: {}", saved_path.display());
    println!();
    println!("Edit the config file to set default languages:");
    println!("  polyglotsync config edit");

    Ok(())
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid value for {}: {}", key, value))
}

/// Apply `key = value` to `config`.
pub fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "ui_language"] => {
            config.general.ui_language = optional(value).map(|v| languages::normalize(&v));
        }
        ["general", "output_dir"] => {
            config.general.output_dir = optional(value);
        }
        ["general", "verbose"] => {
            config.general.verbose = value.parse().unwrap_or(false);
        }
        ["pipeline", "batch_char_budget"] => {
            config.pipeline.batch_char_budget = parse_number(key, value)?;
        }
        ["pipeline", "merge_min_length"] => {
            config.pipeline.merge_min_length = parse_number(key, value)?;
        }
        ["pipeline", "retry_length_ratio"] => {
            config.pipeline.retry_length_ratio = parse_number(key, value)?;
        }
        ["pipeline", "delay_min_ms"] => {
            config.pipeline.delay_min_ms = parse_number(key, value)?;
        }
        ["pipeline", "delay_max_ms"] => {
            config.pipeline.delay_max_ms = parse_number(key, value)?;
        }
        ["pipeline", "max_in_flight"] => {
            config.pipeline.max_in_flight = parse_number(key, value)?;
        }
        ["translation", "source_language"] => {
            config.translation.source_language = languages::normalize(value);
        }
        ["translation", "target_languages"] => {
            config.translation.target_languages = value
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(languages::normalize)
                .collect();
        }
        ["translation", "fallback_language"] => {
            config.translation.fallback_language = languages::normalize(value);
        }
        ["translation", "endpoint"] => {
            config.translation.endpoint = value.to_string();
        }
        ["translation", "timeout_secs"] => {
            config.translation.timeout_secs = parse_number(key, value)?;
        }
        ["book", "title"] => {
            config.book.title = optional(value);
        }
        ["book", "author"] => {
            config.book.author = value.to_string();
        }
        _ => {
            anyhow::bail!("Unknown config key: {}", key);
        }
    }

    Ok(())
}

/// Current value of `key`, `None` when unset.
pub fn lookup(config: &Config, key: &str) -> Result<Option<String>> {
    let parts: Vec<&str> = key.split('.').collect();

    let value = match parts.as_slice() {
        ["general", "ui_language"] => config.general.ui_language.clone(),
        ["general", "output_dir"] => config.general.output_dir.clone(),
        ["general", "verbose"] => Some(config.general.verbose.to_string()),
        ["pipeline", "batch_char_budget"] => Some(config.pipeline.batch_char_budget.to_string()),
        ["pipeline", "merge_min_length"] => Some(config.pipeline.merge_min_length.to_string()),
        ["pipeline", "retry_length_ratio"] => {
            Some(config.pipeline.retry_length_ratio.to_string())
        }
        ["pipeline", "delay_min_ms"] => Some(config.pipeline.delay_min_ms.to_string()),
        ["pipeline", "delay_max_ms"] => Some(config.pipeline.delay_max_ms.to_string()),
        ["pipeline", "max_in_flight"] => Some(config.pipeline.max_in_flight.to_string()),
        ["translation", "source_language"] => Some(config.translation.source_language.clone()),
        ["translation", "target_languages"] => {
            Some(config.translation.target_languages.join(","))
        }
        ["translation", "fallback_language"] => {
            Some(config.translation.fallback_language.clone())
        }
        ["translation", "endpoint"] => Some(config.translation.endpoint.clone()),
        ["translation", "timeout_secs"] => Some(config.translation.timeout_secs.to_string()),
        ["book", "title"] => config.book.title.clone(),
        ["book", "author"] => Some(config.book.author.clone()),
        _ => {
            anyhow::bail!("Unknown config key: {}", key);
        }
    };

    Ok(value)
}

fn set_config(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;
    apply(&mut config, key, value)?;

    config.save()?;
    println!("{}", format!("[Config] Set {} = {}", key, value).green());

    Ok(())
}

fn get_config(key: &str) -> Result<()> {
    let config = Config::load()?;

    match lookup(&config, key)? {
        Some(v) => println!("{} = {}", key, v),
        None => println!("{} = (not set)", key),
    }

    Ok(())
}

fn show_path() -> Result<()> {
    match Config::config_path() {
        Some(path) => {
            println!("{}", path.display());
            if path.exists() {
                println!("{}", "(exists)".green());
            } else {
                println!("{}", "(not created)".yellow());
            }
        }
        None => {
            println!("{}", "Could not determine config path".red());
        }
    }
    Ok(())
}

fn edit_config() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    if !path.exists() {
        let config = Config::default();
        config.save()?;
        println!("{}", "[Config] Created default config".green());
    }

    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        });

    println!("Opening config with: {}", editor);
    println!("Path: {}", path.display());

    std::process::Command::new(&editor)
        .arg(&path)
        .status()
        .context(format!("Failed to open editor: {}", editor))?;

    Ok(())
}
