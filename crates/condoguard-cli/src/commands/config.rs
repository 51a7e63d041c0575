//! Config command handlers

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use condoguard_core::Config;

use crate::output::{Output, OutputFormat};

const VALID_KEYS: &str = "data_dir, output_dir, log_file, admin_password, capacity, \
                          usage_warning_percent, report_window_days, card_title, footer_text";

/// Accepted report windows, one day up to a century
const REPORT_WINDOW_DAYS: RangeInclusive<i64> = 1..=36500;

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "output_dir": config.output_dir,
                    "log_file": config.log_file,
                    "capacity": config.capacity,
                    "usage_warning_percent": config.usage_warning_percent,
                    "report_window_days": config.report_window_days,
                    "card_title": config.card_title,
                    "footer_text": config.footer_text
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:              {}", config.data_dir.display());
            println!("  output_dir:            {}", display_opt(&config.output_dir));
            println!("  log_file:              {}", display_opt(&config.log_file));
            println!("  admin_password:        (hidden)");
            println!("  capacity:              {}", config.capacity);
            println!(
                "  usage_warning_percent: {}",
                config.usage_warning_percent
            );
            println!("  report_window_days:    {}", config.report_window_days);
            println!("  card_title:            {}", config.card_title);
            println!("  footer_text:           {}", config.footer_text);
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    let shown = if key == "admin_password" {
        "********"
    } else {
        value.as_str()
    };
    output.success(&format!("Set {} = {}", key, shown));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "output_dir" => {
            config.output_dir = optional_path(value);
        }
        "log_file" => {
            config.log_file = optional_path(value);
        }
        "admin_password" => {
            if value.is_empty() {
                bail!("admin_password cannot be empty");
            }
            config.admin_password = value.to_string();
        }
        "capacity" => {
            config.capacity = value
                .parse()
                .context("Invalid value for capacity. Use a whole number.")?;
        }
        "usage_warning_percent" => {
            let percent: f64 = value
                .parse()
                .context("Invalid value for usage_warning_percent. Use a number.")?;
            if !(0.0..=100.0).contains(&percent) {
                bail!("usage_warning_percent must be between 0 and 100");
            }
            config.usage_warning_percent = percent;
        }
        "report_window_days" => {
            let days: i64 = value
                .parse()
                .context("Invalid value for report_window_days. Use a whole number.")?;
            if !REPORT_WINDOW_DAYS.contains(&days) {
                bail!(
                    "report_window_days must be between {} and {}",
                    REPORT_WINDOW_DAYS.start(),
                    REPORT_WINDOW_DAYS.end()
                );
            }
            config.report_window_days = days;
        }
        "card_title" => {
            config.card_title = value.to_string();
        }
        "footer_text" => {
            config.footer_text = value.to_string();
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\nValid keys: {}",
                key,
                VALID_KEYS
            );
        }
    }
    Ok(())
}

fn optional_path(value: &str) -> Option<PathBuf> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.into())
    }
}

fn display_opt(path: &Option<PathBuf>) -> String {
    path.as_deref()
        .map(Path::display)
        .map(|d| d.to_string())
        .unwrap_or_else(|| "(not set)".to_string())
}
