//! Status command handler

use anyhow::Result;

use condoguard_core::{AccessLevel, Clock, Config, KeyValueStore, ResidentStore};

use crate::output::{usage_bar, Output, OutputFormat};

/// Show register usage and access level
pub fn show<K: KeyValueStore, C: Clock>(
    store: &ResidentStore<K, C>,
    config: &Config,
    access: AccessLevel,
    output: &Output,
) -> Result<()> {
    let residents = store.list();
    let active = residents.iter().filter(|r| r.status.is_active()).count();
    let inactive = residents.len() - active;
    let usage = store.usage();
    let critical = usage.is_critical(config.usage_warning_percent);

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "access": access,
                    "data_dir": config.data_dir,
                    "usage": usage,
                    "critical": critical,
                    "counts": {
                        "active": active,
                        "inactive": inactive
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}/{}", usage.used, usage.total);
        }
        OutputFormat::Human => {
            println!("CondoGuard Status");
            println!("=================");
            println!();
            println!("Access: {}", access);
            println!();
            println!("Storage:");
            println!("  Location: {}", config.data_dir.display());
            println!("  Usage:    {}", usage_bar(&usage, 20));
            println!("  Records:  {} of {}", usage.used, usage.total);
            if critical {
                println!(
                    "  Warning:  above {:.0}% of capacity. Purge inactive residents.",
                    config.usage_warning_percent
                );
            }
            println!();
            println!("Residents:");
            println!("  Active:   {}", active);
            println!("  Inactive: {}", inactive);
        }
    }

    Ok(())
}
