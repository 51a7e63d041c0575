//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use chrono::{Local, TimeZone};

use condoguard_core::{Resident, StorageUsage};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single resident with their providers
    pub fn print_resident(&self, resident: &Resident) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:           {}", resident.display_id());
                println!("Name:         {}", resident.name);
                println!("House:        {}", resident.house_number);
                if !resident.phone.is_empty() {
                    println!("Phone:        {}", resident.phone);
                }
                println!("Start:        {}", or_dash(&resident.start_date));
                println!("End:          {}", or_dash(&resident.end_date));
                println!("Status:       {}", resident.status);
                println!("Registered:   {}", format_millis(resident.created_at));
                if let Some(ref observations) = resident.observations {
                    println!("Observations: {}", observations);
                }

                if !resident.providers.is_empty() {
                    println!();
                    println!("── Providers ({}) ──", resident.providers.len());
                    for provider in &resident.providers {
                        println!(
                            "  {} | {}",
                            or_dash(&provider.name.to_uppercase()),
                            or_dash(&provider.document)
                        );
                    }
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(resident).unwrap_or_default()
                );
            }
            OutputFormat::Quiet => {
                println!("{}", resident.id);
            }
        }
    }

    /// Print a list of residents
    pub fn print_residents(&self, residents: &[Resident]) {
        match self.format {
            OutputFormat::Human => {
                if residents.is_empty() {
                    println!("No residents found.");
                    return;
                }
                for resident in residents {
                    println!(
                        "{} | {} | Casa {} | {} | until {}",
                        resident.display_id(),
                        truncate(&resident.name.to_uppercase(), 30),
                        truncate(&resident.house_number, 6),
                        resident.status,
                        or_dash(&resident.end_date)
                    );
                }
                println!("\n{} resident(s)", residents.len());
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(residents).unwrap_or_default()
                );
            }
            OutputFormat::Quiet => {
                for resident in residents {
                    println!("{}", resident.id);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Text gauge such as `[#########-----------] 45.0%`
pub fn usage_bar(usage: &StorageUsage, width: usize) -> String {
    let filled = ((usage.percentage.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!(
        "[{}{}] {:.1}%",
        "#".repeat(filled),
        "-".repeat(width - filled.min(width)),
        usage.percentage
    )
}

/// Render epoch milliseconds as local `YYYY-MM-DD HH:MM`
pub fn format_millis(millis: i64) -> String {
    match Local.timestamp_millis_opt(millis).single() {
        Some(dt) if millis > 0 => dt.format("%Y-%m-%d %H:%M").to_string(),
        _ => "-".to_string(),
    }
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

/// Truncate a string to max characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
