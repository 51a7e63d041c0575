//! Card and report command handlers

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Duration;

use condoguard_core::render::{export_card, export_report};
use condoguard_core::{
    CardLayout, Clock, Config, KeyValueStore, ReportLayout, Resident, ResidentStore,
};

use crate::commands::resident::find;
use crate::output::{Output, OutputFormat};

/// Timestamp printed on generated documents
pub fn issued_at(clock: &impl Clock) -> String {
    clock.now().format("%d/%m/%Y %H:%M").to_string()
}

/// Export a resident's card to the configured output directory
pub fn write_card<K: KeyValueStore, C: Clock>(
    store: &ResidentStore<K, C>,
    config: &Config,
    resident: &Resident,
) -> Result<PathBuf> {
    write_card_to(store, config, resident, &config.output_dir())
}

fn write_card_to<K: KeyValueStore, C: Clock>(
    store: &ResidentStore<K, C>,
    config: &Config,
    resident: &Resident,
    dir: &Path,
) -> Result<PathBuf> {
    export_card(
        resident,
        &issued_at(store.clock()),
        &CardLayout::from_config(config),
        dir,
    )
    .with_context(|| format!("Failed to generate card for {}", resident.display_id()))
}

/// Generate a resident's authorization card
pub fn card<K: KeyValueStore, C: Clock>(
    store: &ResidentStore<K, C>,
    config: &Config,
    id: String,
    out: Option<PathBuf>,
    open: bool,
    output: &Output,
) -> Result<()> {
    let resident = find(store, &id)?;
    let dir = out.unwrap_or_else(|| config.output_dir());

    let path = write_card_to(store, config, &resident, &dir)?;
    print_document(output, "Card", &path, 1);

    if open {
        open_document(&path)?;
    }
    Ok(())
}

/// Generate the periodic report
pub fn report<K: KeyValueStore, C: Clock>(
    store: &ResidentStore<K, C>,
    config: &Config,
    out: Option<PathBuf>,
    open: bool,
    output: &Output,
) -> Result<()> {
    let window = Duration::try_days(config.report_window_days).with_context(|| {
        format!(
            "report_window_days = {} is out of range",
            config.report_window_days
        )
    })?;
    let residents = store.report_candidates(window);
    let dir = out.unwrap_or_else(|| config.output_dir());

    let path = export_report(
        &residents,
        &issued_at(store.clock()),
        &ReportLayout::from_config(config),
        &dir,
    )
    .context("Failed to generate report")?;

    print_document(output, "Report", &path, residents.len());

    if open {
        open_document(&path)?;
    }
    Ok(())
}

fn print_document(output: &Output, kind: &str, path: &Path, residents: usize) {
    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "path": path,
                    "residents": residents
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", path.display());
        }
        OutputFormat::Human => {
            output.success(&format!(
                "{} written to {} ({} resident(s))",
                kind,
                path.display(),
                residents
            ));
        }
    }
}

fn open_document(path: &Path) -> Result<()> {
    open::that(path).with_context(|| format!("Failed to open {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use condoguard_core::{FixedClock, MemoryStore, ResidentDraft};
    use tempfile::TempDir;

    fn clock() -> FixedClock {
        FixedClock::at_date(NaiveDate::from_ymd_opt(2026, 5, 20).unwrap())
    }

    #[test]
    fn test_issued_at_format() {
        assert_eq!(issued_at(&clock()), "20/05/2026 12:00");
    }

    #[test]
    fn test_card_writes_named_pdf() {
        let temp_dir = TempDir::new().unwrap();
        let kv = MemoryStore::new();
        let store = ResidentStore::new(&kv, clock());
        store.register(ResidentDraft::new("Ana Souza", "12")).unwrap();

        card(
            &store,
            &Config::default(),
            "#001".to_string(),
            Some(temp_dir.path().to_path_buf()),
            false,
            &Output::new(OutputFormat::Quiet),
        )
        .unwrap();

        assert!(temp_dir.path().join("Ana_Souza.pdf").exists());
    }

    #[test]
    fn test_report_uses_output_dir_from_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            output_dir: Some(temp_dir.path().to_path_buf()),
            ..Config::default()
        };
        let kv = MemoryStore::new();
        let store = ResidentStore::new(&kv, clock());
        store.register(ResidentDraft::new("Ana", "12")).unwrap();

        report(
            &store,
            &config,
            None,
            false,
            &Output::new(OutputFormat::Quiet),
        )
        .unwrap();

        assert!(temp_dir
            .path()
            .join(condoguard_core::render::REPORT_FILE_NAME)
            .exists());
    }

    #[test]
    fn test_report_rejects_window_out_of_range() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            output_dir: Some(temp_dir.path().to_path_buf()),
            report_window_days: 200_000_000_000,
            ..Config::default()
        };
        let kv = MemoryStore::new();
        let store = ResidentStore::new(&kv, clock());

        let err = report(
            &store,
            &config,
            None,
            false,
            &Output::new(OutputFormat::Quiet),
        )
        .unwrap_err();

        assert!(err.to_string().contains("out of range"));
        assert!(!temp_dir
            .path()
            .join(condoguard_core::render::REPORT_FILE_NAME)
            .exists());
    }
}
