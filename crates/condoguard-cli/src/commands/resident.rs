//! Resident command handlers

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Args;

use condoguard_core::ids::normalize_id;
use condoguard_core::models::PROVIDER_SLOTS;
use condoguard_core::{
    Clock, Config, KeyValueStore, Resident, ResidentDraft, ResidentStatus, ResidentStore,
    ServiceProvider, StoreError,
};

use crate::commands::document;
use crate::editor::confirm;
use crate::output::Output;

/// Optional resident fields shared by `add` and `edit`
#[derive(Args, Debug, Clone, Default)]
pub struct ResidentDetails {
    /// Contact phone
    #[arg(long)]
    pub phone: Option<String>,
    /// Start of the authorization window (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,
    /// End of the authorization window (YYYY-MM-DD, empty for none)
    #[arg(long)]
    pub end: Option<String>,
    /// Authorized provider as "NAME:DOCUMENT" (repeatable, up to 5)
    #[arg(short, long = "provider")]
    pub providers: Vec<String>,
    /// Free-form notes
    #[arg(long)]
    pub observations: Option<String>,
}

impl ResidentDetails {
    /// Overlay the given fields onto `draft`
    ///
    /// Providers, when any are given, replace the existing list.
    fn apply(self, draft: &mut ResidentDraft) -> Result<()> {
        if let Some(phone) = self.phone {
            draft.phone = phone;
        }
        if let Some(start) = self.start {
            draft.start_date = parse_date(&start, "start")?;
        }
        if let Some(end) = self.end {
            draft.end_date = parse_date(&end, "end")?;
        }
        if !self.providers.is_empty() {
            draft.providers = parse_providers(&self.providers)?;
        }
        if let Some(observations) = self.observations {
            draft.observations = observations;
        }
        Ok(())
    }
}

/// Register a new resident
pub fn add<K: KeyValueStore, C: Clock>(
    store: &ResidentStore<K, C>,
    config: &Config,
    name: String,
    house: String,
    details: ResidentDetails,
    card: bool,
    output: &Output,
) -> Result<()> {
    let mut draft = ResidentDraft::new(name, house);
    details.apply(&mut draft)?;

    let resident = stored(store.register(draft), "Failed to save resident")?;

    output.success(&format!("Registered resident: {}", resident.display_id()));
    output.print_resident(&resident);

    if card {
        let path = document::write_card(store, config, &resident)?;
        output.success(&format!("Card written to {}", path.display()));
    }

    Ok(())
}

/// Edit an existing resident
pub fn edit<K: KeyValueStore, C: Clock>(
    store: &ResidentStore<K, C>,
    id: String,
    name: Option<String>,
    house: Option<String>,
    details: ResidentDetails,
    status: Option<String>,
    output: &Output,
) -> Result<()> {
    let resident = find(store, &id)?;
    let mut draft = ResidentDraft::from(resident);

    if let Some(name) = name {
        draft.name = name;
    }
    if let Some(house) = house {
        draft.house_number = house;
    }
    if let Some(status) = status {
        let status: ResidentStatus = status.parse().map_err(anyhow::Error::msg)?;
        draft.status = Some(status);
    }
    details.apply(&mut draft)?;

    let resident = stored(store.register(draft), "Failed to update resident")?;

    output.success(&format!("Updated resident: {}", resident.display_id()));
    output.print_resident(&resident);

    Ok(())
}

/// List residents, optionally filtered by name or house
pub fn list<K: KeyValueStore, C: Clock>(
    store: &ResidentStore<K, C>,
    search: Option<String>,
    output: &Output,
) -> Result<()> {
    let residents = match search {
        Some(ref term) => store.search(term),
        None => store.list(),
    };

    output.print_residents(&residents);
    Ok(())
}

/// Show a single resident
pub fn show<K: KeyValueStore, C: Clock>(
    store: &ResidentStore<K, C>,
    id: String,
    output: &Output,
) -> Result<()> {
    let resident = find(store, &id)?;
    output.print_resident(&resident);
    Ok(())
}

/// Delete a resident
pub fn delete<K: KeyValueStore, C: Clock>(
    store: &ResidentStore<K, C>,
    id: String,
    output: &Output,
) -> Result<()> {
    let resident = find(store, &id)?;

    if output.should_prompt() {
        println!(
            "Delete resident: {} - {} (Casa {})",
            resident.display_id(),
            resident.name,
            resident.house_number
        );
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    stored(store.delete(&resident.id), "Failed to delete resident")?;

    output.success(&format!("Deleted resident: {}", resident.display_id()));

    Ok(())
}

/// Flip a resident between active and inactive
pub fn toggle<K: KeyValueStore, C: Clock>(
    store: &ResidentStore<K, C>,
    id: String,
    output: &Output,
) -> Result<()> {
    let resident = find(store, &id)?;

    let status = stored(store.toggle_status(&resident.id), "Failed to update status")?
        .with_context(|| format!("Resident not found: {}", id))?;

    output.success(&format!("{} is now {}", resident.display_id(), status));

    Ok(())
}

/// Remove every inactive resident
pub fn purge<K: KeyValueStore, C: Clock>(
    store: &ResidentStore<K, C>,
    output: &Output,
) -> Result<()> {
    let inactive = store
        .list()
        .iter()
        .filter(|r| !r.status.is_active())
        .count();

    if inactive == 0 {
        output.message("No inactive residents to remove.");
        return Ok(());
    }

    if output.should_prompt() {
        println!("Permanently remove {} inactive resident(s).", inactive);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let removed = stored(store.purge_inactive(), "Failed to purge inactive residents")?;

    output.success(&format!("Removed {} inactive resident(s)", removed));

    Ok(())
}

/// Look up a resident by a user-typed id (`7`, `007`, `#007`)
pub fn find<K: KeyValueStore, C: Clock>(store: &ResidentStore<K, C>, id: &str) -> Result<Resident> {
    let normalized = normalize_id(id);
    match store.get(&normalized) {
        Some(resident) => Ok(resident),
        None => bail!("Resident not found: {}", id),
    }
}

/// Wrap a failed store write, adding a recovery hint when one applies
fn stored<T, E: Into<StoreError>>(result: Result<T, E>, action: &str) -> Result<T> {
    result.map_err(|e| {
        let error: StoreError = e.into();
        let message = match &error {
            StoreError::Storage(storage) => match storage.recovery_suggestion() {
                Some(hint) => format!("{}. {}", action, hint),
                None => action.to_string(),
            },
            StoreError::Validation(_) => action.to_string(),
        };
        anyhow::Error::new(error).context(message)
    })
}

/// Parse `NAME:DOCUMENT` provider arguments
///
/// The document part is optional. Blank entries are kept here and dropped
/// by the store.
fn parse_providers(values: &[String]) -> Result<Vec<ServiceProvider>> {
    if values.len() > PROVIDER_SLOTS {
        bail!(
            "At most {} providers can be authorized per resident (got {})",
            PROVIDER_SLOTS,
            values.len()
        );
    }

    Ok(values
        .iter()
        .map(|value| match value.split_once(':') {
            Some((name, document)) => ServiceProvider::new(name.trim(), document.trim()),
            None => ServiceProvider::new(value.trim(), ""),
        })
        .collect())
}

/// Check a `YYYY-MM-DD` date; an empty value clears the field
fn parse_date(value: &str, field: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(String::new());
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").with_context(|| {
        format!(
            "Invalid {} date '{}'. Use YYYY-MM-DD, e.g. 2026-05-20",
            field, value
        )
    })?;
    Ok(date.format("%Y-%m-%d").to_string())
}
