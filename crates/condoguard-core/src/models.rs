//! Data models for CondoGuard
//!
//! Defines the resident register's data structures: Resident,
//! ServiceProvider, their status, and the draft used to register or edit
//! a resident.
//!
//! Field names serialize in camelCase and statuses as `"Ativo"` /
//! `"Desativado"`, matching the JSON already kept by existing installs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of provider slots offered by the entry form
pub const PROVIDER_SLOTS: usize = 5;

/// Whether a resident's authorization is in force
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ResidentStatus {
    #[default]
    #[serde(rename = "Ativo", alias = "ACTIVE")]
    Active,
    #[serde(rename = "Desativado", alias = "INACTIVE")]
    Inactive,
}

impl ResidentStatus {
    /// Stored label
    pub fn as_str(&self) -> &'static str {
        match self {
            ResidentStatus::Active => "Ativo",
            ResidentStatus::Inactive => "Desativado",
        }
    }

    /// The opposite status
    pub fn toggled(self) -> Self {
        match self {
            ResidentStatus::Active => ResidentStatus::Inactive,
            ResidentStatus::Inactive => ResidentStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ResidentStatus::Active)
    }
}

impl fmt::Display for ResidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResidentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" | "ativo" => Ok(ResidentStatus::Active),
            "inactive" | "inativo" | "desativado" => Ok(ResidentStatus::Inactive),
            other => Err(format!(
                "Unknown status '{}'. Use 'active' or 'inactive'.",
                other
            )),
        }
    }
}

/// Role of the person operating the register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessLevel {
    /// Full read/write
    Admin,
    /// Read-only
    Viewer,
}

impl AccessLevel {
    pub fn is_admin(&self) -> bool {
        matches!(self, AccessLevel::Admin)
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessLevel::Admin => f.write_str("ADMIN"),
            AccessLevel::Viewer => f.write_str("VIEWER"),
        }
    }
}

/// A worker authorized to access a unit during the resident's window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceProvider {
    #[serde(default)]
    pub name: String,
    /// CPF or RG
    #[serde(default)]
    pub document: String,
}

impl ServiceProvider {
    pub fn new(name: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            document: document.into(),
        }
    }

    /// True when neither name nor document was filled in
    pub fn is_blank(&self) -> bool {
        self.name.is_empty() && self.document.is_empty()
    }
}

/// A unit occupant and the authorization window for their providers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resident {
    /// Decimal id in `1..=1000`, never padded in storage
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub house_number: String,
    #[serde(default)]
    pub phone: String,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub start_date: String,
    /// `YYYY-MM-DD`, empty when open-ended
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub status: ResidentStatus,
    #[serde(default)]
    pub providers: Vec<ServiceProvider>,
    /// Epoch milliseconds of the first save
    #[serde(default)]
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
}

impl Resident {
    /// Id zero-padded for display, e.g. `#007`
    pub fn display_id(&self) -> String {
        format!("#{:0>3}", self.id)
    }

    /// True if the record is ACTIVE but its end date is before `today`
    ///
    /// `today` must be `YYYY-MM-DD`; the fixed-width format makes string
    /// comparison chronological.
    pub fn is_expired_on(&self, today: &str) -> bool {
        self.status.is_active() && !self.end_date.is_empty() && self.end_date.as_str() < today
    }

    /// Names of providers that have one, uppercased
    pub fn provider_names(&self) -> Vec<String> {
        self.providers
            .iter()
            .filter(|p| !p.name.is_empty())
            .map(|p| p.name.to_uppercase())
            .collect()
    }
}

/// Input for registering a new resident or re-saving an existing one
///
/// Editing pre-populates a draft from the stored record; registering
/// turns the draft into a full `Resident`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResidentDraft {
    /// Existing id when editing; allocated on save when `None`
    pub id: Option<String>,
    pub name: String,
    pub house_number: String,
    pub phone: String,
    pub start_date: String,
    pub end_date: String,
    pub status: Option<ResidentStatus>,
    pub providers: Vec<ServiceProvider>,
    /// Preserved when editing; stamped on first save when `None`
    pub created_at: Option<i64>,
    pub observations: String,
}

impl ResidentDraft {
    pub fn new(name: impl Into<String>, house_number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            house_number: house_number.into(),
            ..Self::default()
        }
    }

    /// Check required fields
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        if self.house_number.trim().is_empty() {
            return Err(ValidationError::MissingHouseNumber);
        }
        Ok(())
    }

    /// Providers with at least a name or a document
    pub fn filled_providers(&self) -> Vec<ServiceProvider> {
        self.providers
            .iter()
            .filter(|p| !p.is_blank())
            .cloned()
            .collect()
    }
}

impl From<Resident> for ResidentDraft {
    fn from(resident: Resident) -> Self {
        Self {
            id: Some(resident.id),
            name: resident.name,
            house_number: resident.house_number,
            phone: resident.phone,
            start_date: resident.start_date,
            end_date: resident.end_date,
            status: Some(resident.status),
            providers: resident.providers,
            created_at: Some(resident.created_at),
            observations: resident.observations.unwrap_or_default(),
        }
    }
}

/// A draft was rejected before touching the store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Resident name is required")]
    MissingName,
    #[error("House number is required")]
    MissingHouseNumber,
}

/// Advisory usage of the register's capacity
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StorageUsage {
    pub used: usize,
    pub total: usize,
    pub percentage: f64,
}

impl StorageUsage {
    pub fn new(used: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            0.0
        } else {
            used as f64 * 100.0 / total as f64
        };
        Self {
            used,
            total,
            percentage,
        }
    }

    /// True once usage reaches `threshold` percent
    pub fn is_critical(&self, threshold: f64) -> bool {
        self.percentage >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Resident {
        Resident {
            id: "7".to_string(),
            name: "Ana Souza".to_string(),
            house_number: "12".to_string(),
            phone: "(34) 99999-0000".to_string(),
            start_date: "2026-01-10".to_string(),
            end_date: "2026-02-10".to_string(),
            status: ResidentStatus::Active,
            providers: vec![
                ServiceProvider::new("joão pedreiro", "123.456.789-00"),
                ServiceProvider::new("", "RG 55"),
            ],
            created_at: 1_700_000_000_000,
            observations: None,
        }
    }

    #[test]
    fn test_serializes_camel_case_with_stored_status_labels() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["houseNumber"], "12");
        assert_eq!(json["startDate"], "2026-01-10");
        assert_eq!(json["createdAt"], 1_700_000_000_000i64);
        assert_eq!(json["status"], "Ativo");
        assert!(json.get("observations").is_none());
    }

    #[test]
    fn test_deserializes_sparse_record() {
        let json = r#"{"id":"3","name":"Beto","status":"Desativado"}"#;
        let resident: Resident = serde_json::from_str(json).unwrap();
        assert_eq!(resident.id, "3");
        assert_eq!(resident.status, ResidentStatus::Inactive);
        assert!(resident.providers.is_empty());
        assert_eq!(resident.end_date, "");
        assert_eq!(resident.created_at, 0);
    }

    #[test]
    fn test_display_id_is_padded() {
        let mut resident = sample();
        assert_eq!(resident.display_id(), "#007");
        resident.id = "1000".to_string();
        assert_eq!(resident.display_id(), "#1000");
    }

    #[test]
    fn test_is_expired_on() {
        let mut resident = sample();
        assert!(resident.is_expired_on("2026-02-11"));
        assert!(!resident.is_expired_on("2026-02-10"));

        resident.status = ResidentStatus::Inactive;
        assert!(!resident.is_expired_on("2026-02-11"));

        resident.status = ResidentStatus::Active;
        resident.end_date.clear();
        assert!(!resident.is_expired_on("2099-01-01"));
    }

    #[test]
    fn test_provider_names_skip_unnamed() {
        assert_eq!(sample().provider_names(), vec!["JOÃO PEDREIRO".to_string()]);
    }

    #[test]
    fn test_status_parsing_and_toggle() {
        assert_eq!("active".parse::<ResidentStatus>(), Ok(ResidentStatus::Active));
        assert_eq!(
            "Desativado".parse::<ResidentStatus>(),
            Ok(ResidentStatus::Inactive)
        );
        assert!("paused".parse::<ResidentStatus>().is_err());
        assert_eq!(ResidentStatus::Active.toggled(), ResidentStatus::Inactive);
    }

    #[test]
    fn test_draft_validation() {
        assert_eq!(
            ResidentDraft::new("", "12").validate(),
            Err(ValidationError::MissingName)
        );
        assert_eq!(
            ResidentDraft::new("Ana", "  ").validate(),
            Err(ValidationError::MissingHouseNumber)
        );
        assert!(ResidentDraft::new("Ana", "12").validate().is_ok());
    }

    #[test]
    fn test_draft_drops_blank_provider_slots() {
        let mut draft = ResidentDraft::new("Ana", "12");
        draft.providers = vec![ServiceProvider::default(); PROVIDER_SLOTS];
        draft.providers[1] = ServiceProvider::new("Carlos", "");
        draft.providers[3] = ServiceProvider::new("", "RG 1");

        let filled = draft.filled_providers();
        assert_eq!(filled.len(), 2);
        assert_eq!(filled[0].name, "Carlos");
        assert_eq!(filled[1].document, "RG 1");
    }

    #[test]
    fn test_draft_from_resident_keeps_identity() {
        let draft = ResidentDraft::from(sample());
        assert_eq!(draft.id.as_deref(), Some("7"));
        assert_eq!(draft.created_at, Some(1_700_000_000_000));
        assert_eq!(draft.status, Some(ResidentStatus::Active));
    }

    #[test]
    fn test_storage_usage() {
        let empty = StorageUsage::new(0, 200);
        assert_eq!(empty.percentage, 0.0);
        assert!(!empty.is_critical(85.0));

        let busy = StorageUsage::new(170, 200);
        assert_eq!(busy.percentage, 85.0);
        assert!(busy.is_critical(85.0));
    }
}
