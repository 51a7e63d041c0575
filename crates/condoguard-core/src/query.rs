//! Search and selection over the resident list
//!
//! The register holds a few hundred records at most, so every query is a
//! plain pass over the full list.

use chrono::Duration;

use crate::models::Resident;

/// Residents whose name or house number contains `term`, ignoring case
///
/// An empty term matches everything. Order is preserved.
pub fn filter(residents: &[Resident], term: &str) -> Vec<Resident> {
    let term = term.to_lowercase();
    residents
        .iter()
        .filter(|r| matches(r, &term))
        .cloned()
        .collect()
}

/// `term` must already be lowercase
fn matches(resident: &Resident, term: &str) -> bool {
    resident.name.to_lowercase().contains(term)
        || resident.house_number.to_lowercase().contains(term)
}

/// Residents created within `window` of `now_millis`, whatever their status
///
/// This is the selection rule for the periodic report.
pub fn within_report_window(
    residents: &[Resident],
    now_millis: i64,
    window: Duration,
) -> Vec<Resident> {
    let window_ms = window.num_milliseconds();
    residents
        .iter()
        .filter(|r| now_millis - r.created_at <= window_ms)
        .cloned()
        .collect()
}
