//! Resident id allocation
//!
//! Ids are decimal strings in `1..=1000`. The next id is one past the
//! largest numeric id on record; past the ceiling it wraps to `"1"`.
//!
//! The wrap does not look for a free slot. If low-numbered residents are
//! still on record when the ceiling is hit, the allocated id collides with
//! one of them and the following save replaces that record. With the
//! advisory capacity at 200 the ceiling is not expected to be reached.

use crate::models::Resident;

/// Highest id handed out before wrapping
pub const MAX_ID: u32 = 1000;

/// Allocate the id for a new resident
pub fn next_id(existing: &[Resident]) -> String {
    next_id_from(existing.iter().map(|r| r.id.as_str()))
}

/// Allocate the next id given the ids currently in use
///
/// Ids that do not parse as integers are ignored.
pub fn next_id_from<'a>(ids: impl IntoIterator<Item = &'a str>) -> String {
    let max = ids
        .into_iter()
        .filter_map(|id| id.trim().parse::<u32>().ok())
        .max()
        .unwrap_or(0);

    let next = if max >= MAX_ID { 1 } else { max + 1 };
    next.to_string()
}

/// Normalize a user-typed id (`#007`, `007`, `7`) to its stored form
pub fn normalize_id(input: &str) -> String {
    let trimmed = input.trim().trim_start_matches('#');
    match trimmed.parse::<u32>() {
        Ok(n) => n.to_string(),
        Err(_) => trimmed.to_string(),
    }
}
