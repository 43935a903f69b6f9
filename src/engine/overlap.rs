use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::shift::Shift;
use crate::state::AppState;

/// Half-open interval overlap: `[s1, e1)` and `[s2, e2)` share an instant.
/// Intervals that only touch at an endpoint do not overlap.
pub fn overlaps(
    s1: DateTime<Utc>,
    e1: DateTime<Utc>,
    s2: DateTime<Utc>,
    e2: DateTime<Utc>,
) -> bool {
    s1 < e2 && s2 < e1
}

/// Every shift in the store, across all duties, whose window overlaps
/// `[start, end)`, ordered by start time.
pub fn find_overlapping(
    state: &AppState,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<Uuid>,
) -> Vec<Shift> {
    let mut found: Vec<Shift> = state
        .shifts
        .iter()
        .filter(|entry| Some(*entry.key()) != exclude)
        .filter(|entry| overlaps(start, end, entry.start_time, entry.end_time))
        .map(|entry| entry.value().clone())
        .collect();

    found.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
    found
}
