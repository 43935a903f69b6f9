use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::GeoPoint;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Duty {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub venue: String,
    /// `"lat,lon"` of the venue; the geofence centre for every shift of the duty.
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub note: String,
    pub police_station: Option<String>,
    pub shifts: Vec<Uuid>,
}

impl Duty {
    pub fn target(&self) -> Result<GeoPoint, String> {
        self.location.parse()
    }
}

/// Duty fields embedded in shift listings and reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DutySummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub venue: String,
    pub location: String,
    pub note: String,
}

impl From<&Duty> for DutySummary {
    fn from(duty: &Duty) -> Self {
        Self {
            id: duty.id,
            title: duty.title.clone(),
            description: duty.description.clone(),
            venue: duty.venue.clone(),
            location: duty.location.clone(),
            note: duty.note.clone(),
        }
    }
}
