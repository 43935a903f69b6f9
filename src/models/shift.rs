use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::duty::DutySummary;

pub const DEFAULT_DISTANCE_RADIUS_M: f64 = 250.0;

fn default_distance_radius() -> f64 {
    DEFAULT_DISTANCE_RADIUS_M
}

/// Lifecycle of one person's attendance on a shift.
///
/// `Paused` is accepted in stored data but no operation moves an assignment into it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    #[default]
    Pending,
    Started,
    Paused,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpsObservation {
    pub timestamp: DateTime<Utc>,
    /// Raw `"lat,lon"` as reported by the device.
    pub location: String,
    /// Meters to the duty location, computed once at ingestion. Older records may lack it.
    #[serde(default)]
    pub distance_from_duty_location: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RfidObservation {
    pub timestamp: DateTime<Utc>,
    /// Internal id of the reader that produced the scan.
    pub hardware_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonnelAssignment {
    pub personnel: Uuid,
    #[serde(default)]
    pub status: AssignmentStatus,
    pub starting_time: Option<DateTime<Utc>>,
    pub ending_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub gps_data: Vec<GpsObservation>,
    #[serde(default)]
    pub rfid_data: Vec<RfidObservation>,
}

impl PersonnelAssignment {
    pub fn pending(personnel: Uuid) -> Self {
        Self {
            personnel,
            status: AssignmentStatus::Pending,
            starting_time: None,
            ending_time: None,
            gps_data: Vec::new(),
            rfid_data: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub issue_category: String,
    /// Rendered as `description`, the name the field app posts it under.
    #[serde(rename = "description", alias = "issue_description")]
    pub issue_description: String,
    pub reported_by: Uuid,
    pub reported_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    pub id: Uuid,
    pub shift_name: String,
    pub duty: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Geofence radius in meters used for GPS scoring.
    #[serde(default = "default_distance_radius")]
    pub distance_radius: f64,
    #[serde(default)]
    pub hardwares_attached: Vec<Uuid>,
    #[serde(default)]
    pub personnel_assigned: Vec<PersonnelAssignment>,
    #[serde(default)]
    pub issue_reported: Vec<Issue>,
    /// Bumped on every committed mutation.
    #[serde(default)]
    pub version: u64,
}

impl Shift {
    pub fn assignment(&self, personnel: Uuid) -> Option<&PersonnelAssignment> {
        self.personnel_assigned
            .iter()
            .find(|assignment| assignment.personnel == personnel)
    }

    pub fn has_personnel(&self, personnel: Uuid) -> bool {
        self.assignment(personnel).is_some()
    }
}

/// A shift as shown to assigned personnel: no roster, no hardware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftSummary {
    pub id: Uuid,
    pub shift_name: String,
    pub duty: Option<DutySummary>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub distance_radius: f64,
}

impl ShiftSummary {
    pub fn new(shift: &Shift, duty: Option<DutySummary>) -> Self {
        Self {
            id: shift.id,
            shift_name: shift.shift_name.clone(),
            duty,
            start_time: shift.start_time,
            end_time: shift.end_time,
            distance_radius: shift.distance_radius,
        }
    }
}
