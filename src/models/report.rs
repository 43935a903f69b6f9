use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::duty::DutySummary;
use crate::models::shift::{AssignmentStatus, Issue};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ScoreBreakdown {
    pub gps_score: f64,
    pub rfid_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonnelAttendance {
    pub personnel: Uuid,
    pub sid: Option<String>,
    pub official_name: Option<String>,
    pub designation: Option<String>,
    pub duty_status: AssignmentStatus,
    pub status: AttendanceStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub gps_count: usize,
    pub rfid_count: usize,
    pub score: f64,
    pub score_breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, Serialize)]
pub struct HardwareSummary {
    pub id: Uuid,
    pub hardware_id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DutyReport {
    pub shift_id: Uuid,
    pub shift_name: String,
    pub shift_start_time: DateTime<Utc>,
    pub shift_end_time: DateTime<Utc>,
    pub duty: Option<DutySummary>,
    pub distance_radius: f64,
    pub personnel_count: usize,
    pub hardware_count: usize,
    pub issue_count: usize,
    /// Mean of per-person scores; `None` when nobody is assigned.
    pub duty_score: Option<f64>,
    pub hardware: Vec<HardwareSummary>,
    pub issues: Vec<Issue>,
    pub personnel: Vec<PersonnelAttendance>,
}

