use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::geo::{haversine_m, GeoPoint};
use crate::models::duty::DutySummary;
use crate::models::report::{
    AttendanceStatus, DutyReport, HardwareSummary, PersonnelAttendance, ScoreBreakdown,
};
use crate::models::shift::{GpsObservation, PersonnelAssignment};
use crate::state::AppState;

const RFID_SCORE_CAP: f64 = 25.0;
const MAX_SCORE: f64 = 100.0;

/// Derived attendance for one assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Attendance {
    pub status: AttendanceStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// One point per scan, capped.
pub fn rfid_score(scans: usize) -> f64 {
    (scans as f64).min(RFID_SCORE_CAP)
}

/// Mean of `1 - distance / radius` over the fixes, as a percentage capped at
/// 100. Fixes outside the geofence count negatively; only the mean is capped.
pub fn gps_score(distances: &[f64], radius: f64) -> f64 {
    if distances.is_empty() || radius <= 0.0 {
        return 0.0;
    }

    let mean = distances
        .iter()
        .map(|distance| 1.0 - distance / radius)
        .sum::<f64>()
        / distances.len() as f64;

    (mean * 100.0).min(MAX_SCORE)
}

/// Stored distance, or a fresh one for records that predate the field.
/// `None` when neither is available.
fn fix_distance(observation: &GpsObservation, target: Option<&GeoPoint>) -> Option<f64> {
    if let Some(distance) = observation.distance_from_duty_location {
        return Some(distance);
    }

    let point = observation.location.parse::<GeoPoint>().ok()?;
    target.map(|target| haversine_m(&point, target))
}

/// Earliest and latest instant over both telemetry streams, independent of
/// the order observations arrived in.
fn presence_window(
    assignment: &PersonnelAssignment,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let timestamps = assignment
        .gps_data
        .iter()
        .map(|gps| gps.timestamp)
        .chain(assignment.rfid_data.iter().map(|rfid| rfid.timestamp));

    timestamps.fold(None, |window, at| match window {
        None => Some((at, at)),
        Some((start, end)) => Some((start.min(at), end.max(at))),
    })
}

pub fn score_assignment(
    assignment: &PersonnelAssignment,
    radius: f64,
    target: Option<&GeoPoint>,
) -> Attendance {
    let Some((start, end)) = presence_window(assignment) else {
        return Attendance {
            status: AttendanceStatus::Absent,
            start_time: None,
            end_time: None,
            score: 0.0,
            breakdown: ScoreBreakdown::default(),
        };
    };

    let distances: Vec<f64> = assignment
        .gps_data
        .iter()
        .filter_map(|gps| fix_distance(gps, target))
        .collect();

    let breakdown = ScoreBreakdown {
        gps_score: gps_score(&distances, radius),
        rfid_score: rfid_score(assignment.rfid_data.len()),
    };

    Attendance {
        status: AttendanceStatus::Present,
        start_time: Some(start),
        end_time: Some(end),
        score: (breakdown.gps_score + breakdown.rfid_score).clamp(0.0, MAX_SCORE),
        breakdown,
    }
}

/// Arithmetic mean, absent personnel included as 0. `None` for an empty roster.
pub fn duty_score(scores: &[f64]) -> Option<f64> {
    if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

/// Builds the attendance report for a shift from its stored telemetry.
/// Read-only; recomputed on every call.
pub fn generate_report(state: &AppState, shift_id: Uuid) -> Result<DutyReport, AppError> {
    let started = Instant::now();

    let shift = state.shift(shift_id)?;
    let duty = state.duties.get(&shift.duty).map(|duty| duty.value().clone());
    let target = duty.as_ref().and_then(|duty| duty.target().ok());

    let personnel: Vec<PersonnelAttendance> = shift
        .personnel_assigned
        .iter()
        .map(|assignment| {
            let attendance = score_assignment(assignment, shift.distance_radius, target.as_ref());
            let profile = state
                .personnel
                .get(&assignment.personnel)
                .map(|p| p.value().clone());

            PersonnelAttendance {
                personnel: assignment.personnel,
                sid: profile.as_ref().map(|p| p.sid.clone()),
                official_name: profile.as_ref().map(|p| p.official_name.clone()),
                designation: profile.as_ref().map(|p| p.designation.clone()),
                duty_status: assignment.status,
                status: attendance.status,
                start_time: attendance.start_time,
                end_time: attendance.end_time,
                gps_count: assignment.gps_data.len(),
                rfid_count: assignment.rfid_data.len(),
                score: attendance.score,
                score_breakdown: attendance.breakdown,
            }
        })
        .collect();

    let hardware = shift
        .hardwares_attached
        .iter()
        .map(|id| {
            let unit = state.hardware.get(id);
            HardwareSummary {
                id: *id,
                hardware_id: unit.as_ref().map(|u| u.hardware_id.clone()),
                name: unit.as_ref().map(|u| u.name.clone()),
            }
        })
        .collect();

    let scores: Vec<f64> = personnel.iter().map(|p| p.score).collect();

    let report = DutyReport {
        shift_id: shift.id,
        shift_name: shift.shift_name.clone(),
        shift_start_time: shift.start_time,
        shift_end_time: shift.end_time,
        duty: duty.as_ref().map(DutySummary::from),
        distance_radius: shift.distance_radius,
        personnel_count: shift.personnel_assigned.len(),
        hardware_count: shift.hardwares_attached.len(),
        issue_count: shift.issue_reported.len(),
        duty_score: duty_score(&scores),
        hardware,
        issues: shift.issue_reported.clone(),
        personnel,
    };

    state
        .metrics
        .report_latency_seconds
        .observe(started.elapsed().as_secs_f64());
    info!(
        shift_id = %shift_id,
        personnel = report.personnel_count,
        duty_score = report.duty_score,
        "attendance report generated"
    );

    Ok(report)
}
