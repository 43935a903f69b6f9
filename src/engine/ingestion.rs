use chrono::{DateTime, Utc};
use subtle::ConstantTimeEq;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::geo::{haversine_m, GeoPoint};
use crate::models::shift::{
    AssignmentStatus, GpsObservation, Issue, PersonnelAssignment, RfidObservation,
};
use crate::state::AppState;

/// One location fix as reported by the personnel app.
#[derive(Debug, Clone, Copy)]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}

/// One tag read from a fixed reader, authenticated by the reader's own secret.
#[derive(Debug, Clone)]
pub struct RfidScan {
    pub hardware_id: String,
    pub secret: String,
    pub timestamp: DateTime<Utc>,
    pub personnel_id: Uuid,
}

/// Constant-time over the secret bytes; only the length leaks.
fn secret_matches(stored: &str, presented: &str) -> bool {
    stored.as_bytes().ct_eq(presented.as_bytes()).into()
}

fn not_assigned() -> AppError {
    AppError::NotFound("Personnel not assigned to shift".to_string())
}

fn assignment_in(
    assignments: &mut [PersonnelAssignment],
    personnel_id: Uuid,
) -> Result<&mut PersonnelAssignment, AppError> {
    assignments
        .iter_mut()
        .find(|assignment| assignment.personnel == personnel_id)
        .ok_or_else(not_assigned)
}

/// Telemetry is only accepted while the assignment is running.
fn ensure_accepting(state: &AppState, assignment: &PersonnelAssignment) -> Result<(), AppError> {
    let (reason, message) = match assignment.status {
        AssignmentStatus::Started => return Ok(()),
        AssignmentStatus::Pending => ("not_started", "Duty not started yet."),
        AssignmentStatus::Completed => ("stopped", "Duty already stopped"),
        AssignmentStatus::Paused => ("paused", "Duty is paused"),
    };

    state
        .metrics
        .telemetry_rejected_total
        .with_label_values(&[reason])
        .inc();
    warn!(personnel_id = %assignment.personnel, reason, "telemetry rejected");

    Err(AppError::StateConflict(message.to_string()))
}

/// Resolves the geofence centre for a shift from its duty.
fn duty_target(state: &AppState, shift_id: Uuid) -> Result<GeoPoint, AppError> {
    let duty_id = state
        .shifts
        .get(&shift_id)
        .map(|shift| shift.duty)
        .ok_or_else(|| AppError::NotFound("Shift not found".to_string()))?;

    state
        .duty(duty_id)?
        .target()
        .map_err(|err| AppError::Internal(format!("duty {duty_id} has malformed location: {err}")))
}

fn observe(fix: &GpsFix, target: &GeoPoint) -> Result<GpsObservation, AppError> {
    let point = GeoPoint::new(fix.latitude, fix.longitude).map_err(AppError::validation)?;

    Ok(GpsObservation {
        timestamp: fix.timestamp,
        location: point.to_string(),
        distance_from_duty_location: Some(haversine_m(&point, target)),
    })
}

pub fn start_duty(
    state: &AppState,
    shift_id: Uuid,
    personnel_id: Uuid,
    time: DateTime<Utc>,
) -> Result<(), AppError> {
    state.update_shift(shift_id, |shift| {
        let assignment = assignment_in(&mut shift.personnel_assigned, personnel_id)?;
        assignment.starting_time = Some(time);
        assignment.status = AssignmentStatus::Started;
        Ok(())
    })?;

    info!(shift_id = %shift_id, personnel_id = %personnel_id, %time, "duty started");
    Ok(())
}

pub fn stop_duty(
    state: &AppState,
    shift_id: Uuid,
    personnel_id: Uuid,
    time: DateTime<Utc>,
) -> Result<(), AppError> {
    state.update_shift(shift_id, |shift| {
        let assignment = assignment_in(&mut shift.personnel_assigned, personnel_id)?;
        assignment.ending_time = Some(time);
        assignment.status = AssignmentStatus::Completed;
        Ok(())
    })?;

    info!(shift_id = %shift_id, personnel_id = %personnel_id, %time, "duty stopped");
    Ok(())
}

pub fn push_gps(
    state: &AppState,
    shift_id: Uuid,
    personnel_id: Uuid,
    fix: GpsFix,
) -> Result<GpsObservation, AppError> {
    let target = duty_target(state, shift_id)?;

    let observation = state.update_shift(shift_id, |shift| {
        let assignment = assignment_in(&mut shift.personnel_assigned, personnel_id)?;
        ensure_accepting(state, assignment)?;

        let observation = observe(&fix, &target)?;
        assignment.gps_data.push(observation.clone());
        Ok(observation)
    })?;

    state
        .metrics
        .telemetry_ingested_total
        .with_label_values(&["gps"])
        .inc();
    debug!(
        shift_id = %shift_id,
        personnel_id = %personnel_id,
        distance_m = observation.distance_from_duty_location,
        "gps fix stored"
    );

    Ok(observation)
}

/// Appends an offline-buffered batch as one unit: every fix is validated and
/// measured before anything is stored, and a bad fix rejects the whole batch.
pub fn push_gps_bulk(
    state: &AppState,
    shift_id: Uuid,
    personnel_id: Uuid,
    fixes: &[GpsFix],
) -> Result<usize, AppError> {
    let target = duty_target(state, shift_id)?;

    let stored = state.update_shift(shift_id, |shift| {
        let assignment = assignment_in(&mut shift.personnel_assigned, personnel_id)?;
        ensure_accepting(state, assignment)?;

        let batch = fixes
            .iter()
            .map(|fix| observe(fix, &target))
            .collect::<Result<Vec<_>, _>>()?;

        let stored = batch.len();
        assignment.gps_data.extend(batch);
        Ok(stored)
    })?;

    state
        .metrics
        .telemetry_ingested_total
        .with_label_values(&["gps_bulk"])
        .inc_by(stored as u64);
    info!(shift_id = %shift_id, personnel_id = %personnel_id, stored, "gps batch stored");

    Ok(stored)
}

/// Attributes a reader's tag scan to a person on the shift the reader is
/// attached to. The secret check and the attachment lookup read the hardware
/// record once; a detach racing this call may still land the scan.
pub fn push_rfid(state: &AppState, scan: RfidScan) -> Result<RfidObservation, AppError> {
    let hardware = state
        .hardware_by_external_id(&scan.hardware_id)
        .ok_or_else(|| AppError::NotFound("Hardware not found".to_string()))?;

    if !secret_matches(&hardware.secret, &scan.secret) {
        state
            .metrics
            .telemetry_rejected_total
            .with_label_values(&["secret_mismatch"])
            .inc();
        warn!(hardware_id = %scan.hardware_id, "rfid push with wrong secret");
        return Err(AppError::Unauthorized("Secret mismatch".to_string()));
    }

    let shift_id = hardware
        .attached_to_shift
        .ok_or_else(|| AppError::BadRequest("Hardware not attached to any shift".to_string()))?;

    let observation = RfidObservation {
        timestamp: scan.timestamp,
        hardware_id: hardware.id,
    };

    state.update_shift(shift_id, |shift| {
        let assignment = assignment_in(&mut shift.personnel_assigned, scan.personnel_id)?;
        assignment.rfid_data.push(observation.clone());
        Ok(())
    })?;

    state
        .metrics
        .telemetry_ingested_total
        .with_label_values(&["rfid"])
        .inc();
    debug!(
        shift_id = %shift_id,
        personnel_id = %scan.personnel_id,
        hardware_id = %scan.hardware_id,
        "rfid scan stored"
    );

    Ok(observation)
}

pub fn report_issue(
    state: &AppState,
    shift_id: Uuid,
    personnel_id: Uuid,
    category: String,
    description: String,
) -> Result<Issue, AppError> {
    let issue = Issue {
        issue_category: category,
        issue_description: description,
        reported_by: personnel_id,
        reported_at: Utc::now(),
    };

    state.update_shift(shift_id, |shift| {
        if !shift.has_personnel(personnel_id) {
            return Err(not_assigned());
        }
        shift.issue_reported.push(issue.clone());
        Ok(())
    })?;

    info!(
        shift_id = %shift_id,
        personnel_id = %personnel_id,
        category = %issue.issue_category,
        "issue reported"
    );
    Ok(issue)
}
