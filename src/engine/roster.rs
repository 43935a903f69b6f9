use std::collections::HashSet;

use tracing::{info, warn};
use uuid::Uuid;

use crate::engine::overlap::find_overlapping;
use crate::error::AppError;
use crate::models::assignment::{
    HardwareAdded, HardwareRemoved, PersonnelAdded, PersonnelRemoved, ShiftClash,
};
use crate::models::personnel::Personnel;
use crate::models::shift::PersonnelAssignment;
use crate::state::AppState;

fn distinct(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Adds personnel to a shift unless they already hold a shift overlapping it.
///
/// The overlap check and the append run under the roster lock, so two calls
/// racing to book the same person onto overlapping shifts cannot both win.
pub async fn add_personnel(
    state: &AppState,
    shift_id: Uuid,
    candidates: &[Uuid],
) -> Result<PersonnelAdded, AppError> {
    let _roster = state.roster_lock.lock().await;

    let target = state.shift(shift_id)?;
    let overlapping = find_overlapping(state, target.start_time, target.end_time, Some(shift_id));

    let mut outcome = PersonnelAdded::default();

    for candidate in distinct(candidates) {
        if target.has_personnel(candidate) {
            outcome.sid_already_assigned.push(candidate);
            continue;
        }

        if !state.personnel.contains_key(&candidate) {
            outcome.sid_not_added.push(candidate);
            continue;
        }

        if let Some(other) = overlapping.iter().find(|shift| shift.has_personnel(candidate)) {
            warn!(
                shift_id = %shift_id,
                personnel_id = %candidate,
                clashing_shift = %other.id,
                "personnel already booked on an overlapping shift"
            );
            outcome.sid_not_added_because_clashing_shifts.push(ShiftClash {
                sid: candidate,
                clashing_shift: other.id,
                clashing_shift_name: other.shift_name.clone(),
                clashing_shift_duty: other.duty,
            });
            continue;
        }

        outcome.sid_added.push(candidate);
    }

    if !outcome.sid_added.is_empty() {
        state.update_shift(shift_id, |shift| {
            shift.personnel_assigned.extend(
                outcome
                    .sid_added
                    .iter()
                    .map(|id| PersonnelAssignment::pending(*id)),
            );
            Ok(())
        })?;
    }

    let metrics = &state.metrics;
    metrics.record_roster("personnel_add", "added", outcome.sid_added.len());
    metrics.record_roster("personnel_add", "already_assigned", outcome.sid_already_assigned.len());
    metrics.record_roster("personnel_add", "not_found", outcome.sid_not_added.len());
    metrics.record_roster(
        "personnel_add",
        "clash",
        outcome.sid_not_added_because_clashing_shifts.len(),
    );

    info!(
        shift_id = %shift_id,
        added = outcome.sid_added.len(),
        clashes = outcome.sid_not_added_because_clashing_shifts.len(),
        "personnel added to shift"
    );

    Ok(outcome)
}

/// Removes assignments, telemetry included. No business rule gates removal.
pub fn remove_personnel(
    state: &AppState,
    shift_id: Uuid,
    personnel: &[Uuid],
) -> Result<PersonnelRemoved, AppError> {
    let requested = distinct(personnel);

    let outcome = state.update_shift(shift_id, |shift| {
        let mut outcome = PersonnelRemoved::default();
        for id in requested {
            if shift.has_personnel(id) {
                shift.personnel_assigned.retain(|a| a.personnel != id);
                outcome.personnel_removed.push(id);
            } else {
                outcome.personnel_not_removed.push(id);
            }
        }
        Ok(outcome)
    })?;

    state
        .metrics
        .record_roster("personnel_remove", "removed", outcome.personnel_removed.len());
    info!(
        shift_id = %shift_id,
        removed = outcome.personnel_removed.len(),
        "personnel removed from shift"
    );

    Ok(outcome)
}

/// Attaches idle units to a shift. Units occupied by another shift are
/// reported back, never moved.
pub async fn add_hardware(
    state: &AppState,
    shift_id: Uuid,
    hardware: &[Uuid],
) -> Result<HardwareAdded, AppError> {
    let _roster = state.roster_lock.lock().await;

    let target = state.shift(shift_id)?;
    let mut outcome = HardwareAdded::default();

    for id in distinct(hardware) {
        let Some(unit) = state.hardware.get(&id).map(|unit| unit.value().clone()) else {
            outcome.hardware_not_added.push(id);
            continue;
        };

        if unit.attached_to_shift == Some(shift_id) || target.hardwares_attached.contains(&id) {
            outcome.hardware_already_attached.push(id);
        } else if unit.is_idle() {
            outcome.hardware_added.push(id);
        } else {
            outcome.hardware_not_added.push(id);
        }
    }

    if !outcome.hardware_added.is_empty() {
        state.update_shift(shift_id, |shift| {
            shift
                .hardwares_attached
                .extend(outcome.hardware_added.iter().copied());
            Ok(())
        })?;

        for id in &outcome.hardware_added {
            if let Some(mut unit) = state.hardware.get_mut(id) {
                unit.attach(shift_id);
            }
        }
    }

    state
        .metrics
        .record_roster("hardware_add", "added", outcome.hardware_added.len());
    state
        .metrics
        .record_roster("hardware_add", "not_added", outcome.hardware_not_added.len());
    info!(
        shift_id = %shift_id,
        added = outcome.hardware_added.len(),
        refused = outcome.hardware_not_added.len(),
        "hardware attached to shift"
    );

    Ok(outcome)
}

pub async fn remove_hardware(
    state: &AppState,
    shift_id: Uuid,
    hardware: &[Uuid],
) -> Result<HardwareRemoved, AppError> {
    let _roster = state.roster_lock.lock().await;
    let requested = distinct(hardware);

    let outcome = state.update_shift(shift_id, |shift| {
        let mut outcome = HardwareRemoved::default();
        for id in requested {
            if shift.hardwares_attached.contains(&id) {
                shift.hardwares_attached.retain(|attached| *attached != id);
                outcome.hardware_removed.push(id);
            } else {
                outcome.hardware_not_removed.push(id);
            }
        }
        Ok(outcome)
    })?;

    release_hardware(state, shift_id, &outcome.hardware_removed);

    state
        .metrics
        .record_roster("hardware_remove", "removed", outcome.hardware_removed.len());
    info!(
        shift_id = %shift_id,
        removed = outcome.hardware_removed.len(),
        "hardware detached from shift"
    );

    Ok(outcome)
}

fn release_hardware(state: &AppState, shift_id: Uuid, ids: &[Uuid]) {
    for id in ids {
        if let Some(mut unit) = state.hardware.get_mut(id) {
            if unit.attached_to_shift == Some(shift_id) {
                unit.release();
            }
        }
    }
}

/// Hard-deletes a shift, unlinking it from its duty and freeing its hardware.
/// Recorded telemetry goes with it.
pub async fn delete_shift(state: &AppState, shift_id: Uuid) -> Result<(), AppError> {
    let _roster = state.roster_lock.lock().await;

    let (_, shift) = state
        .shifts
        .remove(&shift_id)
        .ok_or_else(|| AppError::NotFound("Shift not found".to_string()))?;

    if let Some(mut duty) = state.duties.get_mut(&shift.duty) {
        duty.shifts.retain(|id| *id != shift_id);
    }
    release_hardware(state, shift_id, &shift.hardwares_attached);

    info!(shift_id = %shift_id, duty_id = %shift.duty, "shift deleted");
    Ok(())
}

/// Personnel free for the whole window of `shift_id`: everyone not assigned to
/// any shift overlapping it, the shift itself included.
pub fn find_available_personnel(
    state: &AppState,
    shift_id: Uuid,
) -> Result<Vec<Personnel>, AppError> {
    let target = state.shift(shift_id)?;

    let busy: HashSet<Uuid> = find_overlapping(state, target.start_time, target.end_time, None)
        .iter()
        .flat_map(|shift| shift.personnel_assigned.iter().map(|a| a.personnel))
        .collect();

    let mut available: Vec<Personnel> = state
        .personnel
        .iter()
        .filter(|entry| !busy.contains(entry.key()))
        .map(|entry| entry.value().clone())
        .collect();

    available.sort_by(|a, b| a.sid.cmp(&b.sid));
    Ok(available)
}
