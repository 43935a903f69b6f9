use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::api::rest::extract::ValidatedJson;
use crate::api::rest::response::ApiResponse;
use crate::auth::{AuthUser, Capability};
use crate::engine::{roster, scoring};
use crate::error::AppError;
use crate::models::assignment::{HardwareAdded, HardwareRemoved, PersonnelAdded, PersonnelRemoved};
use crate::models::personnel::Personnel;
use crate::models::report::DutyReport;
use crate::models::shift::{Shift, DEFAULT_DISTANCE_RADIUS_M};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/shift", post(create_shift))
        .route("/shift/:id", delete(delete_shift))
        .route("/shift/:id/add_personnel", post(add_personnel))
        .route("/shift/:id/remove_personnel", post(remove_personnel))
        .route("/shift/:id/add_hardware", post(add_hardware))
        .route("/shift/:id/remove_hardware", post(remove_hardware))
        .route("/shift/:id/report", get(report))
        .route("/shift/:id/availablePersonnel", get(available_personnel))
}

fn validate_shift_window(shift: &CreateShiftRequest) -> Result<(), ValidationError> {
    if shift.start_time < shift.end_time {
        Ok(())
    } else {
        Err(ValidationError::new("time_window")
            .with_message("start_time must be before end_time".into()))
    }
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_shift_window"))]
pub struct CreateShiftRequest {
    #[validate(length(min = 1, message = "Shift name is required"))]
    pub shift_name: String,
    pub duty: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[validate(range(exclusive_min = 0.0, message = "distance_radius must be positive"))]
    pub distance_radius: Option<f64>,
}

async fn create_shift(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateShiftRequest>,
) -> Result<ApiResponse<Shift>, AppError> {
    user.require(Capability::ManageDuties)?;
    state.duty(payload.duty)?;

    let shift = Shift {
        id: Uuid::new_v4(),
        shift_name: payload.shift_name,
        duty: payload.duty,
        start_time: payload.start_time,
        end_time: payload.end_time,
        distance_radius: payload.distance_radius.unwrap_or(DEFAULT_DISTANCE_RADIUS_M),
        hardwares_attached: Vec::new(),
        personnel_assigned: Vec::new(),
        issue_reported: Vec::new(),
        version: 0,
    };

    // Never hold a duty entry while touching `shifts`; readers nest the other way.
    state.shifts.insert(shift.id, shift.clone());
    if let Some(mut duty) = state.duties.get_mut(&shift.duty) {
        duty.shifts.push(shift.id);
    }

    info!(shift_id = %shift.id, duty_id = %shift.duty, "shift created");
    Ok(ApiResponse::created("Shift created successfully", shift))
}

async fn delete_shift(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Value>, AppError> {
    user.require(Capability::ManageDuties)?;
    roster::delete_shift(&state, id).await?;
    Ok(ApiResponse::done("Shift deleted successfully"))
}

#[derive(Debug, Deserialize, Validate)]
pub struct PersonnelArrayRequest {
    pub personnel_array: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct HardwareArrayRequest {
    pub hardware_array: Vec<Uuid>,
}

async fn add_personnel(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<PersonnelArrayRequest>,
) -> Result<ApiResponse<PersonnelAdded>, AppError> {
    user.require(Capability::ManageRoster)?;
    let outcome = roster::add_personnel(&state, id, &payload.personnel_array).await?;
    Ok(ApiResponse::ok("Personnel added to shift", outcome))
}

async fn remove_personnel(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<PersonnelArrayRequest>,
) -> Result<ApiResponse<PersonnelRemoved>, AppError> {
    user.require(Capability::ManageRoster)?;
    let outcome = roster::remove_personnel(&state, id, &payload.personnel_array)?;
    Ok(ApiResponse::ok("Personnel removed from shift", outcome))
}

async fn add_hardware(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<HardwareArrayRequest>,
) -> Result<ApiResponse<HardwareAdded>, AppError> {
    user.require(Capability::ManageRoster)?;
    let outcome = roster::add_hardware(&state, id, &payload.hardware_array).await?;
    Ok(ApiResponse::ok("Hardware attached to shift", outcome))
}

async fn remove_hardware(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<HardwareArrayRequest>,
) -> Result<ApiResponse<HardwareRemoved>, AppError> {
    user.require(Capability::ManageRoster)?;
    let outcome = roster::remove_hardware(&state, id, &payload.hardware_array).await?;
    Ok(ApiResponse::ok("Hardware detached from shift", outcome))
}

async fn report(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<DutyReport>, AppError> {
    user.require(Capability::ViewReports)?;
    let report = scoring::generate_report(&state, id)?;
    Ok(ApiResponse::ok("Report generated successfully", report))
}

async fn available_personnel(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Vec<Personnel>>, AppError> {
    user.require(Capability::ManageRoster)?;
    let available = roster::find_available_personnel(&state, id)?;
    Ok(ApiResponse::ok("Available personnel fetched successfully", available))
}
