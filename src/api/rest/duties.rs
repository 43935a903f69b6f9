//! `/duty`: duty creation for administrators and the field-app surface used
//! by assigned personnel to run their shift.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::api::rest::extract::{ValidatedJson, ValidatedQuery};
use crate::api::rest::pagination::{PageInfo, PageQuery};
use crate::api::rest::response::ApiResponse;
use crate::auth::{AuthUser, Capability};
use crate::engine::ingestion::{self, GpsFix};
use crate::error::AppError;
use crate::geo::GeoPoint;
use crate::models::duty::{Duty, DutySummary};
use crate::models::shift::{Issue, ShiftSummary};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/duty", post(create_duty).get(list_assigned_shifts))
        .route("/duty/:shift_id", get(get_shift_details))
        .route("/duty/:shift_id/start_duty", post(start_duty))
        .route("/duty/:shift_id/stop_duty", post(stop_duty))
        .route("/duty/:shift_id/push_gps_data", post(push_gps_data))
        .route("/duty/:shift_id/push_gps_data_bulk", post(push_gps_data_bulk))
        .route("/duty/:shift_id/post_issue", post(post_issue))
}

pub(crate) fn validate_location(location: &str) -> Result<(), ValidationError> {
    location.parse::<GeoPoint>().map(|_| ()).map_err(|err| {
        ValidationError::new("location").with_message(format!("location must be \"lat,lon\": {err}").into())
    })
}

fn validate_duty_window(duty: &CreateDutyRequest) -> Result<(), ValidationError> {
    if duty.start_time < duty.end_time {
        Ok(())
    } else {
        Err(ValidationError::new("time_window")
            .with_message("start_time must be before end_time".into()))
    }
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_duty_window"))]
pub struct CreateDutyRequest {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "venue is required"))]
    pub venue: String,
    #[validate(custom(function = "validate_location"))]
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub note: String,
    pub police_station: Option<String>,
}

async fn create_duty(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateDutyRequest>,
) -> Result<ApiResponse<Duty>, AppError> {
    user.require(Capability::ManageDuties)?;

    let duty = Duty {
        id: Uuid::new_v4(),
        title: payload.title,
        description: payload.description,
        venue: payload.venue,
        location: payload.location,
        start_time: payload.start_time,
        end_time: payload.end_time,
        note: payload.note,
        police_station: payload.police_station,
        shifts: Vec::new(),
    };

    state.duties.insert(duty.id, duty.clone());
    info!(duty_id = %duty.id, title = %duty.title, "duty created");

    Ok(ApiResponse::created("Duty created successfully", duty))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AssignedShiftsQuery {
    #[serde(default = "PageQuery::default_page")]
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: usize,
    #[serde(default = "PageQuery::default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: usize,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct AssignedShifts {
    pub shifts: Vec<ShiftSummary>,
    #[serde(flatten)]
    pub page: PageInfo,
}

/// Upcoming shifts of the caller: those not yet ended, or ending inside the
/// requested window when one is given.
async fn list_assigned_shifts(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedQuery(query): ValidatedQuery<AssignedShiftsQuery>,
) -> Result<ApiResponse<AssignedShifts>, AppError> {
    let personnel_id = user.personnel()?;

    let ends_in_window = |end: DateTime<Utc>| match (query.start_time, query.end_time) {
        (Some(from), Some(to)) => from <= end && end <= to,
        _ => end >= Utc::now(),
    };

    let mut shifts: Vec<ShiftSummary> = state
        .shifts
        .iter()
        .filter(|entry| entry.has_personnel(personnel_id) && ends_in_window(entry.end_time))
        .map(|entry| {
            let duty = state.duties.get(&entry.duty).map(|d| DutySummary::from(d.value()));
            ShiftSummary::new(entry.value(), duty)
        })
        .collect();
    shifts.sort_by_key(|shift| shift.start_time);

    let (shifts, page) = PageQuery::new(query.page, query.limit).slice(shifts);
    Ok(ApiResponse::ok(
        "Shifts fetched successfully",
        AssignedShifts { shifts, page },
    ))
}

async fn get_shift_details(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(shift_id): Path<Uuid>,
) -> Result<ApiResponse<ShiftSummary>, AppError> {
    let personnel_id = user.personnel()?;
    let shift = state.shift(shift_id)?;

    if !shift.has_personnel(personnel_id) {
        return Err(AppError::NotFound("Personnel not assigned to shift".to_string()));
    }

    let duty = state.duties.get(&shift.duty).map(|d| DutySummary::from(d.value()));
    Ok(ApiResponse::ok(
        "Shift fetched successfully",
        ShiftSummary::new(&shift, duty),
    ))
}

#[derive(Debug, Deserialize, Validate)]
pub struct DutyTimeRequest {
    pub time: DateTime<Utc>,
}

async fn start_duty(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(shift_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<DutyTimeRequest>,
) -> Result<ApiResponse<Value>, AppError> {
    let personnel_id = user.personnel()?;
    ingestion::start_duty(&state, shift_id, personnel_id, payload.time)?;
    Ok(ApiResponse::done("Shift started successfully"))
}

async fn stop_duty(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(shift_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<DutyTimeRequest>,
) -> Result<ApiResponse<Value>, AppError> {
    let personnel_id = user.personnel()?;
    ingestion::stop_duty(&state, shift_id, personnel_id, payload.time)?;
    Ok(ApiResponse::done("Shift stopped successfully"))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Validate)]
pub struct GpsRecord {
    #[validate(range(min = -90.0, max = 90.0, message = "latitude out of range"))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "longitude out of range"))]
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}

impl From<GpsRecord> for GpsFix {
    fn from(record: GpsRecord) -> Self {
        GpsFix {
            latitude: record.latitude,
            longitude: record.longitude,
            timestamp: record.timestamp,
        }
    }
}

async fn push_gps_data(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(shift_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<GpsRecord>,
) -> Result<ApiResponse<Value>, AppError> {
    let personnel_id = user.personnel()?;
    ingestion::push_gps(&state, shift_id, personnel_id, payload.into())?;
    Ok(ApiResponse::done("GPS data pushed successfully"))
}

#[derive(Debug, Deserialize, Validate)]
pub struct GpsBulkRequest {
    #[validate(length(min = 1, message = "gps_data must not be empty"), nested)]
    pub gps_data: Vec<GpsRecord>,
}

async fn push_gps_data_bulk(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(shift_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<GpsBulkRequest>,
) -> Result<ApiResponse<Value>, AppError> {
    let personnel_id = user.personnel()?;
    let fixes: Vec<GpsFix> = payload.gps_data.into_iter().map(GpsFix::from).collect();
    ingestion::push_gps_bulk(&state, shift_id, personnel_id, &fixes)?;
    Ok(ApiResponse::done("GPS data pushed successfully"))
}

#[derive(Debug, Deserialize, Validate)]
pub struct PostIssueRequest {
    #[validate(length(min = 1, message = "issue_category is required"))]
    pub issue_category: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
}

async fn post_issue(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(shift_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<PostIssueRequest>,
) -> Result<ApiResponse<Issue>, AppError> {
    let personnel_id = user.personnel()?;
    let issue = ingestion::report_issue(
        &state,
        shift_id,
        personnel_id,
        payload.issue_category,
        payload.description,
    )?;
    Ok(ApiResponse::ok("Issue reported successfully", issue))
}
