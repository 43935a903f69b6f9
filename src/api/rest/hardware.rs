//! Device registry and the reader-facing ingestion endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::api::rest::extract::{ValidatedJson, ValidatedQuery};
use crate::api::rest::pagination::{PageInfo, PageQuery};
use crate::api::rest::response::ApiResponse;
use crate::auth::{AuthUser, Capability};
use crate::engine::ingestion::{self, RfidScan};
use crate::error::AppError;
use crate::models::hardware::{Hardware, HardwareStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/hardware", post(register_hardware).get(list_hardware))
        .route("/hardware/pushData", post(push_data))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterHardwareRequest {
    #[validate(length(min = 1, message = "hardware_id is required"))]
    pub hardware_id: String,
    #[validate(length(min = 8, message = "secret must be at least 8 characters"))]
    pub secret: String,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "type is required"))]
    pub kind: String,
}

async fn register_hardware(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<RegisterHardwareRequest>,
) -> Result<ApiResponse<Hardware>, AppError> {
    user.require(Capability::ManageHardware)?;

    let _roster = state.roster_lock.lock().await;

    if state.hardware_by_external_id(&payload.hardware_id).is_some() {
        return Err(AppError::Conflict("hardware_id already exists".to_string()));
    }

    let hardware = Hardware {
        id: Uuid::new_v4(),
        hardware_id: payload.hardware_id,
        secret: payload.secret,
        name: payload.name,
        description: payload.description,
        kind: payload.kind,
        status: HardwareStatus::Idle,
        attached_to_shift: None,
    };

    state.hardware.insert(hardware.id, hardware.clone());
    info!(id = %hardware.id, hardware_id = %hardware.hardware_id, "hardware registered");

    Ok(ApiResponse::created("Hardware registered successfully", hardware))
}

#[derive(Debug, Serialize)]
pub struct HardwarePage {
    pub hardware: Vec<Hardware>,
    #[serde(flatten)]
    pub page: PageInfo,
}

async fn list_hardware(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> Result<ApiResponse<HardwarePage>, AppError> {
    user.require(Capability::ManageRoster)?;

    let mut hardware: Vec<Hardware> = state
        .hardware
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    hardware.sort_by(|a, b| a.hardware_id.cmp(&b.hardware_id));

    let (hardware, page) = query.slice(hardware);
    Ok(ApiResponse::ok(
        "Hardware fetched successfully",
        HardwarePage { hardware, page },
    ))
}

/// Payload posted by a reader for each tag it scans. `data` is the
/// personnel id encoded on the tag.
#[derive(Debug, Deserialize, Validate)]
pub struct PushDataRequest {
    #[validate(length(min = 1, message = "hardware_id is required"))]
    pub hardware_id: String,
    #[validate(length(min = 1, message = "secret is required"))]
    pub secret: String,
    pub timestamp: DateTime<Utc>,
    pub data: Uuid,
}

/// Readers authenticate with their own secret, not a bearer token.
async fn push_data(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<PushDataRequest>,
) -> Result<ApiResponse<Value>, AppError> {
    ingestion::push_rfid(
        &state,
        RfidScan {
            hardware_id: payload.hardware_id,
            secret: payload.secret,
            timestamp: payload.timestamp,
            personnel_id: payload.data,
        },
    )?;

    Ok(ApiResponse::done("Data pushed successfully"))
}
