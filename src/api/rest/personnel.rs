use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::Router;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::api::rest::extract::{ValidatedJson, ValidatedQuery};
use crate::api::rest::pagination::{PageInfo, PageQuery};
use crate::api::rest::response::ApiResponse;
use crate::auth::{AuthUser, Capability, Role};
use crate::error::AppError;
use crate::models::personnel::{Personnel, PersonnelDeleted, PersonnelProfile, User};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/personnel", post(create_personnel).get(list_personnel))
        .route("/personnel/search", get(search_personnel))
        .route("/personnel/bulk_delete", delete(bulk_delete_personnel))
        .route("/personnel/:sid", get(get_personnel).delete(delete_personnel))
}

fn profile(state: &AppState, personnel: Personnel) -> PersonnelProfile {
    let user = personnel
        .user
        .and_then(|id| state.users.get(&id).map(|user| user.value().clone()));
    PersonnelProfile::new(personnel, user)
}

fn sorted_profiles(
    state: &AppState,
    matches: impl Fn(&Personnel) -> bool,
) -> Vec<PersonnelProfile> {
    let mut personnel: Vec<Personnel> = state
        .personnel
        .iter()
        .filter(|entry| matches(entry.value()))
        .map(|entry| entry.value().clone())
        .collect();
    personnel.sort_by(|a, b| a.sid.cmp(&b.sid));

    personnel
        .into_iter()
        .map(|personnel| profile(state, personnel))
        .collect()
}

/// Removes the record with badge id `sid` and its login account.
fn remove_by_sid(state: &AppState, sid: &str) -> Option<(Personnel, Option<User>)> {
    let id = state
        .personnel
        .iter()
        .find(|entry| entry.sid == sid)
        .map(|entry| *entry.key())?;

    let (_, personnel) = state.personnel.remove(&id)?;
    let user = personnel
        .user
        .and_then(|user_id| state.users.remove(&user_id))
        .map(|(_, user)| user);

    Some((personnel, user))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePersonnelRequest {
    #[validate(length(min = 1, message = "sid is required"))]
    pub sid: String,
    #[validate(length(min = 1, message = "official_name is required"))]
    pub official_name: String,
    #[validate(length(min = 1, message = "designation is required"))]
    pub designation: String,
    #[serde(default)]
    pub photograph: String,
    pub dob: NaiveDate,
    #[serde(default)]
    pub blood_group: String,
    #[serde(default)]
    pub identification_mark: String,
    #[validate(length(min = 1, message = "posted_at is required"))]
    pub posted_at: String,
    #[serde(default)]
    pub address: String,
}

/// Registers a person together with the login account the field app uses.
/// The account's username is the badge id.
async fn create_personnel(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreatePersonnelRequest>,
) -> Result<ApiResponse<PersonnelProfile>, AppError> {
    user.require(Capability::ManagePersonnel)?;

    let _roster = state.roster_lock.lock().await;

    if state.personnel.iter().any(|entry| entry.sid == payload.sid) {
        return Err(AppError::Conflict("sid already exists".to_string()));
    }

    let account = User {
        id: Uuid::new_v4(),
        username: payload.sid.clone(),
        name: payload.official_name.clone(),
        role: Role::Personnel,
        last_login: None,
    };

    let personnel = Personnel {
        id: Uuid::new_v4(),
        sid: payload.sid,
        user: Some(account.id),
        official_name: payload.official_name,
        designation: payload.designation,
        photograph: payload.photograph,
        dob: payload.dob,
        blood_group: payload.blood_group,
        identification_mark: payload.identification_mark,
        posted_at: payload.posted_at,
        address: payload.address,
    };

    state.users.insert(account.id, account.clone());
    state.personnel.insert(personnel.id, personnel.clone());
    info!(personnel_id = %personnel.id, sid = %personnel.sid, "personnel registered");

    Ok(ApiResponse::created(
        "Personnel created successfully",
        PersonnelProfile::new(personnel, Some(account)),
    ))
}

#[derive(Debug, Serialize)]
pub struct PersonnelPage {
    pub personnel: Vec<PersonnelProfile>,
    #[serde(flatten)]
    pub page: PageInfo,
}

async fn list_personnel(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> Result<ApiResponse<PersonnelPage>, AppError> {
    user.require(Capability::ManageRoster)?;

    let (personnel, page) = query.slice(sorted_profiles(&state, |_| true));
    Ok(ApiResponse::ok(
        "Personnel list fetched successfully",
        PersonnelPage { personnel, page },
    ))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchQuery {
    #[validate(length(min = 1, message = "Search query is required"))]
    pub q: String,
    #[serde(default = "PageQuery::default_page")]
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: usize,
    #[serde(default = "PageQuery::default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: usize,
}

/// Case-insensitive substring match on official name or badge id.
async fn search_personnel(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedQuery(query): ValidatedQuery<SearchQuery>,
) -> Result<ApiResponse<PersonnelPage>, AppError> {
    user.require(Capability::ManagePersonnel)?;

    let needle = query.q.to_lowercase();
    let found = sorted_profiles(&state, |personnel| {
        personnel.official_name.to_lowercase().contains(&needle)
            || personnel.sid.to_lowercase().contains(&needle)
    });

    let (personnel, page) = PageQuery::new(query.page, query.limit).slice(found);
    Ok(ApiResponse::ok(
        "Personnel list fetched successfully",
        PersonnelPage { personnel, page },
    ))
}

async fn get_personnel(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(sid): Path<String>,
) -> Result<ApiResponse<PersonnelProfile>, AppError> {
    user.require(Capability::ManageRoster)?;

    let personnel = state
        .personnel
        .iter()
        .find(|entry| entry.sid == sid)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound("Personnel not found".to_string()))?;

    Ok(ApiResponse::ok(
        "Personnel fetched successfully",
        profile(&state, personnel),
    ))
}

#[derive(Debug, Serialize)]
pub struct DeletedPersonnel {
    pub personnel: Personnel,
    pub user: Option<User>,
}

/// Shift assignments that reference the person are left in place; reports
/// render them without profile fields.
async fn delete_personnel(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(sid): Path<String>,
) -> Result<ApiResponse<DeletedPersonnel>, AppError> {
    user.require(Capability::ManagePersonnel)?;

    let _roster = state.roster_lock.lock().await;
    let (personnel, account) = remove_by_sid(&state, &sid)
        .ok_or_else(|| AppError::NotFound("Personnel not found".to_string()))?;

    info!(personnel_id = %personnel.id, sid = %personnel.sid, "personnel deleted");
    Ok(ApiResponse::ok(
        "Personnel deleted successfully",
        DeletedPersonnel {
            personnel,
            user: account,
        },
    ))
}

#[derive(Debug, Deserialize, Validate)]
pub struct BulkDeleteRequest {
    #[validate(length(min = 1, message = "sids is required"))]
    pub sids: Vec<String>,
}

async fn bulk_delete_personnel(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<BulkDeleteRequest>,
) -> Result<ApiResponse<PersonnelDeleted>, AppError> {
    user.require(Capability::ManagePersonnel)?;

    let _roster = state.roster_lock.lock().await;
    let mut outcome = PersonnelDeleted::default();

    for sid in payload.sids {
        if outcome.deleted.contains(&sid) || outcome.not_found.contains(&sid) {
            continue;
        }
        match remove_by_sid(&state, &sid) {
            Some(_) => outcome.deleted.push(sid),
            None => outcome.not_found.push(sid),
        }
    }

    info!(
        deleted = outcome.deleted.len(),
        not_found = outcome.not_found.len(),
        "personnel bulk deleted"
    );
    Ok(ApiResponse::ok("Personnel deleted successfully", outcome))
}
