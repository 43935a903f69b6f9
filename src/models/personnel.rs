use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Personnel {
    pub id: Uuid,
    /// Badge id, unique across personnel.
    pub sid: String,
    pub user: Option<Uuid>,
    pub official_name: String,
    pub designation: String,
    pub photograph: String,
    pub dob: NaiveDate,
    pub blood_group: String,
    pub identification_mark: String,
    pub posted_at: String,
    pub address: String,
}

/// Login account owned by a personnel record or an administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub role: Role,
    pub last_login: Option<DateTime<Utc>>,
}

/// A personnel record as rendered to administrators, with its login account
/// resolved in place of the account id.
#[derive(Debug, Clone, Serialize)]
pub struct PersonnelProfile {
    pub id: Uuid,
    pub sid: String,
    pub user: Option<User>,
    pub official_name: String,
    pub designation: String,
    pub photograph: String,
    pub dob: NaiveDate,
    pub blood_group: String,
    pub identification_mark: String,
    pub posted_at: String,
    pub address: String,
}

impl PersonnelProfile {
    pub fn new(personnel: Personnel, user: Option<User>) -> Self {
        Self {
            id: personnel.id,
            sid: personnel.sid,
            user,
            official_name: personnel.official_name,
            designation: personnel.designation,
            photograph: personnel.photograph,
            dob: personnel.dob,
            blood_group: personnel.blood_group,
            identification_mark: personnel.identification_mark,
            posted_at: personnel.posted_at,
            address: personnel.address,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PersonnelDeleted {
    pub deleted: Vec<String>,
    pub not_found: Vec<String>,
}
