use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::auth::JwtService;
use crate::error::AppError;
use crate::models::duty::Duty;
use crate::models::hardware::Hardware;
use crate::models::personnel::{Personnel, User};
use crate::models::shift::Shift;
use crate::observability::metrics::Metrics;

/// Shared document store plus the services handlers need.
pub struct AppState {
    pub duties: DashMap<Uuid, Duty>,
    pub shifts: DashMap<Uuid, Shift>,
    pub personnel: DashMap<Uuid, Personnel>,
    pub users: DashMap<Uuid, User>,
    pub hardware: DashMap<Uuid, Hardware>,
    /// Held for the whole check-then-append of roster changes.
    pub roster_lock: Mutex<()>,
    pub jwt: JwtService,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(jwt: JwtService) -> Self {
        Self {
            duties: DashMap::new(),
            shifts: DashMap::new(),
            personnel: DashMap::new(),
            users: DashMap::new(),
            hardware: DashMap::new(),
            roster_lock: Mutex::new(()),
            jwt,
            metrics: Metrics::new(),
        }
    }

    pub fn shift(&self, id: Uuid) -> Result<Shift, AppError> {
        self.shifts
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::NotFound("Shift not found".to_string()))
    }

    pub fn duty(&self, id: Uuid) -> Result<Duty, AppError> {
        self.duties
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::NotFound("Duty not found".to_string()))
    }

    pub fn hardware_by_external_id(&self, hardware_id: &str) -> Option<Hardware> {
        self.hardware
            .iter()
            .find(|entry| entry.value().hardware_id == hardware_id)
            .map(|entry| entry.value().clone())
    }

    /// Atomic read-modify-write of one shift document.
    ///
    /// `apply` runs on a copy while the entry is held exclusively; the copy
    /// replaces the stored shift (with `version` bumped) only if `apply`
    /// succeeds, so a failed mutation leaves nothing behind. `apply` must not
    /// touch `self.shifts`.
    pub fn update_shift<T>(
        &self,
        id: Uuid,
        apply: impl FnOnce(&mut Shift) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut entry = self
            .shifts
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Shift not found".to_string()))?;

        let mut draft = entry.value().clone();
        let result = apply(&mut draft)?;
        draft.version = entry.version.wrapping_add(1);
        *entry = draft;

        Ok(result)
    }
}
