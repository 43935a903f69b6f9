use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::warn;
use uuid::Uuid;

use crate::auth::{Capability, JwtService, Role};
use crate::error::AppError;
use crate::state::AppState;

/// Caller identity resolved from the `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
    pub personnel_id: Option<Uuid>,
}

impl AuthUser {
    pub fn require(&self, capability: Capability) -> Result<(), AppError> {
        if self.role.can(capability) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "role {:?} lacks {capability:?}",
                self.role
            )))
        }
    }

    /// The personnel record behind a field-app caller.
    pub fn personnel(&self) -> Result<Uuid, AppError> {
        self.require(Capability::PerformDuty)?;
        self.personnel_id
            .ok_or_else(|| AppError::Forbidden("token is not bound to a personnel record".to_string()))
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;

        let token = JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::Unauthorized("Invalid authorization header".to_string()))?;

        let claims = state.jwt.verify(token).inspect_err(|err| {
            warn!(uri = %parts.uri, error = %err, "bearer token rejected");
        })?;

        Ok(Self {
            user_id: claims.sub,
            role: claims.role,
            personnel_id: claims.personnel_id,
        })
    }
}
