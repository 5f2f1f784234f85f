//! # Identity Middleware
//!
//! This module resolves the acting principal for a request. Authentication
//! itself happens upstream (the gateway in front of this service); the API
//! trusts the forwarded `x-user-id` header and loads the matching user row
//! for role and contact information.
//!
//! Handlers take a [`CurrentUser`] extractor argument; requests without a
//! valid, known principal are rejected with 401 before the handler runs.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use siaga_core::{
    alerts::{Actor, Role},
    errors::SiagaError,
};
use uuid::Uuid;

use crate::{middleware::error_handling::AppError, ApiState};

/// Header carrying the gateway-authenticated principal id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated principal, loaded fresh from the users table.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub email: String,
}

impl CurrentUser {
    /// The capability-check view of this principal. `on_duty` is today's
    /// roster membership, which only the caller can resolve.
    pub fn actor(&self, on_duty: bool) -> Actor {
        Actor {
            id: self.id,
            role: self.role,
            on_duty,
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role != Role::Admin {
            return Err(AppError(SiagaError::Authorization(
                "Admin access required".to_string(),
            )));
        }
        Ok(())
    }
}

#[axum::async_trait]
impl FromRequestParts<Arc<ApiState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| SiagaError::Authentication("Missing x-user-id header".to_string()))?;

        let id = header
            .to_str()
            .ok()
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .ok_or_else(|| {
                SiagaError::Authentication("x-user-id must be a valid UUID".to_string())
            })?;

        let user = siaga_db::repositories::users::get_user_by_id(&state.db_pool, id)
            .await
            .map_err(SiagaError::Database)?
            .ok_or_else(|| SiagaError::Authentication(format!("Unknown user {id}")))?;

        // A role string outside the closed enum is data corruption, not a
        // caller mistake.
        let role = user.role.parse::<Role>().map_err(|_| {
            SiagaError::Internal(format!("User {} has unknown role {}", user.id, user.role).into())
        })?;

        Ok(CurrentUser {
            id: user.id,
            name: user.name,
            role,
            phone: user.phone,
            email: user.email,
        })
    }
}
