use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::alerts::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
}

/// Identity projection embedded in roster and alert responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListRelawanResponse {
    pub relawan: Vec<UserResponse>,
}
