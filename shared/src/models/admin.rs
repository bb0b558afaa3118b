//! Admin Model

use serde::{Deserialize, Serialize};

/// Admin registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct AdminRegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Admin summary returned after login
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub name: String,
    pub email: String,
    pub created_at: i64,
}
