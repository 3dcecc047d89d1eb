//! Service-level DTOs

use serde::{Deserialize, Serialize};

/// Health check body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub is_active: bool,
}

/// Error body returned with every non-2xx API response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
