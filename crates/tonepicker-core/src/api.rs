//! Wire types for the tone server's HTTP API, shared by server and client.

use serde::{Deserialize, Serialize};

pub const CHANGE_TONE_PATH: &str = "/api/change-tone";
pub const HEALTH_PATH: &str = "/api/health";
pub const TEST_KEY_PATH: &str = "/api/test-key";

/// `POST /api/change-tone` body. Missing fields deserialize as empty strings
/// and are rejected by the service as empty input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangeToneRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub tone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub api_key_configured: bool,
    pub api_key_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyTestResponse {
    pub status: String,
    pub models: Vec<String>,
}
