use serde::{Deserialize, Serialize};

use userhub_core::{DEFAULT_PAGE_SIZE, PageQuery};

// -------------------------
// Request DTOs
// -------------------------

/// Query string of `GET /users`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersParams {
    #[serde(default)]
    pub page_no: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    #[serde(default)]
    pub filter_by: String,
    #[serde(default)]
    pub filter_role: String,
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl ListUsersParams {
    pub fn into_query(self) -> PageQuery {
        PageQuery::from_request(self.page_no, self.page_size, self.filter_by, self.filter_role)
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct AccessTokenResponse {
    pub principal: String,
    pub access_token: String,
    pub authorities: Vec<String>,
    pub scope: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
