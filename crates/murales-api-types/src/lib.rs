//! Wire types for the murales gallery REST API.
//!
//! Shared by the client library and the command-line tool so both agree on
//! request and response shapes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Public view of an approved mural.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mural {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub province: String,
    pub municipality: Option<String>,
    pub neighborhood: Option<String>,
    pub formatted_address: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Moderation state of a submission. Transitions are owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MuralStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl MuralStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MuralStatus::Pending => "pending",
            MuralStatus::Approved => "approved",
            MuralStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for MuralStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown mural status `{}`", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for MuralStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(MuralStatus::Pending),
            "approved" => Ok(MuralStatus::Approved),
            "rejected" => Ok(MuralStatus::Rejected),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// Administrative view: the public fields plus moderation metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuralWithDetails {
    #[serde(flatten)]
    pub mural: Mural,
    pub cloudinary_public_id: Option<String>,
    pub status: MuralStatus,
    pub rejection_reason: Option<String>,
    pub contributor_email: String,
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub reviewed_at: Option<OffsetDateTime>,
    pub reviewed_by_id: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
}

impl Default for PaginationMeta {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
            total_pages: 1,
            total_count: 0,
        }
    }
}

/// `{data: [...], meta: {...}}` envelope of the paginated list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

/// `{data: ...}` envelope used by single-object and option endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMuralResponse {
    pub data: Mural,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuralSummary {
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
}

/// Body of `POST /murals`, nested under the `mural` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateMuralRequest {
    pub mural: NewMural,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMural {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub image_url: String,
    pub cloudinary_public_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub province: String,
    pub municipality: Option<String>,
    pub neighborhood: Option<String>,
    pub formatted_address: Option<String>,
    pub contributor_email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveRequest {
    pub send_email: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectRequest {
    pub reason: String,
    pub send_email: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginPayload {
    pub user: AdminUser,
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

pub type LoginResponse = DataResponse<LoginPayload>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// The refresh endpoint has been observed returning the token pair both
/// wrapped in `data` and at the top level.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RefreshResponse {
    Wrapped { data: AuthTokens },
    Bare(AuthTokens),
}

impl RefreshResponse {
    pub fn into_tokens(self) -> AuthTokens {
        match self {
            RefreshResponse::Wrapped { data } | RefreshResponse::Bare(data) => data,
        }
    }
}

/// Error body of failed mutations: either a single message or field errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ApiErrorBody {
    /// Single user-facing line: the `error` message if present, otherwise
    /// field errors joined as `field: a, b; other: c`.
    pub fn summary(&self) -> Option<String> {
        if let Some(message) = self.error.as_deref().filter(|m| !m.is_empty()) {
            return Some(message.to_string());
        }
        let errors = self.errors.as_ref().filter(|e| !e.is_empty())?;
        let joined = errors
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
            .collect::<Vec<_>>()
            .join("; ");
        Some(joined)
    }
}

pub type FilterValuesResponse = DataResponse<Vec<String>>;
