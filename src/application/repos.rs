//! Traits describing the backend and third-party adapters the application
//! services depend on.

use std::path::Path;

use async_trait::async_trait;
use murales_api_types::{
    AdminUser, ApproveRequest, CreateMuralResponse, ListResponse, LoginPayload, LoginRequest,
    Mural, MuralStatus, MuralSummary, MuralWithDetails, NewMural, RejectRequest,
};
use thiserror::Error;

use crate::domain::filters::MuralQuery;
use crate::domain::geocode::GeocodedAddress;
use crate::domain::region::Coordinates;
use crate::domain::submission::UploadedImage;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepoError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("not authorized")]
    Unauthorized { message: Option<String> },
    #[error("resource not found")]
    NotFound,
    #[error("request rejected with status {status}")]
    Rejected { status: u16, message: Option<String> },
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl RepoError {
    /// Message supplied by the backend, suitable for showing to a user.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            RepoError::Unauthorized { message } | RepoError::Rejected { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }
}

/// Public mural endpoints.
#[async_trait]
pub trait MuralsRepo: Send + Sync {
    async fn list_murals(&self, query: &MuralQuery) -> Result<ListResponse<Mural>, RepoError>;

    /// Every approved mural, unpaginated, for map display.
    async fn map_murals(&self) -> Result<Vec<Mural>, RepoError>;

    async fn get_mural(&self, id: &str) -> Result<Mural, RepoError>;

    async fn create_mural(&self, mural: NewMural) -> Result<CreateMuralResponse, RepoError>;
}

/// Distinct region values present in the gallery, used to populate filters.
#[async_trait]
pub trait FilterOptionsRepo: Send + Sync {
    async fn provinces(&self) -> Result<Vec<String>, RepoError>;

    async fn municipalities(&self, province: &str) -> Result<Vec<String>, RepoError>;

    async fn neighborhoods(
        &self,
        province: &str,
        municipality: Option<&str>,
    ) -> Result<Vec<String>, RepoError>;
}

#[async_trait]
pub trait ModerationRepo: Send + Sync {
    async fn list_submissions(
        &self,
        status: MuralStatus,
        page: u32,
    ) -> Result<ListResponse<MuralWithDetails>, RepoError>;

    async fn summary(&self) -> Result<MuralSummary, RepoError>;

    async fn approve(&self, id: &str, request: ApproveRequest) -> Result<(), RepoError>;

    async fn reject(&self, id: &str, request: RejectRequest) -> Result<(), RepoError>;
}

#[async_trait]
pub trait AuthRepo: Send + Sync {
    async fn login(&self, request: LoginRequest) -> Result<LoginPayload, RepoError>;
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session storage i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Durable client-side session state. Keys survive process restarts.
pub trait SessionStore: Send + Sync {
    fn access_token(&self) -> Option<String>;

    fn refresh_token(&self) -> Option<String>;

    fn set_tokens(&self, access_token: &str, refresh_token: &str) -> Result<(), SessionError>;

    fn clear_tokens(&self) -> Result<(), SessionError>;

    fn user(&self) -> Option<AdminUser>;

    fn set_user(&self, user: Option<&AdminUser>) -> Result<(), SessionError>;
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding is not configured: {0}")]
    NotConfigured(&'static str),
    #[error("geocoding request failed: {0}")]
    Transport(String),
    #[error("geocoder returned status {status}: {message}")]
    Provider { status: String, message: String },
}

/// Coordinate to administrative address lookup.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the provider knows no address for the point.
    async fn reverse_geocode(
        &self,
        location: Coordinates,
    ) -> Result<Option<GeocodedAddress>, GeocodeError>;
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("image uploads are not configured: {0}")]
    NotConfigured(&'static str),
    #[error("unsupported image format; use jpg, jpeg, png or webp")]
    UnsupportedFormat,
    #[error("image is {size} bytes; the limit is {limit}")]
    TooLarge { size: u64, limit: u64 },
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("upload failed: {0}")]
    Transport(String),
    #[error("image host rejected the upload: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait ImageUploader: Send + Sync {
    async fn upload(&self, path: &Path) -> Result<UploadedImage, UploadError>;
}
