#![deny(clippy::all, clippy::pedantic)]

use std::sync::Arc;

use murales::application::repos::{RepoError, SessionError, SessionStore};
use murales::config::{LoadError, Settings};
use murales::infra::error::InfraError;
use murales::infra::geocoding::GoogleGeocoder;
use murales::infra::http::{ApiClient, LogRedirect};
use murales::infra::session::FileTokenStore;
use murales::infra::uploads::CloudinaryUploader;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    #[error("request failed: {0}")]
    Repo(#[from] RepoError),
    #[error("{0}")]
    Failed(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to render output: {0}")]
    Output(String),
}

/// Everything a handler needs: resolved settings plus the wired adapters.
pub struct Ctx {
    pub settings: Settings,
    pub api: Arc<ApiClient>,
    pub session: Arc<dyn SessionStore>,
}

impl Ctx {
    pub fn new(settings: Settings, session: Arc<dyn SessionStore>) -> Result<Self, CliError> {
        let api = ApiClient::new(
            settings.api.base_url.clone(),
            settings.api.timeout,
            Arc::clone(&session),
            Arc::new(LogRedirect),
        )?;
        Ok(Self {
            settings,
            api: Arc::new(api),
            session,
        })
    }

    pub fn geocoder(&self) -> Result<GoogleGeocoder, CliError> {
        let geocoding = &self.settings.geocoding;
        Ok(GoogleGeocoder::new(
            geocoding.endpoint.clone(),
            geocoding.api_key.clone(),
            self.settings.api.timeout,
        )?)
    }

    pub fn uploader(&self) -> Result<CloudinaryUploader, CliError> {
        let uploads = &self.settings.uploads;
        Ok(CloudinaryUploader::new(
            uploads.endpoint.clone(),
            uploads.cloud_name.clone(),
            uploads.upload_preset.clone(),
            self.settings.api.timeout,
        )?)
    }
}

/// Open the persisted session named in `settings` and wire the client.
pub fn build_ctx(settings: Settings) -> Result<Ctx, CliError> {
    let store = FileTokenStore::open(&settings.session.store_path)?;
    Ctx::new(settings, Arc::new(store))
}
