//! Add-mural flow: location pick, image upload and final submission.

use std::path::Path;
use std::sync::Arc;

use metrics::counter;
use thiserror::Error;
use tracing::{info, warn};

use crate::application::repos::{Geocoder, ImageUploader, MuralsRepo};
use crate::domain::region::Coordinates;
use crate::domain::submission::{SubmissionBlocked, SubmissionDraft};

const PENDING_REVIEW: &str = "Your submission is pending review.";
const SUBMIT_FAILED: &str = "Failed to submit mural";

/// Contributor-facing failures of the add-mural flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Blocked(#[from] SubmissionBlocked),
    #[error("Failed to get address for this location")]
    Geocoding,
    #[error("Upload failed: {0}")]
    Upload(String),
    #[error("{0}")]
    Rejected(String),
}

pub struct SubmissionService {
    murals: Arc<dyn MuralsRepo>,
    geocoder: Arc<dyn Geocoder>,
    uploader: Option<Arc<dyn ImageUploader>>,
}

impl SubmissionService {
    pub fn new(
        murals: Arc<dyn MuralsRepo>,
        geocoder: Arc<dyn Geocoder>,
        uploader: Option<Arc<dyn ImageUploader>>,
    ) -> Self {
        Self {
            murals,
            geocoder,
            uploader,
        }
    }

    /// Record `location` on the draft and resolve its address.
    ///
    /// The location is kept even when geocoding fails; the draft then stays
    /// blocked until a later pick resolves a province.
    pub async fn pick_location(
        &self,
        draft: &mut SubmissionDraft,
        location: Coordinates,
    ) -> Result<(), SubmissionError> {
        draft.set_location(location);
        match self.geocoder.reverse_geocode(location).await {
            Ok(Some(address)) => {
                draft.set_geocoded_address(address);
                Ok(())
            }
            Ok(None) => {
                info!(
                    target = "murales::application::submission",
                    latitude = location.latitude,
                    longitude = location.longitude,
                    "No address known for location"
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    target = "murales::application::submission",
                    latitude = location.latitude,
                    longitude = location.longitude,
                    error = %err,
                    "Reverse geocoding failed"
                );
                Err(SubmissionError::Geocoding)
            }
        }
    }

    pub async fn upload_image(
        &self,
        draft: &mut SubmissionDraft,
        path: &Path,
    ) -> Result<(), SubmissionError> {
        let Some(uploader) = &self.uploader else {
            return Err(SubmissionError::Upload(
                "image uploads are not configured".to_string(),
            ));
        };

        let image = uploader.upload(path).await.map_err(|err| {
            warn!(
                target = "murales::application::submission",
                path = %path.display(),
                error = %err,
                "Image upload failed"
            );
            SubmissionError::Upload(err.to_string())
        })?;
        draft.set_uploaded_image(image.url, image.public_id);
        Ok(())
    }

    /// Send the draft for review. Returns the confirmation to show; the
    /// draft is reset (keeping the email) once the backend accepts it.
    pub async fn submit(&self, draft: &mut SubmissionDraft) -> Result<String, SubmissionError> {
        let mural = match draft.validate() {
            Ok(mural) => mural,
            Err(blocked) => {
                counter!("murales_submission_total", "outcome" => "blocked").increment(1);
                return Err(blocked.into());
            }
        };

        match self.murals.create_mural(mural).await {
            Ok(response) => {
                counter!("murales_submission_total", "outcome" => "ok").increment(1);
                info!(
                    target = "murales::application::submission",
                    id = %response.data.id,
                    province = %response.data.province,
                    "Mural submitted for review"
                );
                draft.reset();
                Ok(response
                    .message
                    .unwrap_or_else(|| PENDING_REVIEW.to_string()))
            }
            Err(err) => {
                counter!("murales_submission_total", "outcome" => "error").increment(1);
                warn!(
                    target = "murales::application::submission",
                    error = %err,
                    "Submission failed"
                );
                Err(SubmissionError::Rejected(
                    err.user_message().unwrap_or(SUBMIT_FAILED).to_string(),
                ))
            }
        }
    }
}
