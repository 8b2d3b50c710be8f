//! Draft state of a new mural submission and its pre-flight checks.

use murales_api_types::NewMural;
use thiserror::Error;
use validator::ValidateEmail;

use super::geocode::GeocodedAddress;
use super::region::Coordinates;

/// Reasons a draft cannot be sent. Checked in declaration order; the
/// messages are shown to the contributor as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionBlocked {
    #[error("Please enter a valid email")]
    InvalidEmail,
    #[error("Please upload an image")]
    MissingImage,
    #[error("Please select a location on the map")]
    MissingLocation,
    #[error("Could not determine location. Please try again.")]
    UnresolvedProvince,
}

/// Image accepted by the image host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub url: String,
    pub public_id: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionDraft {
    pub name: Option<String>,
    pub contributor_email: String,
    pub location: Option<Coordinates>,
    pub address: Option<GeocodedAddress>,
    pub image: Option<UploadedImage>,
}

impl SubmissionDraft {
    pub fn new(contributor_email: impl Into<String>) -> Self {
        Self {
            contributor_email: contributor_email.into(),
            ..Self::default()
        }
    }

    /// A new pick invalidates the previously resolved address.
    pub fn set_location(&mut self, location: Coordinates) {
        self.location = Some(location);
        self.address = None;
    }

    pub fn set_geocoded_address(&mut self, address: GeocodedAddress) {
        self.address = Some(address);
    }

    pub fn set_uploaded_image(&mut self, url: impl Into<String>, public_id: impl Into<String>) {
        self.image = Some(UploadedImage {
            url: url.into(),
            public_id: public_id.into(),
        });
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    /// Forget everything but the contributor email.
    pub fn reset(&mut self) {
        *self = Self::new(std::mem::take(&mut self.contributor_email));
    }

    /// Build the request payload, or report the first missing piece.
    pub fn validate(&self) -> Result<NewMural, SubmissionBlocked> {
        let email = self.contributor_email.trim();
        if !email.validate_email() {
            return Err(SubmissionBlocked::InvalidEmail);
        }
        let image = self.image.as_ref().ok_or(SubmissionBlocked::MissingImage)?;
        let location = self.location.ok_or(SubmissionBlocked::MissingLocation)?;
        let address = self
            .address
            .as_ref()
            .filter(|a| !a.province.is_empty())
            .ok_or(SubmissionBlocked::UnresolvedProvince)?;

        Ok(NewMural {
            name: self
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            image_url: image.url.clone(),
            cloudinary_public_id: image.public_id.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
            province: address.province.clone(),
            municipality: address.municipality.clone(),
            neighborhood: address.neighborhood.clone(),
            formatted_address: Some(address.formatted_address.clone()),
            contributor_email: email.to_string(),
        })
    }
}
