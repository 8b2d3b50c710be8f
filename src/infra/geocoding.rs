//! Reverse geocoding through the Google Geocoding REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::application::repos::{GeocodeError, Geocoder};
use crate::domain::geocode::{GeocodeResult, GeocodedAddress, resolve_address};
use crate::domain::region::Coordinates;
use crate::infra::error::InfraError;

pub const DEFAULT_GEOCODE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

pub struct GoogleGeocoder {
    http: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl GoogleGeocoder {
    pub fn new(
        endpoint: Url,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, InfraError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn reverse_geocode(
        &self,
        location: Coordinates,
    ) -> Result<Option<GeocodedAddress>, GeocodeError> {
        let key = self.api_key.as_deref().ok_or(GeocodeError::NotConfigured(
            "set geocoding.api_key or MURALES_GEOCODING__API_KEY",
        ))?;

        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair(
                "latlng",
                &format!("{},{}", location.latitude, location.longitude),
            )
            .append_pair("language", "es")
            .append_pair("key", key);

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| GeocodeError::Transport(err.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| GeocodeError::Transport(err.to_string()))?;
        if !status.is_success() {
            return Err(GeocodeError::Provider {
                status: status.to_string(),
                message: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let body: GeocodeResponse = serde_json::from_slice(&bytes)
            .map_err(|err| GeocodeError::Transport(format!("unreadable response: {err}")))?;
        match body.status.as_str() {
            "OK" => {
                debug!(
                    target = "murales::infra::geocoding",
                    results = body.results.len(),
                    "Geocoder answered"
                );
                Ok(resolve_address(&body.results))
            }
            "ZERO_RESULTS" => Ok(None),
            _ => Err(GeocodeError::Provider {
                message: body.error_message.unwrap_or_default(),
                status: body.status,
            }),
        }
    }
}
