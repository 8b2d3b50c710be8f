//! Unsigned image uploads to Cloudinary.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use slug::slugify;
use tokio::fs;
use tracing::info;
use url::Url;

use crate::application::repos::{ImageUploader, UploadError};
use crate::domain::images::{MAX_UPLOAD_BYTES, allowed_format};
use crate::domain::submission::UploadedImage;
use crate::infra::error::InfraError;

pub const DEFAULT_UPLOAD_ENDPOINT: &str = "https://api.cloudinary.com/v1_1/";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct UploadFailure {
    error: UploadFailureMessage,
}

#[derive(Debug, Deserialize)]
struct UploadFailureMessage {
    message: String,
}

pub struct CloudinaryUploader {
    http: Client,
    endpoint: Url,
    cloud_name: Option<String>,
    upload_preset: Option<String>,
}

impl CloudinaryUploader {
    pub fn new(
        endpoint: Url,
        cloud_name: Option<String>,
        upload_preset: Option<String>,
        timeout: Duration,
    ) -> Result<Self, InfraError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint,
            cloud_name: cloud_name.filter(|v| !v.trim().is_empty()),
            upload_preset: upload_preset.filter(|v| !v.trim().is_empty()),
        })
    }

    fn upload_url(&self, cloud_name: &str) -> Result<Url, UploadError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| UploadError::NotConfigured("upload endpoint cannot carry a path"))?
            .pop_if_empty()
            .extend([cloud_name, "image", "upload"]);
        Ok(url)
    }
}

/// Slugified stem plus the validated extension.
fn part_file_name(path: &Path, ext: &str) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(slugify)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "mural".to_string());
    format!("{stem}.{ext}")
}

#[async_trait]
impl ImageUploader for CloudinaryUploader {
    async fn upload(&self, path: &Path) -> Result<UploadedImage, UploadError> {
        let cloud_name = self.cloud_name.as_deref().ok_or(UploadError::NotConfigured(
            "set uploads.cloud_name or MURALES_UPLOADS__CLOUD_NAME",
        ))?;
        let preset = self.upload_preset.as_deref().ok_or(UploadError::NotConfigured(
            "set uploads.upload_preset or MURALES_UPLOADS__UPLOAD_PRESET",
        ))?;
        let ext = allowed_format(path).ok_or(UploadError::UnsupportedFormat)?;

        let size = fs::metadata(path).await?.len();
        if size > MAX_UPLOAD_BYTES {
            return Err(UploadError::TooLarge {
                size,
                limit: MAX_UPLOAD_BYTES,
            });
        }
        let bytes = fs::read(path).await?;

        let part = Part::bytes(bytes).file_name(part_file_name(path, &ext));
        let form = Form::new()
            .text("upload_preset", preset.to_string())
            .part("file", part);

        let response = self
            .http
            .post(self.upload_url(cloud_name)?)
            .multipart(form)
            .send()
            .await
            .map_err(|err| UploadError::Transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| UploadError::Transport(err.to_string()))?;

        if !status.is_success() {
            counter!("murales_upload_total", "outcome" => "rejected").increment(1);
            let message = serde_json::from_slice::<UploadFailure>(&body)
                .map(|failure| failure.error.message)
                .unwrap_or_else(|_| format!("status {status}"));
            return Err(UploadError::Rejected(message));
        }

        let uploaded: UploadResponse = serde_json::from_slice(&body)
            .map_err(|err| UploadError::Transport(format!("unreadable response: {err}")))?;
        counter!("murales_upload_total", "outcome" => "ok").increment(1);
        info!(
            target = "murales::infra::uploads",
            public_id = %uploaded.public_id,
            size,
            "Image uploaded"
        );
        Ok(UploadedImage {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use httpmock::MockServer;
    use tempfile::TempDir;

    use super::*;

    fn uploader(server: &MockServer, preset: Option<&str>) -> CloudinaryUploader {
        let endpoint = Url::parse(&server.url("/v1_1/")).expect("endpoint");
        CloudinaryUploader::new(
            endpoint,
            Some("demo".into()),
            preset.map(str::to_string),
            Duration::from_secs(5),
        )
        .expect("uploader")
    }

    #[test]
    fn file_names_are_slugified() {
        assert_eq!(
            part_file_name(Path::new("/tmp/Pared de Ñuñoa.JPG"), "jpg"),
            "pared-de-nunoa.jpg"
        );
    }

    #[tokio::test]
    async fn uploads_with_preset() -> Result<(), UploadError> {
        let dir = TempDir::new()?;
        let path = dir.path().join("caminito.png");
        std::fs::write(&path, b"\x89PNG fake")?;

        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("POST")
                .path("/v1_1/demo/image/upload")
                .body_includes("unsigned-murales");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"secure_url":"https://res.cloudinary.com/demo/image/upload/v1/caminito.png","public_id":"caminito"}"#);
        });

        let image = uploader(&server, Some("unsigned-murales"))
            .upload(&path)
            .await?;

        mock.assert();
        assert_eq!(image.public_id, "caminito");
        Ok(())
    }

    #[tokio::test]
    async fn rejects_before_network() -> Result<(), UploadError> {
        let dir = TempDir::new()?;
        let gif = dir.path().join("anim.gif");
        std::fs::write(&gif, b"GIF89a")?;
        let big = dir.path().join("big.jpg");
        std::fs::write(&big, vec![0_u8; (MAX_UPLOAD_BYTES + 1) as usize])?;

        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method("POST");
            then.status(500);
        });
        let uploader = uploader(&server, Some("p"));

        assert!(matches!(
            uploader.upload(&gif).await,
            Err(UploadError::UnsupportedFormat)
        ));
        assert!(matches!(
            uploader.upload(&big).await,
            Err(UploadError::TooLarge { .. })
        ));
        mock.assert_calls(0);
        Ok(())
    }

    #[tokio::test]
    async fn missing_preset_is_configuration_error() {
        let server = MockServer::start();
        let err = uploader(&server, None)
            .upload(Path::new("x.jpg"))
            .await
            .expect_err("not configured");
        assert!(matches!(err, UploadError::NotConfigured(_)));
    }
}
